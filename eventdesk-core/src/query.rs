//! Search, tag filtering and sorting over event lists.
//!
//! Everything here is pure: inputs are borrowed and a new list is returned.

use std::cmp::Ordering;

use tracing::debug;

use crate::date::{DateKey, sort_key};
use crate::event::Event;

/// Field to sort by. Unknown names fall back to `Date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    Location,
    CreatedAt,
    UpdatedAt,
    #[default]
    Date,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "name" => SortKey::Name,
            "location" => SortKey::Location,
            "created_at" => SortKey::CreatedAt,
            "updated_at" => SortKey::UpdatedAt,
            _ => SortKey::Date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `desc` (any case) sorts descending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A list request: search, then tag filter, then sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl ListQuery {
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        let found = search(events, self.search.as_deref());
        let tagged = filter_by_tag(&found, self.tag.as_deref());
        sort(&tagged, self.sort_by, self.order)
    }

    /// Search term as the matcher sees it, `None` when it is a no-op.
    pub fn search_term(&self) -> Option<String> {
        normalize(self.search.as_deref())
    }

    /// Tag filter as the matcher sees it, `None` when it is a no-op.
    pub fn tag_filter(&self) -> Option<String> {
        normalize(self.tag.as_deref())
    }
}

fn normalize(term: Option<&str>) -> Option<String> {
    term.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty())
}

/// Whether a normalized term occurs in the event's searchable text.
///
/// The searchable text is name, location, description and tags joined by
/// spaces, lowercased.
pub fn text_matches(name: &str, location: &str, description: &str, tags: &[String], term: &str) -> bool {
    let searchable = [name, location, description, &tags.join(" ")]
        .join(" ")
        .to_lowercase();
    searchable.contains(term)
}

/// Whether a normalized tag appears in `tags`, ignoring case.
pub fn has_tag(tags: &[String], tag: &str) -> bool {
    tags.iter().any(|t| t.to_lowercase() == tag)
}

fn event_matches(event: &Event, term: &str) -> bool {
    text_matches(
        &event.name,
        &event.location,
        event.description_text(),
        &event.tags,
        term,
    )
}

/// Events whose searchable text contains `term`, ignoring case.
/// A blank or absent term returns every event.
pub fn search(events: &[Event], term: Option<&str>) -> Vec<Event> {
    match normalize(term) {
        Some(term) => events
            .iter()
            .filter(|event| event_matches(event, &term))
            .cloned()
            .collect(),
        None => events.to_vec(),
    }
}

/// Events carrying `tag`, ignoring case. A blank or absent tag returns every
/// event.
pub fn filter_by_tag(events: &[Event], tag: Option<&str>) -> Vec<Event> {
    match normalize(tag) {
        Some(tag) => events
            .iter()
            .filter(|event| has_tag(&event.tags, &tag))
            .cloned()
            .collect(),
        None => events.to_vec(),
    }
}

#[derive(Debug)]
struct MixedDateKinds;

/// Stable sort by `key` in `order`.
///
/// Date sorting fails when the list mixes dates with and without an
/// offset; the result is then sorted by name instead.
pub fn sort(events: &[Event], key: SortKey, order: SortOrder) -> Vec<Event> {
    let mut sorted = events.to_vec();

    match key {
        SortKey::Name => sort_keyed(&mut sorted, order, |e| e.name.to_lowercase()),
        SortKey::Location => sort_keyed(&mut sorted, order, |e| e.location.to_lowercase()),
        SortKey::CreatedAt => sort_keyed(&mut sorted, order, |e| e.created_at),
        SortKey::UpdatedAt => sort_keyed(&mut sorted, order, |e| e.updated_at),
        SortKey::Date => {
            if let Err(MixedDateKinds) = sort_by_date(&mut sorted, order) {
                debug!("Date sort failed on mixed offset/naive dates, sorting by name");
                sort_keyed(&mut sorted, order, |e| e.name.to_lowercase());
            }
        }
    }

    sorted
}

fn sort_keyed<K: Ord>(events: &mut Vec<Event>, order: SortOrder, key: impl Fn(&Event) -> K) {
    let mut keyed: Vec<(K, Event)> = events.drain(..).map(|e| (key(&e), e)).collect();
    keyed.sort_by(|(a, _), (b, _)| order.apply(a.cmp(b)));
    events.extend(keyed.into_iter().map(|(_, e)| e));
}

/// Leaves `events` untouched on error.
fn sort_by_date(events: &mut Vec<Event>, order: SortOrder) -> Result<(), MixedDateKinds> {
    let keys: Vec<DateKey> = events.iter().map(|e| sort_key(&e.date)).collect();

    let aware = keys.iter().filter(|k| k.is_aware()).count();
    if aware != 0 && aware != keys.len() {
        return Err(MixedDateKinds);
    }

    let mut keyed: Vec<(DateKey, Event)> = keys.into_iter().zip(events.drain(..)).collect();
    keyed.sort_by(|(a, _), (b, _)| order.apply(a.partial_cmp(b).unwrap_or(Ordering::Equal)));
    events.extend(keyed.into_iter().map(|(_, e)| e));
    Ok(())
}
