//! The event entity.
//!
//! An [`Event`] is built without validation; callers run
//! [`Event::validate`] against the store's [`Rules`] before persisting it.
//! Serializing an event yields its dictionary form, and deserializing that
//! form reproduces an equal event.

mod input;
mod rules;

pub use input::{EventInput, EventPatch, NewEvent, TagsInput};
pub use rules::{Rules, TagInput, name_key, names_collide};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::EventDeskError;

/// Event identifier.
///
/// The JSON file store hands out UUIDs, the relational store hands out row
/// ids. Serialized untagged: a string for UUIDs, a number for rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Row(i64),
    Uuid(Uuid),
}

impl EventId {
    pub fn generate() -> Self {
        EventId::Uuid(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventId::Row(id) => write!(f, "{}", id),
            EventId::Uuid(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for EventId {
    type Err = EventDeskError;

    /// Text that is neither a row id nor a UUID cannot name any event.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(row) = s.parse::<i64>() {
            return Ok(EventId::Row(row));
        }
        Uuid::parse_str(s)
            .map(EventId::Uuid)
            .map_err(|_| EventDeskError::NotFound)
    }
}

/// Owner of events in the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// ISO-8601 date or date-time, kept as supplied
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Event {
    /// Build an event with fresh timestamps. Does not validate.
    pub fn new(id: EventId, draft: NewEvent, now: DateTime<Utc>) -> Self {
        Event {
            id,
            name: draft.name,
            date: draft.date,
            location: draft.location,
            description: draft.description,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            user_id: None,
        }
    }

    pub fn with_owner(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Overwrite the supplied fields and refresh `updated_at`.
    ///
    /// `updated_at` is refreshed even when no value changed.
    pub fn apply(&mut self, patch: &EventPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        self.touch(now);
    }

    /// `updated_at` never moves before `created_at`, even if the clock does.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Description, or `""` when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_test_event() -> Event {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        Event::new(
            EventId::generate(),
            NewEvent {
                name: "Team Standup".to_string(),
                date: "2025-03-21T09:00:00".to_string(),
                location: "Room 4".to_string(),
                description: Some("Daily sync".to_string()),
                tags: vec!["work".to_string(), "daily".to_string()],
            },
            now,
        )
    }

    #[test]
    fn test_event_id_parse() {
        assert_eq!("42".parse::<EventId>().unwrap(), EventId::Row(42));

        let uuid = Uuid::new_v4();
        assert_eq!(uuid.to_string().parse::<EventId>().unwrap(), EventId::Uuid(uuid));

        assert!(matches!(
            "no-such-id".parse::<EventId>(),
            Err(EventDeskError::NotFound)
        ));
    }

    #[test]
    fn test_event_id_serialization() {
        assert_eq!(serde_json::to_value(EventId::Row(7)).unwrap(), serde_json::json!(7));

        let uuid = Uuid::new_v4();
        let id: EventId = serde_json::from_value(serde_json::json!(uuid.to_string())).unwrap();
        assert_eq!(id, EventId::Uuid(uuid));
    }

    #[test]
    fn test_new_sets_matching_timestamps() {
        let event = make_test_event();
        assert_eq!(event.created_at, event.updated_at);
        assert!(event.user_id.is_none());
    }

    #[test]
    fn test_apply_only_touches_supplied_fields() {
        let mut event = make_test_event();
        let original = event.clone();
        let later = event.created_at + Duration::minutes(5);

        let patch = EventPatch {
            location: Some("Room 7".to_string()),
            ..EventPatch::default()
        };
        event.apply(&patch, later);

        assert_eq!(event.location, "Room 7");
        assert_eq!(event.name, original.name);
        assert_eq!(event.date, original.date);
        assert_eq!(event.description, original.description);
        assert_eq!(event.tags, original.tags);
        assert_eq!(event.id, original.id);
        assert_eq!(event.created_at, original.created_at);
        assert_eq!(event.updated_at, later);
    }

    #[test]
    fn test_apply_empty_patch_still_refreshes_updated_at() {
        let mut event = make_test_event();
        let later = event.created_at + Duration::seconds(1);

        event.apply(&EventPatch::default(), later);

        assert_eq!(event.updated_at, later);
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let mut event = make_test_event();
        let earlier = event.created_at - Duration::hours(1);

        event.apply(&EventPatch::default(), earlier);

        assert_eq!(event.updated_at, event.created_at);
    }

    #[test]
    fn test_dictionary_roundtrip() {
        let event = make_test_event();
        let dict = serde_json::to_value(&event).unwrap();

        assert!(dict.get("user_id").is_none());
        assert_eq!(dict["tags"], serde_json::json!(["work", "daily"]));

        let restored: Event = serde_json::from_value(dict).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn test_dictionary_roundtrip_with_owner() {
        let mut event = make_test_event().with_owner(UserId(3));
        event.id = EventId::Row(12);

        let dict = serde_json::to_value(&event).unwrap();
        assert_eq!(dict["id"], 12);
        assert_eq!(dict["user_id"], 3);

        let restored: Event = serde_json::from_value(dict).unwrap();
        assert_eq!(restored, event);
    }
}
