//! Event persistence.
//!
//! Two backends implement the same [`EventStore`] contract:
//! - [`JsonEventStore`]: one JSON document holding every event, global scope
//! - [`SqliteEventStore`]: a relational database where each user only sees
//!   their own events (through [`UserEvents`])

pub mod json;
pub mod sqlite;

pub use json::JsonEventStore;
pub use sqlite::{SqliteEventStore, User, UserEvents};

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{BackendKind, Settings};
use crate::error::EventDeskResult;
use crate::event::{Event, EventId, EventInput, Rules};
use crate::query::ListQuery;

/// Create/read/update/delete over the events visible in one scope.
pub trait EventStore {
    /// Validation rules this store enforces.
    fn rules(&self) -> &Rules;

    /// Validate and persist a new event.
    ///
    /// Fails with `Validation` listing every problem, or `DuplicateName` when
    /// another event in scope has the same name ignoring case.
    fn create(&mut self, input: EventInput) -> EventDeskResult<Event>;

    fn get(&self, id: &EventId) -> EventDeskResult<Option<Event>>;

    /// Apply the supplied fields to an existing event.
    ///
    /// Fails with `NotFound` before looking at the input when `id` is not in
    /// scope. Nothing is stored unless the updated event validates and its
    /// name is still unique.
    fn update(&mut self, id: &EventId, input: EventInput) -> EventDeskResult<Event>;

    /// Returns false when there was nothing to delete.
    fn delete(&mut self, id: &EventId) -> EventDeskResult<bool>;

    /// Events in scope after search, tag filter and sort.
    /// Storage failures are logged and yield an empty list.
    fn list(&self, query: &ListQuery) -> Vec<Event>;

    /// Storage failures are logged and yield empty stats.
    fn stats(&self) -> Stats;
}

/// Event count and tag summary for a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_events: usize,
    pub unique_tags: usize,
    pub all_tags: Vec<String>,
}

impl Stats {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut total_events = 0;
        let mut tags = BTreeSet::new();

        for event in events {
            total_events += 1;
            tags.extend(event.tags.iter().cloned());
        }

        Stats {
            total_events,
            unique_tags: tags.len(),
            all_tags: tags.into_iter().collect(),
        }
    }
}

/// The configured store, opened and ready.
pub enum Backend {
    Json(JsonEventStore),
    Sqlite(SqliteEventStore),
}

impl Backend {
    pub fn open(settings: &Settings) -> EventDeskResult<Self> {
        let backend = match settings.backend {
            BackendKind::Json => {
                let rules = settings.rules_for(Rules::JSON_FILE);
                Backend::Json(JsonEventStore::open(settings.data_file_path()).with_rules(rules))
            }
            BackendKind::Sqlite => {
                let rules = settings.rules_for(Rules::RELATIONAL);
                let store = match settings.database_path()? {
                    Some(path) => SqliteEventStore::open(path)?,
                    None => SqliteEventStore::in_memory()?,
                };
                Backend::Sqlite(store.with_rules(rules))
            }
        };
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Json(_) => BackendKind::Json,
            Backend::Sqlite(_) => BackendKind::Sqlite,
        }
    }
}
