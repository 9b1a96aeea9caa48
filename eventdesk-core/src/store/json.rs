//! JSON file event storage.
//!
//! The whole store is one pretty-printed JSON object mapping event id to
//! event record. It is read once on open and rewritten in full after every
//! mutation. Scope is global: every caller sees every event.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, error, info};

use super::{EventStore, Stats};
use crate::error::{EventDeskError, EventDeskResult};
use crate::event::{Event, EventId, EventInput, Rules, names_collide};
use crate::query::ListQuery;

pub struct JsonEventStore {
    path: PathBuf,
    /// Keyed by `EventId` display form; keeps file order
    events: IndexMap<String, Event>,
    rules: Rules,
}

impl JsonEventStore {
    /// Load the store at `path`.
    ///
    /// A missing file starts an empty store and writes an empty document.
    /// A file that cannot be read or parsed also starts an empty store; its
    /// content is overwritten by the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut store = JsonEventStore {
            events: IndexMap::new(),
            rules: Rules::JSON_FILE,
            path,
        };

        if store.path.exists() {
            store.events = load(&store.path);
        } else {
            info!("No existing data file at {}, starting empty", store.path.display());
            if let Err(e) = store.save() {
                error!("Error initializing storage: {e}");
            }
        }

        info!("Data storage initialized with {} events", store.len());
        store
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Rewrite the whole file from memory.
    fn save(&self) -> EventDeskResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(&self.path, content).inspect_err(|e| {
            error!("Error saving events to {}: {e}", self.path.display());
        })?;

        debug!("Saved {} events to {}", self.events.len(), self.path.display());
        Ok(())
    }

    fn name_taken(&self, name: &str, except: Option<&EventId>) -> bool {
        self.events
            .values()
            .any(|e| Some(&e.id) != except && names_collide(&e.name, name))
    }
}

fn load(path: &Path) -> IndexMap<String, Event> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Error loading events from {}: {e}", path.display());
            return IndexMap::new();
        }
    };

    match serde_json::from_str::<IndexMap<String, Event>>(&content) {
        Ok(events) => {
            debug!("Loaded {} events from {}", events.len(), path.display());
            events
        }
        Err(e) => {
            error!("Error parsing JSON data in {}: {e}", path.display());
            IndexMap::new()
        }
    }
}

impl EventStore for JsonEventStore {
    fn rules(&self) -> &Rules {
        &self.rules
    }

    fn create(&mut self, input: EventInput) -> EventDeskResult<Event> {
        let event = Event::new(
            EventId::generate(),
            input.into_new_event(&self.rules),
            Utc::now(),
        );

        let errors = event.validate(&self.rules);
        if !errors.is_empty() {
            return Err(EventDeskError::Validation(errors));
        }

        if self.name_taken(&event.name, None) {
            return Err(EventDeskError::DuplicateName);
        }

        let key = event.id.to_string();
        self.events.insert(key.clone(), event.clone());

        if let Err(e) = self.save() {
            self.events.shift_remove(&key);
            return Err(e);
        }

        info!("Created event: {} (ID: {})", event.name, event.id);
        Ok(event)
    }

    fn get(&self, id: &EventId) -> EventDeskResult<Option<Event>> {
        Ok(self.events.get(&id.to_string()).cloned())
    }

    fn update(&mut self, id: &EventId, input: EventInput) -> EventDeskResult<Event> {
        let key = id.to_string();
        let mut event = self
            .events
            .get(&key)
            .cloned()
            .ok_or(EventDeskError::NotFound)?;

        event.apply(&input.into_patch(&self.rules), Utc::now());

        let errors = event.validate(&self.rules);
        if !errors.is_empty() {
            return Err(EventDeskError::Validation(errors));
        }

        if self.name_taken(&event.name, Some(id)) {
            return Err(EventDeskError::DuplicateName);
        }

        let previous = self.events.insert(key.clone(), event.clone());

        if let Err(e) = self.save() {
            if let Some(previous) = previous {
                self.events.insert(key, previous);
            }
            return Err(e);
        }

        info!("Updated event: {} (ID: {})", event.name, event.id);
        Ok(event)
    }

    fn delete(&mut self, id: &EventId) -> EventDeskResult<bool> {
        let Some((index, key, removed)) = self.events.shift_remove_full(&id.to_string()) else {
            return Ok(false);
        };

        if let Err(e) = self.save() {
            self.events.shift_insert(index, key, removed);
            return Err(e);
        }

        info!("Deleted event: {} (ID: {})", removed.name, removed.id);
        Ok(true)
    }

    fn list(&self, query: &ListQuery) -> Vec<Event> {
        let events: Vec<Event> = self.events.values().cloned().collect();
        query.apply(&events)
    }

    fn stats(&self) -> Stats {
        Stats::from_events(self.events.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TagsInput;
    use crate::query::{SortKey, SortOrder};
    use tempfile::TempDir;

    fn input(name: &str, date: &str) -> EventInput {
        EventInput {
            name: Some(name.to_string()),
            date: Some(date.to_string()),
            location: Some("Main hall".to_string()),
            description: Some(format!("All about {}", name)),
            tags: None,
        }
    }

    fn open_temp() -> (TempDir, JsonEventStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonEventStore::open(dir.path().join("events_data.json"));
        (dir, store)
    }

    #[test]
    fn test_open_missing_file_creates_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("events_data.json");

        let store = JsonEventStore::open(&path);

        assert!(store.is_empty());
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "{}");
    }

    #[test]
    fn test_open_corrupt_file_resets_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events_data.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let mut store = JsonEventStore::open(&path);
        assert!(store.is_empty());

        store.create(input("Recovery", "2024-05-01")).unwrap();
        let reopened = JsonEventStore::open(&path);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_create_persists_whole_document() {
        let (dir, mut store) = open_temp();
        let event = store.create(input("Launch", "2024-05-01")).unwrap();

        let reopened = JsonEventStore::open(dir.path().join("events_data.json"));
        assert_eq!(reopened.get(&event.id).unwrap(), Some(event.clone()));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[event.id.to_string()]["name"], "Launch");
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let (_dir, mut store) = open_temp();
        let err = store.create(input("", "whenever")).unwrap_err();

        match err {
            EventDeskError::Validation(errors) => assert_eq!(
                errors,
                vec!["Event name is required", "Invalid date format"]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_rejects_duplicate_name_ignoring_case() {
        let (_dir, mut store) = open_temp();
        store.create(input("Team Standup", "2024-05-01")).unwrap();

        let err = store.create(input("team standup", "2024-05-02")).unwrap_err();
        assert!(matches!(err, EventDeskError::DuplicateName));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_splits_comma_separated_tags() {
        let (_dir, mut store) = open_temp();
        let mut with_tags = input("Picnic", "2024-06-01");
        with_tags.tags = Some(TagsInput::from("outdoors, food ,"));

        let event = store.create(with_tags).unwrap();
        assert_eq!(event.tags, vec!["outdoors", "food"]);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let (_dir, mut store) = open_temp();
        let err = store.update(&EventId::generate(), input("", "")).unwrap_err();
        assert!(matches!(err, EventDeskError::NotFound));
    }

    #[test]
    fn test_update_applies_partial_fields() {
        let (_dir, mut store) = open_temp();
        let created = store.create(input("Launch", "2024-05-01")).unwrap();

        let updated = store
            .update(
                &created.id,
                EventInput {
                    location: Some("Rooftop".to_string()),
                    ..EventInput::default()
                },
            )
            .unwrap();

        assert_eq!(updated.location, "Rooftop");
        assert_eq!(updated.name, "Launch");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.get(&created.id).unwrap(), Some(updated));
    }

    #[test]
    fn test_update_allows_recasing_own_name() {
        let (_dir, mut store) = open_temp();
        let created = store.create(input("launch", "2024-05-01")).unwrap();

        let updated = store
            .update(
                &created.id,
                EventInput {
                    name: Some("LAUNCH".to_string()),
                    ..EventInput::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "LAUNCH");
    }

    #[test]
    fn test_update_rejects_name_of_other_event() {
        let (_dir, mut store) = open_temp();
        store.create(input("Launch", "2024-05-01")).unwrap();
        let other = store.create(input("Retro", "2024-05-02")).unwrap();

        let err = store
            .update(
                &other.id,
                EventInput {
                    name: Some("launch".to_string()),
                    ..EventInput::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, EventDeskError::DuplicateName));
        assert_eq!(store.get(&other.id).unwrap().unwrap().name, "Retro");
    }

    #[test]
    fn test_failed_update_leaves_event_untouched() {
        let (_dir, mut store) = open_temp();
        let created = store.create(input("Launch", "2024-05-01")).unwrap();

        let err = store
            .update(
                &created.id,
                EventInput {
                    date: Some("someday".to_string()),
                    ..EventInput::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, EventDeskError::Validation(_)));
        assert_eq!(store.get(&created.id).unwrap(), Some(created));
    }

    #[test]
    fn test_delete_removes_event_and_its_tags() {
        let (_dir, mut store) = open_temp();
        let mut first = input("Launch", "2024-05-01");
        first.tags = Some(TagsInput::from(vec!["work".to_string(), "party".to_string()]));
        let mut second = input("Retro", "2024-05-02");
        second.tags = Some(TagsInput::from(vec!["work".to_string()]));

        let launch = store.create(first).unwrap();
        store.create(second).unwrap();

        assert!(store.delete(&launch.id).unwrap());
        assert_eq!(store.get(&launch.id).unwrap(), None);
        assert!(!store.delete(&launch.id).unwrap());

        let stats = store.stats();
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.all_tags, vec!["work"]);
        assert_eq!(store.list(&ListQuery::default()).len(), 1);
    }

    #[test]
    fn test_list_applies_query() {
        let (_dir, mut store) = open_temp();
        store.create(input("Beta", "2024-03-01")).unwrap();
        store.create(input("alpha", "2024-01-01")).unwrap();
        store.create(input("Gamma", "not a date")).unwrap_err();

        let query = ListQuery {
            sort_by: SortKey::Name,
            order: SortOrder::Desc,
            ..ListQuery::default()
        };
        let names: Vec<String> = store.list(&query).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Beta", "alpha"]);
    }

    #[test]
    fn test_failed_save_is_reported_and_rolled_back() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut store = JsonEventStore::open(blocker.join("events_data.json"));
        let err = store.create(input("Launch", "2024-05-01")).unwrap_err();

        assert!(matches!(err, EventDeskError::Io(_)));
        assert!(store.is_empty());
        assert_eq!(store.stats().total_events, 0);
    }

    #[test]
    fn test_name_limit_follows_rules() {
        let (_dir, store) = open_temp();
        let mut store = store.with_rules(Rules::RELATIONAL);

        let long_name = "n".repeat(150);
        let event = store.create(input(&long_name, "2024-05-01")).unwrap();
        assert_eq!(event.name.len(), 150);
    }
}
