//! SQLite event storage with per-user ownership.
//!
//! Events belong to exactly one user. Every event operation goes through a
//! [`UserEvents`] handle, which restricts each query to that user's rows.
//! Removing a user removes their events through the foreign key
//! (`ON DELETE CASCADE`).
//!
//! The shared name, search and tag rules are registered as SQL functions so
//! that they run inside the scoped queries:
//! - `name_key(name)`
//! - `event_matches(name, location, description, tags, term)`
//! - `event_has_tag(tags, tag)`

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use serde::Serialize;
use tracing::{error, info};

use super::{EventStore, Stats};
use crate::error::{EventDeskError, EventDeskResult};
use crate::event::{Event, EventId, EventInput, Rules, UserId, name_key};
use crate::query::{ListQuery, has_tag, sort, text_matches};

const SCHEMA: &str = r"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        date TEXT NOT NULL,
        location TEXT NOT NULL,
        description TEXT,
        tags TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id);
";

const EVENT_COLUMNS: &str =
    "id, name, date, location, description, tags, created_at, updated_at, user_id";

/// A user that owns events. Authentication happens elsewhere; this is only
/// the ownership record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite event store.
pub struct SqliteEventStore {
    conn: Connection,
    rules: Rules,
}

impl SqliteEventStore {
    /// Open (or create) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(db_path: P) -> EventDeskResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self::init(Connection::open(db_path)?)?;
        info!("Opened event database at {}", db_path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> EventDeskResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> EventDeskResult<Self> {
        conn.execute_batch(SCHEMA)?;
        register_functions(&conn)?;
        Ok(SqliteEventStore {
            conn,
            rules: Rules::RELATIONAL,
        })
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Event operations restricted to `user_id`.
    pub fn for_user(&self, user_id: UserId) -> UserEvents<'_> {
        UserEvents {
            conn: &self.conn,
            user_id,
            rules: self.rules,
        }
    }

    pub fn create_user(&self, username: &str, email: &str) -> EventDeskResult<User> {
        let created_at = Utc::now();

        let inserted = self.conn.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![username, email, timestamp(created_at)],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, message))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                let on_email = message.as_deref().is_some_and(|m| m.contains("users.email"));
                return Err(if on_email {
                    EventDeskError::EmailTaken(email.to_string())
                } else {
                    EventDeskError::UserExists(username.to_string())
                });
            }
            Err(e) => return Err(e.into()),
        }

        let user = User {
            id: UserId(self.conn.last_insert_rowid()),
            username: username.to_string(),
            email: email.to_string(),
            created_at,
        };
        info!("Created user: {} (ID: {})", user.username, user.id);
        Ok(user)
    }

    pub fn find_user(&self, username: &str) -> EventDeskResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        username: row.get(1)?,
                        email: row.get(2)?,
                        created_at: parse_timestamp(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Delete a user together with all of their events.
    pub fn delete_user(&self, user_id: UserId) -> EventDeskResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", [user_id.0])?;
        if deleted > 0 {
            info!("Deleted user ID {} and their events", user_id);
        }
        Ok(deleted > 0)
    }

    /// Number of events across all users.
    pub fn total_events(&self) -> EventDeskResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("name_key", 1, flags, |ctx| {
        let name: String = ctx.get(0)?;
        Ok(name_key(&name))
    })?;

    conn.create_scalar_function("event_matches", 5, flags, |ctx| {
        let name: String = ctx.get(0)?;
        let location: String = ctx.get(1)?;
        let description: Option<String> = ctx.get(2)?;
        let tags: Option<String> = ctx.get(3)?;
        let term: String = ctx.get(4)?;
        Ok(text_matches(
            &name,
            &location,
            description.as_deref().unwrap_or_default(),
            &tags_from_column(tags.as_deref()),
            &term,
        ))
    })?;

    conn.create_scalar_function("event_has_tag", 2, flags, |ctx| {
        let tags: Option<String> = ctx.get(0)?;
        let tag: String = ctx.get(1)?;
        Ok(has_tag(&tags_from_column(tags.as_deref()), &tag))
    })?;

    Ok(())
}

/// Tags are stored comma-joined.
fn tags_to_column(tags: &[String]) -> String {
    tags.join(",")
}

fn tags_from_column(tags: Option<&str>) -> Vec<String> {
    match tags {
        None | Some("") => Vec::new(),
        Some(joined) => joined.split(',').map(String::from).collect(),
    }
}

/// `tags` as they read back from the column.
fn stored_tags(tags: &[String]) -> Vec<String> {
    tags_from_column(Some(&tags_to_column(tags)))
}

fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    let tags: Option<String> = row.get(5)?;
    Ok(Event {
        id: EventId::Row(row.get(0)?),
        name: row.get(1)?,
        date: row.get(2)?,
        location: row.get(3)?,
        description: row.get(4)?,
        tags: tags_from_column(tags.as_deref()),
        created_at: parse_timestamp(row, 6)?,
        updated_at: parse_timestamp(row, 7)?,
        user_id: Some(UserId(row.get(8)?)),
    })
}

/// The relational store only hands out row ids.
fn row_id(id: &EventId) -> Option<i64> {
    match id {
        EventId::Row(row) => Some(*row),
        EventId::Uuid(_) => None,
    }
}

/// Events of one user.
pub struct UserEvents<'a> {
    conn: &'a Connection,
    user_id: UserId,
    rules: Rules,
}

impl UserEvents<'_> {
    fn try_list(&self, query: &ListQuery) -> EventDeskResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE user_id = ?1
               AND (?2 IS NULL OR event_matches(name, location, description, tags, ?2))
               AND (?3 IS NULL OR event_has_tag(tags, ?3))
             ORDER BY id"
        ))?;

        let rows = stmt.query_map(
            params![self.user_id.0, query.search_term(), query.tag_filter()],
            row_to_event,
        )?;
        let events = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(sort(&events, query.sort_by, query.order))
    }

    fn try_stats(&self) -> EventDeskResult<Stats> {
        let events = self.try_list(&ListQuery::default())?;
        Ok(Stats::from_events(&events))
    }
}

fn fetch(conn: &Connection, user_id: UserId, row: i64) -> rusqlite::Result<Option<Event>> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1 AND user_id = ?2"),
        params![row, user_id.0],
        row_to_event,
    )
    .optional()
}

fn name_taken(
    conn: &Connection,
    user_id: UserId,
    name: &str,
    except: Option<i64>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
             SELECT 1 FROM events
             WHERE user_id = ?1
               AND name_key(name) = name_key(?2)
               AND (?3 IS NULL OR id != ?3)
         )",
        params![user_id.0, name, except],
        |row| row.get(0),
    )
}

impl EventStore for UserEvents<'_> {
    fn rules(&self) -> &Rules {
        &self.rules
    }

    fn create(&mut self, input: EventInput) -> EventDeskResult<Event> {
        let draft = input.into_new_event(&self.rules);
        let mut event = Event::new(EventId::Row(0), draft, Utc::now()).with_owner(self.user_id);
        event.tags = stored_tags(&event.tags);

        let errors = event.validate(&self.rules);
        if !errors.is_empty() {
            return Err(EventDeskError::Validation(errors));
        }

        let tx = self.conn.unchecked_transaction()?;

        if name_taken(&tx, self.user_id, &event.name, None)? {
            return Err(EventDeskError::DuplicateName);
        }

        tx.execute(
            "INSERT INTO events (name, date, location, description, tags, created_at, updated_at, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.name,
                event.date,
                event.location,
                event.description,
                tags_to_column(&event.tags),
                timestamp(event.created_at),
                timestamp(event.updated_at),
                self.user_id.0,
            ],
        )?;
        event.id = EventId::Row(tx.last_insert_rowid());
        tx.commit()?;

        info!("Created event: {} (ID: {}, user {})", event.name, event.id, self.user_id);
        Ok(event)
    }

    fn get(&self, id: &EventId) -> EventDeskResult<Option<Event>> {
        let Some(row) = row_id(id) else {
            return Ok(None);
        };
        Ok(fetch(self.conn, self.user_id, row)?)
    }

    fn update(&mut self, id: &EventId, input: EventInput) -> EventDeskResult<Event> {
        let row = row_id(id).ok_or(EventDeskError::NotFound)?;
        let tx = self.conn.unchecked_transaction()?;

        let mut event = fetch(&tx, self.user_id, row)?.ok_or(EventDeskError::NotFound)?;
        event.apply(&input.into_patch(&self.rules), Utc::now());
        event.tags = stored_tags(&event.tags);

        let errors = event.validate(&self.rules);
        if !errors.is_empty() {
            return Err(EventDeskError::Validation(errors));
        }

        if name_taken(&tx, self.user_id, &event.name, Some(row))? {
            return Err(EventDeskError::DuplicateName);
        }

        tx.execute(
            "UPDATE events
             SET name = ?1, date = ?2, location = ?3, description = ?4, tags = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                event.name,
                event.date,
                event.location,
                event.description,
                tags_to_column(&event.tags),
                timestamp(event.updated_at),
                row,
                self.user_id.0,
            ],
        )?;
        tx.commit()?;

        info!("Updated event: {} (ID: {}, user {})", event.name, event.id, self.user_id);
        Ok(event)
    }

    fn delete(&mut self, id: &EventId) -> EventDeskResult<bool> {
        let Some(row) = row_id(id) else {
            return Ok(false);
        };

        let tx = self.conn.unchecked_transaction()?;
        let deleted = tx.execute(
            "DELETE FROM events WHERE id = ?1 AND user_id = ?2",
            params![row, self.user_id.0],
        )?;
        tx.commit()?;

        if deleted > 0 {
            info!("Deleted event ID {} (user {})", row, self.user_id);
        }
        Ok(deleted > 0)
    }

    fn list(&self, query: &ListQuery) -> Vec<Event> {
        self.try_list(query).unwrap_or_else(|e| {
            error!("Error getting events for user {}: {e}", self.user_id);
            Vec::new()
        })
    }

    fn stats(&self) -> Stats {
        self.try_stats().unwrap_or_else(|e| {
            error!("Error getting stats for user {}: {e}", self.user_id);
            Stats::default()
        })
    }
}
