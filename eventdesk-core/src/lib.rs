//! Core of eventdesk, an event organizer.
//!
//! This crate provides everything below the request layer:
//! - `Event` records with validation and partial updates
//! - search, tag filtering and sorting of event lists
//! - two interchangeable stores behind the `EventStore` trait, a JSON file
//!   and a per-user SQLite database
//! - settings loading

pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod query;
pub mod store;

pub use error::{EventDeskError, EventDeskResult};
pub use event::{Event, EventId, EventInput, UserId};
pub use query::{ListQuery, SortKey, SortOrder};
pub use store::{Backend, EventStore, Stats};
