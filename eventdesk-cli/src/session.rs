//! The opened store plus the identity the command acts as.

use anyhow::{Result, anyhow, bail};
use eventdesk_core::config::Settings;
use eventdesk_core::store::{Backend, SqliteEventStore};
use eventdesk_core::{EventDeskError, EventStore};
use tracing::debug;

pub struct Session {
    backend: Backend,
    user: Option<String>,
}

impl Session {
    pub fn open(settings: Settings, user: Option<String>) -> Result<Self> {
        let backend = Backend::open(&settings)?;
        debug!("Opened {} backend", backend.kind().as_str());
        Ok(Session { backend, user })
    }

    /// Run `f` against the events visible to this session.
    ///
    /// The JSON backend is shared by everyone. The sqlite backend scopes
    /// events to `--user`, which must name a registered user.
    pub fn with_events<T>(&mut self, f: impl FnOnce(&mut dyn EventStore) -> Result<T>) -> Result<T> {
        match &mut self.backend {
            Backend::Json(store) => f(store),
            Backend::Sqlite(store) => {
                let username = self.user.as_deref().ok_or_else(|| {
                    anyhow!("The sqlite backend needs a user: pass --user or set EVENTDESK_USER")
                })?;
                let user = store
                    .find_user(username)?
                    .ok_or_else(|| EventDeskError::UserNotFound(username.to_string()))?;

                let mut events = store.for_user(user.id);
                f(&mut events)
            }
        }
    }

    pub fn users(&self) -> Result<&SqliteEventStore> {
        match &self.backend {
            Backend::Sqlite(store) => Ok(store),
            Backend::Json(_) => bail!("Users are only managed by the sqlite backend"),
        }
    }
}
