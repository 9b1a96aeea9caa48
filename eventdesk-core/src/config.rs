//! Settings at ~/.config/eventdesk/config.toml, overridable from the
//! environment.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{EventDeskError, EventDeskResult};
use crate::event::Rules;

static DEFAULT_DATA_FILE: &str = "~/.eventdesk/events_data.json";
static DEFAULT_DATABASE_URL: &str = "sqlite://~/.eventdesk/events.db";

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

/// Which store variant to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Json,
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Json => "json",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default = "default_data_file")]
    pub data_file: String,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Overrides the backend's own name length limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_name_chars: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend: BackendKind::default(),
            data_file: default_data_file(),
            database_url: default_database_url(),
            max_name_chars: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> EventDeskResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventDeskError::Config("Could not determine config directory".into()))?
            .join("eventdesk");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from `config_path` (or the default location, which is
    /// created on first use), then apply `.env` and environment overrides.
    ///
    /// `EVENTDESK_<KEY>` overrides any key. `DATABASE_URL` overrides
    /// `database_url` and wins over `EVENTDESK_DATABASE_URL`.
    pub fn load(config_path: Option<&Path>) -> EventDeskResult<Self> {
        dotenvy::dotenv().ok();

        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    Self::create_default_config(&path)?;
                }
                path
            }
        };

        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("EVENTDESK").try_parsing(true))
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())
            .map_err(|e| EventDeskError::Config(e.to_string()))?
            .build()
            .map_err(|e| EventDeskError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventDeskError::Config(e.to_string()))?;

        Ok(settings)
    }

    /// Load settings from `path` alone, without consulting the environment.
    pub fn from_file(path: &Path) -> EventDeskResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| EventDeskError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventDeskError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventDeskResult<()> {
        let contents = format!(
            "\
# eventdesk configuration

# Storage backend, \"json\" or \"sqlite\":
# backend = \"json\"

# Event file used by the json backend:
# data_file = \"{DEFAULT_DATA_FILE}\"

# Database used by the sqlite backend (\"sqlite://:memory:\" keeps it in memory):
# database_url = \"{DEFAULT_DATABASE_URL}\"

# Longest allowed event name, overriding the backend default:
# max_name_chars = 100
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventDeskError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventDeskError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Resolved settings rendered as TOML.
    pub fn to_toml(&self) -> EventDeskResult<String> {
        toml::to_string_pretty(self).map_err(|e| EventDeskError::Config(e.to_string()))
    }

    pub fn data_file_path(&self) -> PathBuf {
        expand(&self.data_file)
    }

    /// Database file named by `database_url`, or `None` for an in-memory
    /// database.
    ///
    /// Accepts a plain path, `sqlite:///relative.db`, `sqlite:////abs.db`
    /// and `sqlite://~/home.db`.
    pub fn database_path(&self) -> EventDeskResult<Option<PathBuf>> {
        let url = self.database_url.trim();

        let location = if let Some(rest) = url.strip_prefix("sqlite:///") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if url.contains("://") {
            return Err(EventDeskError::Config(format!(
                "Unsupported database URL: {url}"
            )));
        } else {
            url
        };

        if location.is_empty() || location == ":memory:" {
            return Ok(None);
        }

        Ok(Some(expand(location)))
    }

    /// `base` with the configured name limit applied.
    pub fn rules_for(&self, base: Rules) -> Rules {
        match self.max_name_chars {
            Some(max) => base.with_max_name_chars(max),
            None => base,
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
