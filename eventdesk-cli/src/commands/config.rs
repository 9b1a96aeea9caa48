use std::path::Path;

use anyhow::Result;
use eventdesk_core::config::{BackendKind, Settings};
use owo_colors::OwoColorize;
use serde_json::json;

use crate::output::Output;

pub fn run(settings: &Settings, config_override: Option<&Path>, out: &Output) -> Result<()> {
    let config_path = match config_override {
        Some(path) => path.to_path_buf(),
        None => Settings::config_path()?,
    };

    let storage = match settings.backend {
        BackendKind::Json => settings.data_file_path().display().to_string(),
        BackendKind::Sqlite => match settings.database_path()? {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        },
    };
    let resolved = settings.to_toml()?;

    out.success(
        json!({
            "config_path": config_path,
            "storage": storage,
            "settings": settings,
        }),
        || {
            format!(
                "{}\n  Config:   {}\n  Storage:  {}\n\n{}\n{}",
                "Paths".bold(),
                config_path.display(),
                storage,
                "Settings".bold(),
                resolved.trim_end()
            )
        },
    );
    Ok(())
}
