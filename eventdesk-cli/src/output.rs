//! Human or JSON output for command results and errors.

use eventdesk_core::EventDeskError;
use eventdesk_core::error::ErrorKind;
use owo_colors::OwoColorize;
use serde_json::{Value, json};

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Output { json }
    }

    /// Print `payload` (with `"success": true` added) in JSON mode, or the
    /// text produced by `human` otherwise.
    pub fn success(&self, mut payload: Value, human: impl FnOnce() -> String) {
        if self.json {
            if let Value::Object(map) = &mut payload {
                map.insert("success".to_string(), Value::Bool(true));
            }
            println!("{}", to_pretty(&payload));
        } else {
            println!("{}", human());
        }
    }

    pub fn error(&self, err: &anyhow::Error) {
        if self.json {
            println!("{}", to_pretty(&error_payload(err)));
            return;
        }

        match err.downcast_ref::<EventDeskError>() {
            Some(EventDeskError::Validation(errors)) => {
                for message in errors {
                    eprintln!("{} {}", "error:".red().bold(), message);
                }
            }
            _ => eprintln!("{} {:#}", "error:".red().bold(), err),
        }
    }
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn error_payload(err: &anyhow::Error) -> Value {
    match err.downcast_ref::<EventDeskError>() {
        Some(e) => json!(e.to_payload()),
        None => json!({
            "success": false,
            "kind": ErrorKind::Storage,
            "errors": [format!("{err:#}")],
        }),
    }
}

/// 1 for storage and other failures, 2 for validation and conflicts,
/// 3 for missing events or users.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<EventDeskError>().map(EventDeskError::kind) {
        Some(ErrorKind::Validation | ErrorKind::Conflict) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Storage) | None => 1,
    }
}
