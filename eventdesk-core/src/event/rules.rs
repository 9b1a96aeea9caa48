//! Validation and uniqueness rules shared by every store.

use super::Event;
use crate::date::is_valid_date;

pub const MAX_LOCATION_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// How comma-separated tag text is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagInput {
    /// Trim each tag and drop blank ones
    Trimmed,
    /// Split on commas and keep every piece unchanged
    Verbatim,
}

/// Store-dependent validation settings.
///
/// The two store variants disagree on the longest allowed event name and
/// on whether tag text gets trimmed, so each carries its own rule set.
/// The checks themselves live here, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub max_name_chars: usize,
    pub tag_input: TagInput,
}

impl Rules {
    pub const JSON_FILE: Rules = Rules {
        max_name_chars: 100,
        tag_input: TagInput::Trimmed,
    };

    pub const RELATIONAL: Rules = Rules {
        max_name_chars: 200,
        tag_input: TagInput::Verbatim,
    };

    pub fn with_max_name_chars(self, max_name_chars: usize) -> Self {
        Rules {
            max_name_chars,
            ..self
        }
    }
}

/// Key under which event names must be unique.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

pub fn names_collide(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl Event {
    /// Check every field and collect the problems. An empty list means the
    /// event may be stored.
    pub fn validate(&self, rules: &Rules) -> Vec<String> {
        let mut errors = Vec::new();

        if is_blank(&self.name) {
            errors.push("Event name is required".to_string());
        }

        if is_blank(&self.date) {
            errors.push("Event date is required".to_string());
        } else if !is_valid_date(&self.date) {
            errors.push("Invalid date format".to_string());
        }

        if is_blank(&self.location) {
            errors.push("Event location is required".to_string());
        }

        if self.name.chars().count() > rules.max_name_chars {
            errors.push(format!(
                "Event name must be less than {} characters",
                rules.max_name_chars
            ));
        }

        if self.location.chars().count() > MAX_LOCATION_CHARS {
            errors.push(format!(
                "Location must be less than {} characters",
                MAX_LOCATION_CHARS
            ));
        }

        if self.description_text().chars().count() > MAX_DESCRIPTION_CHARS {
            errors.push(format!(
                "Description must be less than {} characters",
                MAX_DESCRIPTION_CHARS
            ));
        }

        errors
    }
}
