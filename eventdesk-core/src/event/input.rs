//! Event input from the request layer.

use serde::{Deserialize, Serialize};

use super::rules::{Rules, TagInput};

/// Raw field mapping supplied by a caller.
///
/// Every field is optional: on create, missing fields become empty values
/// (and then fail validation); on update, missing fields are left alone.
/// Any `id` key in the input is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// Tags as a list or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    /// Lists are kept as given. Comma-separated text is split according to
    /// `mode`; neither mode removes duplicates.
    pub fn into_tags(self, mode: TagInput) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Text(text) => match mode {
                TagInput::Trimmed => text
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect(),
                TagInput::Verbatim if text.is_empty() => Vec::new(),
                TagInput::Verbatim => text.split(',').map(String::from).collect(),
            },
        }
    }
}

impl From<Vec<String>> for TagsInput {
    fn from(tags: Vec<String>) -> Self {
        TagsInput::List(tags)
    }
}

impl From<&str> for TagsInput {
    fn from(text: &str) -> Self {
        TagsInput::Text(text.to_string())
    }
}

/// Fields for a new event, all present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update. `Some` marks a supplied field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EventInput {
    pub fn into_new_event(self, rules: &Rules) -> NewEvent {
        NewEvent {
            name: self.name.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            description: self.description,
            tags: self
                .tags
                .map(|tags| tags.into_tags(rules.tag_input))
                .unwrap_or_default(),
        }
    }

    pub fn into_patch(self, rules: &Rules) -> EventPatch {
        EventPatch {
            name: self.name,
            date: self.date,
            location: self.location,
            description: self.description,
            tags: self.tags.map(|tags| tags.into_tags(rules.tag_input)),
        }
    }
}
