use anyhow::Result;
use eventdesk_core::event::TagsInput;
use eventdesk_core::{EventId, EventInput};
use owo_colors::OwoColorize;
use serde_json::json;

use crate::output::Output;
use crate::render::Render;
use crate::session::Session;

/// Fields given on the command line; the rest stay as they are.
pub struct Changes {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

impl From<Changes> for EventInput {
    fn from(changes: Changes) -> Self {
        EventInput {
            name: changes.name,
            date: changes.date,
            location: changes.location,
            description: changes.description,
            tags: changes.tags.map(TagsInput::Text),
        }
    }
}

pub fn run(session: &mut Session, id: &str, changes: Changes, out: &Output) -> Result<()> {
    let id: EventId = id.parse()?;
    let event = session.with_events(|store| Ok(store.update(&id, changes.into())?))?;

    out.success(
        json!({ "event": event, "message": "Event updated successfully" }),
        || format!("{} {}", "Event updated successfully:".green(), event.render()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_flags_are_left_out() {
        let input = EventInput::from(Changes {
            name: None,
            date: None,
            location: Some("Library".to_string()),
            description: None,
            tags: None,
        });

        assert_eq!(
            input,
            EventInput {
                location: Some("Library".to_string()),
                ..EventInput::default()
            }
        );
    }
}
