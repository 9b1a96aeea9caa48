use anyhow::Result;
use eventdesk_core::EventInput;
use eventdesk_core::event::TagsInput;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::output::Output;
use crate::render::Render;
use crate::session::Session;

pub struct Draft {
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
    pub tags: Option<String>,
}

impl From<Draft> for EventInput {
    fn from(draft: Draft) -> Self {
        EventInput {
            name: Some(draft.name),
            date: Some(draft.date),
            location: Some(draft.location),
            description: draft.description,
            tags: draft.tags.map(TagsInput::Text),
        }
    }
}

pub fn run(session: &mut Session, draft: Draft, out: &Output) -> Result<()> {
    let event = session.with_events(|store| Ok(store.create(draft.into())?))?;

    out.success(
        json!({ "event": event, "message": "Event created successfully" }),
        || format!("{} {}", "Event created successfully:".green(), event.render()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_keeps_tag_text_for_the_store_to_split() {
        let input = EventInput::from(Draft {
            name: "Launch".to_string(),
            date: "2024-05-01".to_string(),
            location: "Rooftop".to_string(),
            description: None,
            tags: Some("work, party".to_string()),
        });

        assert_eq!(input.name.as_deref(), Some("Launch"));
        assert_eq!(input.tags, Some(TagsInput::Text("work, party".to_string())));
    }
}
