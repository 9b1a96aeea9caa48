use anyhow::Result;
use eventdesk_core::{EventDeskError, EventId};
use owo_colors::OwoColorize;
use serde_json::json;

use crate::output::Output;
use crate::session::Session;

pub fn run(session: &mut Session, id: &str, out: &Output) -> Result<()> {
    let id: EventId = id.parse()?;

    if !session.with_events(|store| Ok(store.delete(&id)?))? {
        return Err(EventDeskError::NotFound.into());
    }

    out.success(json!({ "message": "Event deleted successfully" }), || {
        "Event deleted successfully".green().to_string()
    });
    Ok(())
}
