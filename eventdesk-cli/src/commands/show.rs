use anyhow::Result;
use eventdesk_core::{EventDeskError, EventId};
use serde_json::json;

use crate::output::Output;
use crate::render::RenderDetail;
use crate::session::Session;

pub fn run(session: &mut Session, id: &str, out: &Output) -> Result<()> {
    let id: EventId = id.parse()?;

    let event = session
        .with_events(|store| Ok(store.get(&id)?))?
        .ok_or(EventDeskError::NotFound)?;

    out.success(json!({ "event": event }), || event.render_detail());
    Ok(())
}
