use anyhow::Result;
use eventdesk_core::{ListQuery, SortKey, SortOrder};
use owo_colors::OwoColorize;
use serde_json::json;

use crate::output::Output;
use crate::render::Render;
use crate::session::Session;

pub fn run(
    session: &mut Session,
    search: Option<String>,
    tag: Option<String>,
    sort_by: &str,
    order: &str,
    out: &Output,
) -> Result<()> {
    let query = ListQuery {
        search,
        tag,
        sort_by: SortKey::parse(sort_by),
        order: SortOrder::parse(order),
    };

    let events = session.with_events(|store| Ok(store.list(&query)))?;

    out.success(json!({ "events": events, "total": events.len() }), || {
        if events.is_empty() {
            return "No events found".dimmed().to_string();
        }
        events
            .iter()
            .map(|event| event.render())
            .collect::<Vec<_>>()
            .join("\n")
    });

    Ok(())
}
