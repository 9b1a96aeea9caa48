use anyhow::Result;
use serde_json::json;

use crate::output::Output;
use crate::render::Render;
use crate::session::Session;

pub fn run(session: &mut Session, out: &Output) -> Result<()> {
    let stats = session.with_events(|store| Ok(store.stats()))?;

    out.success(json!({ "stats": stats }), || stats.render());
    Ok(())
}
