use anyhow::Result;
use eventdesk_core::EventDeskError;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::output::Output;
use crate::render::Render;
use crate::session::Session;

pub fn add(session: &Session, username: &str, email: &str, out: &Output) -> Result<()> {
    let user = session.users()?.create_user(username, email)?;

    out.success(json!({ "user": user }), || {
        format!("{} {}", "Created user".green(), user.render())
    });
    Ok(())
}

pub fn remove(session: &Session, username: &str, out: &Output) -> Result<()> {
    let users = session.users()?;
    let user = users
        .find_user(username)?
        .ok_or_else(|| EventDeskError::UserNotFound(username.to_string()))?;

    users.delete_user(user.id)?;

    out.success(json!({ "user": user }), || {
        format!("{} {} and their events", "Removed user".green(), user.username.bold())
    });
    Ok(())
}
