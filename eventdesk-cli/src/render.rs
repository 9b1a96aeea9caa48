//! Terminal rendering for eventdesk types.
//!
//! Extension traits that add colored output to eventdesk-core types using
//! owo_colors.

use eventdesk_core::Stats;
use eventdesk_core::date::format_date_display;
use eventdesk_core::event::Event;
use eventdesk_core::store::User;
use owo_colors::OwoColorize;

/// One-line colored summary.
pub trait Render {
    fn render(&self) -> String;
}

/// Multi-line colored view with every field.
pub trait RenderDetail {
    fn render_detail(&self) -> String;
}

fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {} {} {}",
            format!("[{}]", self.id).dimmed(),
            self.name.bold(),
            format_date_display(&self.date).cyan(),
            format!("@ {}", self.location).dimmed()
        );

        if !self.tags.is_empty() {
            line.push(' ');
            line.push_str(&render_tags(&self.tags).yellow().to_string());
        }

        line
    }
}

impl RenderDetail for Event {
    fn render_detail(&self) -> String {
        let mut lines = vec![
            self.name.bold().to_string(),
            format!("  {}  {}", "When:".dimmed(), format_date_display(&self.date)),
            format!("  {} {}", "Where:".dimmed(), self.location),
        ];

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("  {}  {}", "What:".dimmed(), description));
        }
        if !self.tags.is_empty() {
            lines.push(format!("  {}  {}", "Tags:".dimmed(), render_tags(&self.tags).yellow()));
        }

        lines.push(
            format!(
                "  id {} | created {} | updated {}",
                self.id,
                self.created_at.format("%Y-%m-%d %H:%M"),
                self.updated_at.format("%Y-%m-%d %H:%M")
            )
            .dimmed()
            .to_string(),
        );

        lines.join("\n")
    }
}

impl Render for Stats {
    fn render(&self) -> String {
        let tags = if self.all_tags.is_empty() {
            "none".dimmed().to_string()
        } else {
            render_tags(&self.all_tags).yellow().to_string()
        };

        format!(
            "{} {}\n{} {} ({})",
            "Events:".bold(),
            self.total_events,
            "Tags:".bold(),
            self.unique_tags,
            tags
        )
    }
}

impl Render for User {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.username.bold(),
            format!("<{}>", self.email).dimmed(),
            format!("(ID: {})", self.id).dimmed()
        )
    }
}
