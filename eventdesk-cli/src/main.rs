mod commands;
mod output;
mod render;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventdesk_core::config::Settings;
use tracing_subscriber::EnvFilter;

use crate::output::Output;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Organize events in a local JSON file or SQLite database")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Act as this user (required by the sqlite backend)
    #[arg(short, long, global = true, env = "EVENTDESK_USER")]
    user: Option<String>,

    /// Read settings from this file instead of ~/.config/eventdesk/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List events
    List {
        /// Only events whose name, location, description or tags contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only events carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// name, date, location, created_at or updated_at
        #[arg(long, default_value = "date")]
        sort_by: String,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: String,
    },
    /// Show one event
    Show { id: String },
    /// Create an event
    Add {
        name: String,

        /// ISO date or date-time (e.g., "2025-03-20" or "2025-03-20T15:00")
        #[arg(short, long)]
        date: String,

        #[arg(short, long)]
        location: String,

        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Change fields of an event
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tags (replaces the existing ones)
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Delete an event
    Remove { id: String },
    /// Event count and tags in use
    Stats,
    /// Manage users (sqlite backend)
    #[command(subcommand)]
    User(UserCommand),
    /// Show resolved settings
    Config,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Register a user
    Add { username: String, email: String },
    /// Delete a user and all of their events
    Remove { username: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let out = Output::new(cli.json);

    match run(cli, &out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            out.error(&err);
            ExitCode::from(output::exit_code(&err))
        }
    }
}

fn run(cli: Cli, out: &Output) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let user = cli.user;
    let open = move |settings: Settings| Session::open(settings, user);

    match cli.command {
        Commands::List {
            search,
            tag,
            sort_by,
            order,
        } => commands::list::run(&mut open(settings)?, search, tag, &sort_by, &order, out),
        Commands::Show { id } => commands::show::run(&mut open(settings)?, &id, out),
        Commands::Add {
            name,
            date,
            location,
            description,
            tags,
        } => {
            let draft = commands::add::Draft {
                name,
                date,
                location,
                description,
                tags,
            };
            commands::add::run(&mut open(settings)?, draft, out)
        }
        Commands::Edit {
            id,
            name,
            date,
            location,
            description,
            tags,
        } => {
            let changes = commands::edit::Changes {
                name,
                date,
                location,
                description,
                tags,
            };
            commands::edit::run(&mut open(settings)?, &id, changes, out)
        }
        Commands::Remove { id } => commands::remove::run(&mut open(settings)?, &id, out),
        Commands::Stats => commands::stats::run(&mut open(settings)?, out),
        Commands::User(UserCommand::Add { username, email }) => {
            commands::user::add(&open(settings)?, &username, &email, out)
        }
        Commands::User(UserCommand::Remove { username }) => {
            commands::user::remove(&open(settings)?, &username, out)
        }
        Commands::Config => commands::config::run(&settings, cli.config.as_deref(), out),
    }
}
