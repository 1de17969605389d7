// src/main.rs

mod cli;
mod commands;
mod config;
mod db;
mod error;
mod export;
mod models;
mod search;
mod stats;
mod sync;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{DevlogError, Result};
use models::{EntryUpdate, LogFilter};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devlog=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        match &e {
            DevlogError::Sync(_) => eprintln!("{} {}", "Warning:".yellow().bold(), e),
            err if err.is_recoverable() => println!("{}", e),
            _ => {
                tracing::debug!(error = ?e, "command failed");
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = Config::from_env(cli.db)?;
    tracing::debug!(db = %cfg.db_path.display(), "configuration resolved");

    match cli.command {
        Commands::Init => commands::handle_init(&cfg),
        Commands::Add {
            content,
            tags,
            project,
            status,
        } => commands::handle_add(&cfg, content, tags, project, status),
        Commands::List {
            limit,
            tag,
            grep,
            project,
            status,
        } => commands::handle_list(&cfg, limit, LogFilter::new(tag, grep, project, status)),
        Commands::View { id } => commands::handle_view(&cfg, id),
        Commands::Edit {
            id,
            content,
            tags,
            project,
            status,
        } => commands::handle_edit(
            &cfg,
            id,
            EntryUpdate {
                content,
                tags,
                project,
                status,
            },
        ),
        Commands::Delete { ids, yes } => commands::handle_delete(&cfg, &ids, yes),
        Commands::Search { query } => commands::handle_search(&cfg, &query),
        Commands::Stats { project } => commands::handle_stats(&cfg, project),
        Commands::Export { format, output } => commands::handle_export(&cfg, format, output),
        Commands::Sync { destination } => commands::handle_sync(&cfg, &destination),
    }
}
