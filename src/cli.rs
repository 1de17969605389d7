// src/cli.rs

use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "devlog - A minimalist developer journal for the command line",
    long_about = "devlog keeps short dated notes tagged with labels, a project and a status. Entries live in a single local SQLite file that can be listed, searched, summarized, exported and backed up."
)]
pub struct Cli {
    /// Path of the log store. Overrides the DEVLOG_DB environment variable.
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates or upgrades the log store and prints where it lives.
    Init,

    /// Adds a new log entry.
    /// If no content is given, it opens the default editor.
    Add {
        #[arg(help = "The log text")]
        content: Option<String>,
        #[arg(short, long, help = "Comma-separated tags to categorize the log")]
        tags: Option<String>,
        #[arg(short, long, help = "Project the log belongs to")]
        project: Option<String>,
        #[arg(
            short,
            long,
            help = "Status: pending, completed, in-progress, none, or any custom value"
        )]
        status: Option<String>,
    },

    /// Lists log entries, newest first.
    #[command(alias = "ls")]
    List {
        #[arg(short = 'n', long, default_value_t = 10, allow_negative_numbers = true, help = "Show latest N entries")]
        limit: i64,
        #[arg(short, long, help = "Only entries whose tags contain this text")]
        tag: Option<String>,
        #[arg(short, long, help = "Only entries whose content contains this text")]
        grep: Option<String>,
        #[arg(short, long, help = "Only entries of this project")]
        project: Option<String>,
        #[arg(short, long, help = "Only entries with this status")]
        status: Option<String>,
    },

    /// Shows a single entry in full.
    View {
        #[arg(help = "The numeric ID of the log entry")]
        id: i64,
    },

    /// Edits an existing entry. Without any option the content opens in the default editor.
    Edit {
        #[arg(help = "The numeric ID of the log entry to edit")]
        id: i64,
        #[arg(short, long, help = "Replace the content")]
        content: Option<String>,
        #[arg(short, long, help = "Replace the tags (empty string clears them)")]
        tags: Option<String>,
        #[arg(short, long, help = "Replace the project (empty string clears it)")]
        project: Option<String>,
        #[arg(short, long, help = "Replace the status")]
        status: Option<String>,
    },

    /// Deletes one or more log entries.
    #[command(verbatim_doc_comment)]
    Delete {
        /// A list of log IDs to delete.
        /// Can be a single ID, comma-separated IDs, or a range.
        /// Examples:
        ///   devlog delete 5          (deletes log #5)
        ///   devlog delete 3,5,8      (deletes logs #3, #5, #8)
        ///   devlog delete 7-9        (deletes logs #7, #8, #9)
        ///   devlog delete 3,7-9,12   (deletes logs #3, #7, #8, #9, #12)
        #[arg(value_name = "ID_LIST")]
        ids: String,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Full-text search over content, tags, project and status.
    Search {
        #[arg(help = "Search terms")]
        query: String,
    },

    /// Shows tag and activity statistics.
    Stats {
        #[arg(short, long, help = "Only count entries of this project")]
        project: Option<String>,
    },

    /// Exports every entry to a file.
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
        #[arg(short, long, help = "Output file (default: devlog_export.md or .json)")]
        output: Option<PathBuf>,
    },

    /// Backs up the log store to a directory or a git remote.
    Sync {
        #[arg(help = "Local directory or git repository URL")]
        destination: String,
    },
}
