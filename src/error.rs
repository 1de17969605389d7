// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevlogError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Cannot open log store at {path:?}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("Malformed search query: {0}")]
    SearchSyntax(String),

    #[error("Cannot write export to {path:?}: {source}")]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sync failed: {0}")]
    Sync(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Editor exited with a non-zero status")]
    EditorError,

    #[error("Log ID {0} not found")]
    LogNotFound(i64),

    #[error("No changes detected in log entry")]
    NoChangesMade,
}

impl DevlogError {
    /// Conditions that are reported to the user but leave the process exit
    /// status at zero.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DevlogError::LogNotFound(_) | DevlogError::NoChangesMade | DevlogError::Sync(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DevlogError>;
