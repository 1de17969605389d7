// src/config.rs

use crate::error::{DevlogError, Result};
use std::path::PathBuf;

pub const DB_ENV_VAR: &str = "DEVLOG_DB";
pub const BACKUP_DIR_ENV_VAR: &str = "DEVLOG_BACKUP_DIR";

/// Settings resolved once at start-up and handed to the commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// Working copy used when backing up to a git remote.
    pub backup_dir: PathBuf,
    pub editor: String,
}

impl Config {
    /// `--db` flag, then `DEVLOG_DB`, then `~/.devlog.db`.
    pub fn from_env(db_override: Option<PathBuf>) -> Result<Self> {
        Self::resolve(db_override, |key| std::env::var(key).ok(), dirs::home_dir())
    }

    fn resolve(
        db_override: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let from_env = |key: &str| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let db_path = match db_override.or_else(|| from_env(DB_ENV_VAR)) {
            Some(p) => p,
            None => home.as_ref().ok_or(DevlogError::HomeDirNotFound)?.join(".devlog.db"),
        };
        let backup_dir = match from_env(BACKUP_DIR_ENV_VAR) {
            Some(p) => p,
            None => home.as_ref().ok_or(DevlogError::HomeDirNotFound)?.join(".devlog-backup"),
        };
        let editor = env("EDITOR").unwrap_or_else(|| "vi".to_string());

        Ok(Self {
            db_path,
            backup_dir,
            editor,
        })
    }
}
