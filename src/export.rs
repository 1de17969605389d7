// src/export.rs

use crate::error::{DevlogError, Result};
use crate::models::LogEntry;
use clap::ValueEnum;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("devlog_export.{}", self.extension())
    }
}

/// Renders `entries` (already ordered) as a single document.
pub fn render(entries: &[LogEntry], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Markdown => Ok(render_markdown(entries)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
    }
}

fn render_markdown(entries: &[LogEntry]) -> String {
    let mut out = String::from("# DevLog Export\n\n");
    for entry in entries {
        // 写入 String 不会失败
        let _ = writeln!(out, "## {}\n", entry.display_time("%Y-%m-%d %H:%M"));
        if !entry.tags.is_empty() {
            let _ = writeln!(out, "**Tags:** {}\n", entry.tags);
        }
        let _ = writeln!(out, "{}\n", entry.content.trim_end());
        out.push_str("---\n\n");
    }
    out
}

/// Writes a rendered document. The store is never touched here.
pub fn write_export(path: &Path, document: &str) -> Result<()> {
    std::fs::write(path, document).map_err(|source| DevlogError::ExportWrite {
        path: path.to_path_buf(),
        source,
    })
}
