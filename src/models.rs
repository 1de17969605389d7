// src/models.rs

use crate::error::{DevlogError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Status used when none is given.
pub const DEFAULT_STATUS: &str = "none";

/// Suggested statuses. Any other string is accepted as a custom status.
pub const RECOMMENDED_STATUSES: &[&str] = &["pending", "completed", "in-progress", "none"];

/// Format used for newly written timestamps (local time, ISO-8601).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub content: String,
    pub timestamp: String, // 写入时为本地时间 ISO-8601 字符串
    pub tags: String,
    pub project: String,
    pub status: String,
}

impl LogEntry {
    /// First line of the content, used as a one-line preview.
    pub fn preview(&self) -> &str {
        self.content.lines().next().unwrap_or("").trim_end()
    }

    pub fn tag_list(&self) -> Vec<&str> {
        split_tags(&self.tags)
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Calendar date of the entry, taken from the stored timestamp.
    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed_timestamp().map(|dt| dt.date()).or_else(|| {
            self.timestamp
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        })
    }

    /// Timestamp formatted for display; falls back to the raw text.
    pub fn display_time(&self, fmt: &str) -> String {
        self.parsed_timestamp()
            .map(|dt| dt.format(fmt).to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

/// Parses both the naive ISO-8601 form this tool writes and RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// Splits a comma-separated tag string, trimming and dropping empty labels.
pub fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn normalize_label(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// A validated entry ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub content: String,
    pub tags: String,
    pub project: String,
    pub status: String,
}

impl NewEntry {
    pub fn new(
        content: &str,
        tags: Option<&str>,
        project: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(DevlogError::InvalidInput(
                "Log content cannot be empty.".to_string(),
            ));
        }
        Ok(Self {
            content: content.trim_end().to_string(),
            tags: normalize_label(tags).unwrap_or_default(),
            project: normalize_label(project).unwrap_or_default(),
            status: normalize_label(status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }
}

/// Fields changed by an edit. `id` and `timestamp` are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub content: Option<String>,
    pub tags: Option<String>,
    pub project: Option<String>,
    pub status: Option<String>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.tags.is_none()
            && self.project.is_none()
            && self.status.is_none()
    }

    /// Checks the update before it reaches the store. Tags and project may be
    /// cleared with an empty string; an empty status resets to the default.
    pub fn validated(self) -> Result<Self> {
        if self.is_empty() {
            return Err(DevlogError::NoChangesMade);
        }
        let content = match self.content {
            Some(c) if c.trim().is_empty() => {
                return Err(DevlogError::InvalidInput(
                    "Log content cannot be empty.".to_string(),
                ))
            }
            Some(c) => Some(c.trim_end().to_string()),
            None => None,
        };
        Ok(Self {
            content,
            tags: self.tags.map(|t| t.trim().to_string()),
            project: self.project.map(|p| p.trim().to_string()),
            status: self.status.map(|s| {
                normalize_label(Some(s.as_str())).unwrap_or_else(|| DEFAULT_STATUS.to_string())
            }),
        })
    }
}

/// List filters. Every set option must hold (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Literal, case-sensitive substring of `tags`.
    pub tag: Option<String>,
    /// Literal, case-sensitive substring of `content`.
    pub grep: Option<String>,
    pub project: Option<String>,
    pub status: Option<String>,
}

impl LogFilter {
    /// Builds a filter, treating empty strings as unset.
    pub fn new(
        tag: Option<String>,
        grep: Option<String>,
        project: Option<String>,
        status: Option<String>,
    ) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            tag: keep(tag),
            grep: keep(grep),
            project: keep(project),
            status: keep(status),
        }
    }

    pub fn for_project(project: Option<String>) -> Self {
        Self::new(None, None, project, None)
    }
}
