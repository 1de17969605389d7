// src/search.rs

use crate::db::row_to_entry;
use crate::error::{DevlogError, Result};
use crate::models::LogEntry;
use rusqlite::{Connection, ErrorCode};
use tracing::debug;

/// One way of answering a search query.
pub trait SearchStrategy {
    fn name(&self) -> &'static str;
    fn search(&self, conn: &Connection, query: &str) -> Result<Vec<LogEntry>>;
}

/// FTS5 match over content, tags, project and status, best match first.
/// The query is handed to FTS5 as written, so its operators apply.
pub struct FullText;

impl SearchStrategy for FullText {
    fn name(&self) -> &'static str {
        "full-text"
    }

    fn search(&self, conn: &Connection, query: &str) -> Result<Vec<LogEntry>> {
        run_match(conn, query)
    }
}

/// FTS5 match with every whitespace-separated term quoted, so punctuation
/// such as `in-progress`, `v1.2` or `a:b` and bare operator words are
/// searched as plain text.
pub struct QuotedTerms;

impl SearchStrategy for QuotedTerms {
    fn name(&self) -> &'static str {
        "quoted-terms"
    }

    fn search(&self, conn: &Connection, query: &str) -> Result<Vec<LogEntry>> {
        let expr = quote_terms(query);
        if expr.is_empty() {
            return Ok(Vec::new());
        }
        run_match(conn, &expr)
    }
}

/// Wraps each term in double quotes, doubling any quote inside it.
pub fn quote_terms(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_match(conn: &Connection, expr: &str) -> Result<Vec<LogEntry>> {
    let run = || -> rusqlite::Result<Vec<LogEntry>> {
        let mut stmt = conn.prepare(
            "SELECT logs.id, logs.content, logs.timestamp, logs.tags, logs.project, logs.status
             FROM logs_fts
             JOIN logs ON logs.id = logs_fts.rowid
             WHERE logs_fts MATCH ?1
             ORDER BY logs_fts.rank, logs.timestamp DESC",
        )?;
        let rows = stmt
            .query_map([expr], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    };
    run().map_err(classify_fts_error)
}

/// Literal, case-sensitive substring match on content or tags, newest first.
pub struct Substring;

impl SearchStrategy for Substring {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn search(&self, conn: &Connection, query: &str) -> Result<Vec<LogEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, content, timestamp, tags, project, status FROM logs
             WHERE instr(content, ?1) > 0 OR instr(tags, ?1) > 0
             ORDER BY timestamp DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([query], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// FTS5 reports malformed queries as a generic SQLITE_ERROR. Anything else
/// (I/O, locking, corruption) stays a storage error.
fn classify_fts_error(err: rusqlite::Error) -> DevlogError {
    if let rusqlite::Error::SqliteFailure(e, msg) = &err {
        if e.code == ErrorCode::Unknown {
            return DevlogError::SearchSyntax(msg.clone().unwrap_or_else(|| e.to_string()));
        }
    }
    DevlogError::Sql(err)
}

/// Strategies tried in order until one returns rows.
pub fn default_chain() -> Vec<Box<dyn SearchStrategy>> {
    vec![Box::new(FullText), Box::new(QuotedTerms), Box::new(Substring)]
}

/// 全文搜索，失败或无结果时先按字面词重试，再退回子串匹配
pub fn search(conn: &Connection, query: &str) -> Result<Vec<LogEntry>> {
    search_with(conn, query, &default_chain())
}

pub fn search_with(
    conn: &Connection,
    query: &str,
    chain: &[Box<dyn SearchStrategy>],
) -> Result<Vec<LogEntry>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    for strategy in chain {
        match strategy.search(conn, query) {
            Ok(rows) if !rows.is_empty() => {
                debug!(strategy = strategy.name(), hits = rows.len(), "search answered");
                return Ok(rows);
            }
            Ok(_) => debug!(strategy = strategy.name(), "no hits, trying next strategy"),
            Err(DevlogError::SearchSyntax(msg)) => {
                debug!(strategy = strategy.name(), error = %msg, "query rejected, trying next strategy")
            }
            Err(e) => return Err(e),
        }
    }
    Ok(Vec::new())
}
