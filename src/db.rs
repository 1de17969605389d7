// src/db.rs

use crate::error::{DevlogError, Result};
use crate::models::{EntryUpdate, LogEntry, LogFilter, NewEntry, TIMESTAMP_FORMAT};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Bumped whenever the column set or the search index layout changes.
pub const SCHEMA_VERSION: i64 = 1;

/// One column of the `logs` table.
pub struct Column {
    pub name: &'static str,
    /// Declaration used when the table is created.
    pub create: &'static str,
    /// Declaration used when the column is added to an existing table.
    /// `None` for columns that cannot be added later (the primary key).
    pub add: Option<&'static str>,
    /// Value written over legacy NULLs.
    pub fill: Option<&'static str>,
}

pub const LOG_COLUMNS: &[Column] = &[
    Column {
        name: "id",
        create: "INTEGER PRIMARY KEY AUTOINCREMENT",
        add: None,
        fill: None,
    },
    Column {
        name: "content",
        create: "TEXT NOT NULL",
        add: Some("TEXT NOT NULL DEFAULT ''"),
        fill: Some(""),
    },
    Column {
        name: "timestamp",
        create: "TEXT NOT NULL",
        add: Some("TEXT NOT NULL DEFAULT ''"),
        fill: Some(""),
    },
    Column {
        name: "tags",
        create: "TEXT NOT NULL DEFAULT ''",
        add: Some("TEXT NOT NULL DEFAULT ''"),
        fill: Some(""),
    },
    Column {
        name: "project",
        create: "TEXT NOT NULL DEFAULT ''",
        add: Some("TEXT NOT NULL DEFAULT ''"),
        fill: Some(""),
    },
    Column {
        name: "status",
        create: "TEXT NOT NULL DEFAULT 'none'",
        add: Some("TEXT NOT NULL DEFAULT 'none'"),
        fill: Some("none"),
    },
];

/// Columns covered by the full-text index.
pub const SEARCH_COLUMNS: &[&str] = &["content", "tags", "project", "status"];

const SELECT_COLUMNS: &str = "SELECT logs.id, logs.content, logs.timestamp, logs.tags, logs.project, logs.status FROM logs";

/// 打开数据库并迁移到当前结构
pub fn open_store(path: &Path) -> Result<Connection> {
    let unavailable = |reason: String| DevlogError::StoreUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }
    }

    let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
    let conn = prepare_store(conn, path)?;
    debug!(path = %path.display(), "log store opened");
    Ok(conn)
}

/// Checks that `conn` is a usable database and migrates it. Permission and
/// file-level failures are reported as `StoreUnavailable`.
fn prepare_store(mut conn: Connection, path: &Path) -> Result<Connection> {
    let unavailable = |reason: String| DevlogError::StoreUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    // 读取文件头，确认文件确实是可用的数据库
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(|e| unavailable(e.to_string()))?;

    migrate(&mut conn).map_err(|e| match e {
        DevlogError::Sql(err) if is_access_error(&err) => unavailable(err.to_string()),
        other => other,
    })?;
    Ok(conn)
}

fn is_access_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
        )
    )
}

fn create_table_sql(name: &str) -> String {
    let columns = LOG_COLUMNS
        .iter()
        .map(|c| format!("{} {}", c.name, c.create))
        .collect::<Vec<_>>()
        .join(",\n            ");
    format!("CREATE TABLE IF NOT EXISTS {} (\n            {}\n        )", name, columns)
}

/// Brings the `logs` table and its search index up to `SCHEMA_VERSION`.
/// Missing columns are added and a table without `AUTOINCREMENT` ids is
/// rebuilt; running it on a current store is a no-op.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute(&create_table_sql("logs"), [])?;

    // 旧表没有 AUTOINCREMENT，删除最大 ID 后会被重新分配
    let table_sql: String = tx.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'logs'",
        [],
        |row| row.get(0),
    )?;
    let rebuilt = !table_sql.to_ascii_uppercase().contains("AUTOINCREMENT");
    if rebuilt {
        info!("rebuilding logs table with AUTOINCREMENT ids");
        rebuild_logs_table(&tx)?;
    }

    let existing = table_columns(&tx, "logs")?;
    let mut added = Vec::new();
    for column in LOG_COLUMNS {
        if existing.contains(column.name) {
            continue;
        }
        if let Some(decl) = column.add {
            tx.execute(
                &format!("ALTER TABLE logs ADD COLUMN {} {}", column.name, decl),
                [],
            )?;
            added.push(column.name);
        }
    }

    // 旧版本的数据库中这些列可能为 NULL
    for column in LOG_COLUMNS {
        if let Some(fill) = column.fill {
            tx.execute(
                &format!("UPDATE logs SET {0} = ?1 WHERE {0} IS NULL", column.name),
                [fill],
            )?;
        }
    }

    let version: i64 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if rebuilt
        || !added.is_empty()
        || version < SCHEMA_VERSION
        || !table_exists(&tx, "logs_fts")?
    {
        info!(added = ?added, from_version = version, "rebuilding search index");
        rebuild_search_index(&tx)?;
        tx.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
    }

    tx.commit()?;
    Ok(())
}

/// Recreates `logs` from `LOG_COLUMNS`, copying every row with its id.
/// Columns missing on disk take their defaults; legacy NULLs take `fill`.
fn rebuild_logs_table(conn: &Connection) -> Result<()> {
    let existing = table_columns(conn, "logs")?;
    let mut targets = Vec::new();
    let mut sources = Vec::new();
    for column in LOG_COLUMNS {
        if column.add.is_none() {
            // 主键：没有显式 id 列时用 rowid
            targets.push(column.name.to_string());
            sources.push(if existing.contains(column.name) {
                column.name.to_string()
            } else {
                "rowid".to_string()
            });
        } else if existing.contains(column.name) {
            targets.push(column.name.to_string());
            sources.push(match column.fill {
                Some(fill) => format!("COALESCE({}, '{}')", column.name, fill),
                None => column.name.to_string(),
            });
        }
    }

    conn.execute_batch(&format!(
        "DROP TRIGGER IF EXISTS logs_ai;
         DROP TRIGGER IF EXISTS logs_ad;
         DROP TRIGGER IF EXISTS logs_au;
         DROP TABLE IF EXISTS logs_fts;
         DROP TABLE IF EXISTS logs_rebuilt;
         {create};
         INSERT INTO logs_rebuilt ({targets}) SELECT {sources} FROM logs;
         DROP TABLE logs;
         ALTER TABLE logs_rebuilt RENAME TO logs;",
        create = create_table_sql("logs_rebuilt"),
        targets = targets.join(", "),
        sources = sources.join(", "),
    ))?;
    Ok(())
}

/// Names of the columns currently on disk for `table`.
pub fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(names)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Drops and recreates the FTS5 index and its triggers over `SEARCH_COLUMNS`,
/// then repopulates it from `logs`.
fn rebuild_search_index(conn: &Connection) -> Result<()> {
    let cols = SEARCH_COLUMNS.join(", ");
    let new_cols = SEARCH_COLUMNS
        .iter()
        .map(|c| format!("new.{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    let old_cols = SEARCH_COLUMNS
        .iter()
        .map(|c| format!("old.{}", c))
        .collect::<Vec<_>>()
        .join(", ");

    conn.execute_batch(&format!(
        "DROP TRIGGER IF EXISTS logs_ai;
         DROP TRIGGER IF EXISTS logs_ad;
         DROP TRIGGER IF EXISTS logs_au;
         DROP TABLE IF EXISTS logs_fts;

         CREATE VIRTUAL TABLE logs_fts USING fts5(
             {cols},
             content='logs',
             content_rowid='id'
         );

         CREATE TRIGGER logs_ai AFTER INSERT ON logs BEGIN
             INSERT INTO logs_fts(rowid, {cols}) VALUES (new.id, {new_cols});
         END;

         CREATE TRIGGER logs_ad AFTER DELETE ON logs BEGIN
             INSERT INTO logs_fts(logs_fts, rowid, {cols}) VALUES ('delete', old.id, {old_cols});
         END;

         CREATE TRIGGER logs_au AFTER UPDATE ON logs BEGIN
             INSERT INTO logs_fts(logs_fts, rowid, {cols}) VALUES ('delete', old.id, {old_cols});
             INSERT INTO logs_fts(rowid, {cols}) VALUES (new.id, {new_cols});
         END;

         INSERT INTO logs_fts(logs_fts) VALUES ('rebuild');"
    ))?;
    Ok(())
}

pub(crate) fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        content: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        timestamp: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        tags: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        project: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}

/// 向数据库中插入一条新的日志，返回新 ID
pub fn add_entry(conn: &Connection, entry: &NewEntry) -> Result<i64> {
    let timestamp = chrono::Local::now()
        .naive_local()
        .format(TIMESTAMP_FORMAT)
        .to_string();
    insert_entry_at(conn, entry, &timestamp)
}

/// Inserts `entry` with an explicit creation timestamp.
pub fn insert_entry_at(conn: &Connection, entry: &NewEntry, timestamp: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO logs (content, timestamp, tags, project, status) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![entry.content, timestamp, entry.tags, entry.project, entry.status],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, "log entry inserted");
    Ok(id)
}

/// 根据过滤条件查询日志，最新的在前
pub fn list_entries(conn: &Connection, filter: &LogFilter, limit: i64) -> Result<Vec<LogEntry>> {
    if limit <= 0 {
        return Ok(Vec::new());
    }
    query_entries(conn, filter, Some(limit))
}

/// Every row matching `filter`, newest first.
pub fn list_all(conn: &Connection, filter: &LogFilter) -> Result<Vec<LogEntry>> {
    query_entries(conn, filter, None)
}

fn query_entries(conn: &Connection, filter: &LogFilter, limit: Option<i64>) -> Result<Vec<LogEntry>> {
    let mut query = String::from(SELECT_COLUMNS);
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    // instr() 区分大小写，且不会把 % 和 _ 当作通配符
    if let Some(t) = &filter.tag {
        clauses.push("instr(tags, ?) > 0");
        params.push(Box::new(t.clone()));
    }
    if let Some(g) = &filter.grep {
        clauses.push("instr(content, ?) > 0");
        params.push(Box::new(g.clone()));
    }
    if let Some(p) = &filter.project {
        clauses.push("project = ?");
        params.push(Box::new(p.clone()));
    }
    if let Some(s) = &filter.status {
        clauses.push("status = ?");
        params.push(Box::new(s.clone()));
    }

    if !clauses.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
    }
    query.push_str(" ORDER BY timestamp DESC, id DESC");
    if let Some(n) = limit {
        query.push_str(" LIMIT ?");
        params.push(Box::new(n));
    }

    let mut stmt = conn.prepare(&query)?;
    let logs = stmt
        .query_map(
            rusqlite::params_from_iter(params.iter().map(|b| b.as_ref())),
            row_to_entry,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(logs)
}

/// 根据ID获取单条日志
pub fn get_entry(conn: &Connection, id: i64) -> Result<Option<LogEntry>> {
    let entry = conn
        .query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            [id],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

/// Applies an edit. `id` and `timestamp` are never touched.
pub fn update_entry(conn: &Connection, id: i64, update: &EntryUpdate) -> Result<()> {
    let mut sets: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn ToSql> = Vec::new();

    if let Some(c) = &update.content {
        sets.push("content = ?");
        params.push(c);
    }
    if let Some(t) = &update.tags {
        sets.push("tags = ?");
        params.push(t);
    }
    if let Some(p) = &update.project {
        sets.push("project = ?");
        params.push(p);
    }
    if let Some(s) = &update.status {
        sets.push("status = ?");
        params.push(s);
    }
    if sets.is_empty() {
        return Err(DevlogError::NoChangesMade);
    }

    params.push(&id);
    let query = format!("UPDATE logs SET {} WHERE id = ?", sets.join(", "));
    let count = conn.execute(&query, rusqlite::params_from_iter(params))?;
    if count == 0 {
        return Err(DevlogError::LogNotFound(id));
    }
    debug!(id, "log entry updated");
    Ok(())
}

/// 根据ID列表删除日志
pub fn delete_entries(conn: &Connection, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; ids.len()].join(",");
    let query = format!("DELETE FROM logs WHERE id IN ({})", placeholders);

    let mut stmt = conn.prepare(&query)?;
    let count = stmt.execute(rusqlite::params_from_iter(ids))?;
    debug!(count, "log entries deleted");
    Ok(count)
}

pub fn count_entries(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn temp_store() -> (TempDir, Connection) {
        let dir = TempDir::new().expect("temp dir");
        let conn = open_store(&dir.path().join("devlog.db")).expect("open store");
        (dir, conn)
    }

    pub(crate) fn seed(
        conn: &Connection,
        timestamp: &str,
        content: &str,
        tags: &str,
        project: &str,
        status: &str,
    ) -> i64 {
        let entry = NewEntry::new(content, Some(tags), Some(project), Some(status)).unwrap();
        insert_entry_at(conn, &entry, timestamp).unwrap()
    }

    fn seed_five(conn: &Connection) -> Vec<i64> {
        vec![
            seed(conn, "2024-01-01T09:00:00.000000", "Fix login bug", "bug,auth", "api", "completed"),
            seed(conn, "2024-01-02T09:00:00.000000", "Write docs", "docs", "api", "pending"),
            seed(conn, "2024-01-03T09:00:00.000000", "Refactor auth flow", "auth,refactor", "web", "in-progress"),
            seed(conn, "2024-01-04T09:00:00.000000", "Plan sprint", "", "", "none"),
            seed(conn, "2024-01-05T09:00:00.000000", "Auth bug in web", "bug", "web", "pending"),
        ]
    }

    fn schema_snapshot(conn: &Connection) -> Vec<(String, String)> {
        let mut stmt = conn
            .prepare("SELECT name, sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        rows
    }

    #[test]
    fn migration_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devlog.db");

        let conn = open_store(&path).unwrap();
        seed_five(&conn);
        let schema = schema_snapshot(&conn);
        let rows = list_all(&conn, &LogFilter::default()).unwrap();
        drop(conn);

        for _ in 0..3 {
            let conn = open_store(&path).unwrap();
            assert_eq!(schema_snapshot(&conn), schema);
            assert_eq!(list_all(&conn, &LogFilter::default()).unwrap(), rows);
        }
    }

    #[test]
    fn legacy_store_is_upgraded_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE logs (id INTEGER PRIMARY KEY, content TEXT, timestamp TEXT, tags TEXT);
                 CREATE VIRTUAL TABLE logs_fts USING fts5(content, tags, content='logs');
                 INSERT INTO logs (id, content, timestamp, tags) VALUES (7, 'old note', '2023-05-01T10:00:00', 'legacy');
                 INSERT INTO logs (id, content, timestamp, tags) VALUES (9, 'untagged', '2023-05-02T10:00:00', NULL);",
            )
            .unwrap();
        }

        let conn = open_store(&path).unwrap();
        let columns = table_columns(&conn, "logs").unwrap();
        for column in LOG_COLUMNS {
            assert!(columns.contains(column.name), "missing {}", column.name);
        }

        let old = get_entry(&conn, 7).unwrap().unwrap();
        assert_eq!(old.content, "old note");
        assert_eq!(old.timestamp, "2023-05-01T10:00:00");
        assert_eq!(old.project, "");
        assert_eq!(old.status, "none");
        assert_eq!(get_entry(&conn, 9).unwrap().unwrap().tags, "");

        // the rebuilt index covers the new columns
        update_entry(
            &conn,
            7,
            &EntryUpdate {
                project: Some("archive".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let hits: Vec<i64> = conn
            .prepare("SELECT rowid FROM logs_fts WHERE logs_fts MATCH 'archive'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(hits, vec![7]);

        // the newest id is not handed out again after it is deleted
        let table_sql: String = conn
            .query_row("SELECT sql FROM sqlite_master WHERE name = 'logs'", [], |row| row.get(0))
            .unwrap();
        assert!(table_sql.contains("AUTOINCREMENT"));
        assert_eq!(delete_entries(&conn, &[9]).unwrap(), 1);
        let next = seed(&conn, "2023-05-03T10:00:00.000000", "after upgrade", "", "", "none");
        assert!(next > 9, "id {} was reused", next);
        drop(conn);

        // a second open leaves the rebuilt table alone
        let conn = open_store(&path).unwrap();
        assert_eq!(get_entry(&conn, 7).unwrap().unwrap().project, "archive");
        assert_eq!(count_entries(&conn).unwrap(), 2);
    }

    #[test]
    fn read_only_store_is_store_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devlog.db");
        drop(open_store(&path).unwrap());

        let conn = Connection::open_with_flags(&path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
            .unwrap();
        let err = prepare_store(conn, &path).unwrap_err();
        assert!(matches!(err, DevlogError::StoreUnavailable { .. }));
    }

    #[test]
    fn uncreatable_parent_is_store_unavailable() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = open_store(&blocker.join("devlog.db")).unwrap_err();
        assert!(matches!(err, DevlogError::StoreUnavailable { .. }));
    }

    #[test]
    fn non_database_file_is_store_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![b'z'; 4096]).unwrap();

        let err = open_store(&path).unwrap_err();
        assert!(matches!(err, DevlogError::StoreUnavailable { .. }));
    }

    #[test]
    fn filters_are_combined_with_and() {
        let (_dir, conn) = temp_store();
        seed_five(&conn);

        let count = |f: LogFilter| list_entries(&conn, &f, 100).unwrap().len();
        let f = |tag: Option<&str>, grep: Option<&str>, project: Option<&str>, status: Option<&str>| {
            LogFilter::new(
                tag.map(String::from),
                grep.map(String::from),
                project.map(String::from),
                status.map(String::from),
            )
        };

        assert_eq!(count(f(None, None, None, None)), 5);
        assert_eq!(count(f(Some("bug"), None, None, None)), 2);
        assert_eq!(count(f(Some("auth"), None, None, None)), 2);
        assert_eq!(count(f(None, None, Some("api"), None)), 2);
        assert_eq!(count(f(None, None, None, Some("pending"))), 2);
        assert_eq!(count(f(Some("bug"), None, Some("web"), None)), 1);
        assert_eq!(count(f(None, None, Some("web"), Some("pending"))), 1);
        assert_eq!(count(f(Some("auth"), Some("Refactor"), Some("web"), Some("in-progress"))), 1);
        assert_eq!(count(f(Some("docs"), None, Some("web"), None)), 0);
    }

    #[test]
    fn substring_filters_are_literal_and_case_sensitive() {
        let (_dir, conn) = temp_store();
        seed_five(&conn);
        seed(&conn, "2024-01-06T09:00:00.000000", "100% done_now", "", "", "none");

        let grep = |g: &str| {
            list_entries(&conn, &LogFilter::new(None, Some(g.into()), None, None), 10)
                .unwrap()
                .len()
        };
        assert_eq!(grep("auth"), 1);
        assert_eq!(grep("Auth"), 1);
        assert_eq!(grep("AUTH"), 0);
        assert_eq!(grep("%"), 1);
        assert_eq!(grep("e_n"), 1);
        assert_eq!(grep("F%"), 0);
    }

    #[test]
    fn newest_first_with_id_tiebreak() {
        let (_dir, conn) = temp_store();
        let ids = seed_five(&conn);
        let listed: Vec<i64> = list_entries(&conn, &LogFilter::default(), 5)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(listed, expected);

        let a = seed(&conn, "2024-02-01T00:00:00.000000", "same time a", "", "", "none");
        let b = seed(&conn, "2024-02-01T00:00:00.000000", "same time b", "", "", "none");
        let top: Vec<i64> = list_entries(&conn, &LogFilter::default(), 2)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(top, vec![b, a]);
    }

    #[test]
    fn limit_boundaries() {
        let (_dir, conn) = temp_store();
        seed_five(&conn);
        let all = LogFilter::default();
        assert!(list_entries(&conn, &all, 0).unwrap().is_empty());
        assert!(list_entries(&conn, &all, -3).unwrap().is_empty());
        assert_eq!(list_entries(&conn, &all, 2).unwrap().len(), 2);
        assert_eq!(list_entries(&conn, &all, 50).unwrap().len(), 5);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let (_dir, conn) = temp_store();
        seed_five(&conn);
        let filter = LogFilter::new(Some("nothing-like-this".into()), None, None, None);
        assert!(list_entries(&conn, &filter, 10).unwrap().is_empty());
    }

    #[test]
    fn edit_preserves_identity() {
        let (_dir, conn) = temp_store();
        seed_five(&conn);
        let before = get_entry(&conn, 3).unwrap().unwrap();

        update_entry(
            &conn,
            3,
            &EntryUpdate {
                content: Some("Refactor auth flow (done)".into()),
                status: Some("completed".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let after = get_entry(&conn, 3).unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.content, "Refactor auth flow (done)");
        assert_eq!(after.status, "completed");
        assert_eq!(after.tags, before.tags);
        assert_eq!(after.project, before.project);
    }

    #[test]
    fn edit_of_missing_id_is_not_found() {
        let (_dir, conn) = temp_store();
        let err = update_entry(
            &conn,
            42,
            &EntryUpdate {
                status: Some("pending".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, DevlogError::LogNotFound(42)));
    }

    #[test]
    fn delete_removes_exactly_one_row() {
        let (_dir, conn) = temp_store();
        seed_five(&conn);
        assert_eq!(delete_entries(&conn, &[2]).unwrap(), 1);

        let ids: Vec<i64> = list_all(&conn, &LogFilter::default())
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![5, 4, 3, 1]);
        assert_eq!(count_entries(&conn).unwrap(), 4);
        assert!(get_entry(&conn, 2).unwrap().is_none());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (_dir, conn) = temp_store();
        let ids = seed_five(&conn);
        delete_entries(&conn, &[ids[4]]).unwrap();
        let next = seed(&conn, "2024-01-06T09:00:00.000000", "after delete", "", "", "none");
        assert!(next > ids[4]);
    }

    #[test]
    fn add_entry_stamps_current_time() {
        let (_dir, conn) = temp_store();
        let entry = NewEntry::new("now", None, None, None).unwrap();
        let id = add_entry(&conn, &entry).unwrap();
        let stored = get_entry(&conn, id).unwrap().unwrap();
        assert_eq!(stored.date(), Some(chrono::Local::now().date_naive()));
        assert_eq!(stored.status, "none");
    }
}
