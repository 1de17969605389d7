// src/commands.rs

use crate::config::Config;
use crate::db;
use crate::error::{DevlogError, Result};
use crate::export::{self, ExportFormat};
use crate::models::{EntryUpdate, LogEntry, LogFilter, NewEntry, RECOMMENDED_STATUSES};
use crate::search;
use crate::stats::{self, StatsReport};
use crate::sync::{self, SyncOutcome};
use owo_colors::OwoColorize;
use std::collections::BTreeSet;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::Command;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 处理 'init' 命令
pub fn handle_init(cfg: &Config) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let count = db::count_entries(&conn)?;
    println!(
        "{} Log store ready at: {} ({} entries, schema v{})",
        "✓".green(),
        cfg.db_path.display(),
        count,
        db::SCHEMA_VERSION
    );
    Ok(())
}

/// 处理 'add' 命令
pub fn handle_add(
    cfg: &Config,
    content: Option<String>,
    tags: Option<String>,
    project: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let content = match content {
        Some(c) => c,
        None => edit_in_editor(cfg, "")?,
    };

    if content.trim().is_empty() {
        eprintln!("Empty log, skipped.");
        return Ok(());
    }

    let entry = NewEntry::new(&content, tags.as_deref(), project.as_deref(), status.as_deref())?;
    let conn = db::open_store(&cfg.db_path)?;
    let id = db::add_entry(&conn, &entry)?;

    let tags_display = if entry.tags.is_empty() {
        String::new()
    } else {
        format!(" (Tags: {})", entry.tags)
    };
    println!("{} Log #{} saved!{}", "✓".green().bold(), id, tags_display);
    if !RECOMMENDED_STATUSES.contains(&entry.status.as_str()) {
        println!(
            "{}",
            format!("Using custom status '{}'.", entry.status).dimmed()
        );
    }
    Ok(())
}

/// 处理 'list' 命令
pub fn handle_list(cfg: &Config, limit: i64, filter: LogFilter) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let logs = db::list_entries(&conn, &filter, limit)?;

    if logs.is_empty() {
        println!("No logs found.");
        return Ok(());
    }

    println!("{}", format!("Dev Logs (Last {})", logs.len()).bold());
    print_table(&logs);
    Ok(())
}

/// 处理 'view' 命令
pub fn handle_view(cfg: &Config, id: i64) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let entry = db::get_entry(&conn, id)?.ok_or(DevlogError::LogNotFound(id))?;
    print_entry(&entry);
    Ok(())
}

/// 处理 'edit' 命令
pub fn handle_edit(cfg: &Config, id: i64, update: EntryUpdate) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let current = db::get_entry(&conn, id)?.ok_or(DevlogError::LogNotFound(id))?;

    let update = if update.is_empty() {
        // 没有给出任何选项时，用编辑器修改内容
        let new_content = edit_in_editor(cfg, &current.content)?;
        if new_content.trim() == current.content.trim() {
            return Err(DevlogError::NoChangesMade);
        }
        EntryUpdate {
            content: Some(new_content),
            ..Default::default()
        }
    } else {
        update
    };

    db::update_entry(&conn, id, &update.validated()?)?;
    println!("{} Log #{} updated.", "✓".green(), id);
    Ok(())
}

/// 解析ID范围字符串 (例如 "1,3,5-7")
/// Upper bound on how many IDs one delete request may expand to.
const MAX_DELETE_IDS: i64 = 10_000;

fn parse_id_range(s: &str) -> Result<Vec<i64>> {
    let mut ids = BTreeSet::new(); // 使用 BTreeSet 自动排序和去重
    for part in s.split(',') {
        let part = part.trim();
        if part.contains('-') {
            let mut range_parts = part.splitn(2, '-');
            let start_str = range_parts.next().unwrap_or("").trim();
            let end_str = range_parts.next().unwrap_or("").trim();

            if start_str.is_empty() || end_str.is_empty() {
                return Err(DevlogError::InvalidInput(format!("Invalid range: {}", part)));
            }
            let start: i64 = start_str
                .parse()
                .map_err(|_| DevlogError::InvalidInput(format!("Invalid ID: {}", start_str)))?;
            let end: i64 = end_str
                .parse()
                .map_err(|_| DevlogError::InvalidInput(format!("Invalid ID: {}", end_str)))?;

            if start > end {
                return Err(DevlogError::InvalidInput(format!(
                    "Start of range {} cannot be greater than end {}",
                    start, end
                )));
            }
            if end.saturating_sub(start) >= MAX_DELETE_IDS {
                return Err(DevlogError::InvalidInput(format!(
                    "Range {} covers more than {} IDs",
                    part, MAX_DELETE_IDS
                )));
            }
            ids.extend(start..=end);
            if ids.len() as i64 > MAX_DELETE_IDS {
                return Err(DevlogError::InvalidInput(format!(
                    "More than {} IDs requested",
                    MAX_DELETE_IDS
                )));
            }
        } else if !part.is_empty() {
            let id: i64 = part
                .parse()
                .map_err(|_| DevlogError::InvalidInput(format!("Invalid ID: {}", part)))?;
            ids.insert(id);
        }
    }
    Ok(ids.into_iter().collect())
}

/// 处理 'delete' 命令
pub fn handle_delete(cfg: &Config, ids_str: &str, yes: bool) -> Result<()> {
    let requested = parse_id_range(ids_str)?;
    if requested.is_empty() {
        println!("No valid log IDs to delete.");
        return Ok(());
    }

    let conn = db::open_store(&cfg.db_path)?;
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for id in requested {
        match db::get_entry(&conn, id)? {
            Some(entry) => found.push(entry),
            None => missing.push(id),
        }
    }

    if found.is_empty() {
        if let [only] = missing.as_slice() {
            return Err(DevlogError::LogNotFound(*only));
        }
        println!("None of the given log IDs exist: {:?}", missing);
        return Ok(());
    }
    if !missing.is_empty() {
        println!("Skipping unknown log IDs: {:?}", missing);
    }

    println!("You are about to permanently delete:");
    for entry in &found {
        println!(
            "- #{} {} {}",
            entry.id,
            entry.display_time(TIME_FORMAT).cyan(),
            truncate(entry.preview(), 60)
        );
    }

    if !yes && !confirm("Confirm deletion? (y/N): ")? {
        println!("Cancelled.");
        return Ok(());
    }

    let ids: Vec<i64> = found.iter().map(|e| e.id).collect();
    let count = db::delete_entries(&conn, &ids)?;
    println!("{} Successfully deleted {} log(s).", "✓".green(), count);
    Ok(())
}

/// 处理 'search' 命令
pub fn handle_search(cfg: &Config, query: &str) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let results = search::search(&conn, query)?;

    if results.is_empty() {
        println!("{}", "No matches found.".red());
        return Ok(());
    }

    println!("{}", format!("Found {} matches:", results.len()).bold());
    for entry in &results {
        let mut header = format!("{}", entry.display_time(TIME_FORMAT).cyan());
        if !entry.tags.is_empty() {
            header.push_str(&format!(" | {}", entry.tags.yellow()));
        }
        if !entry.project.is_empty() {
            header.push_str(&format!(" | {}", entry.project.blue()));
        }
        println!("[{}] {}", entry.id, header);
        println!("{}", entry.content.trim_end());
        println!("{}", "─".repeat(40).dimmed());
    }
    Ok(())
}

/// 处理 'stats' 命令
pub fn handle_stats(cfg: &Config, project: Option<String>) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let filter = LogFilter::for_project(project);
    let today = chrono::Local::now().date_naive();

    match stats::compute_stats(&conn, &filter, today)? {
        Some(report) => print_stats(&report, filter.project.as_deref()),
        None => println!("No logs found."),
    }
    Ok(())
}

/// 处理 'export' 命令
pub fn handle_export(cfg: &Config, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    let conn = db::open_store(&cfg.db_path)?;
    let entries = db::list_all(&conn, &LogFilter::default())?;
    let document = export::render(&entries, format)?;

    let path = output.unwrap_or_else(|| PathBuf::from(format.default_file_name()));
    export::write_export(&path, &document)?;
    println!(
        "{} Exported {} entries to {}",
        "✓".green(),
        entries.len(),
        path.display()
    );
    Ok(())
}

/// 处理 'sync' 命令
pub fn handle_sync(cfg: &Config, destination: &str) -> Result<()> {
    // 先打开一次，确保文件存在且结构是最新的
    drop(db::open_store(&cfg.db_path)?);

    match sync::sync_store(&cfg.db_path, destination, &cfg.backup_dir)? {
        SyncOutcome::Copied(path) => {
            println!("{} Log store copied to {}", "✓".green(), path.display())
        }
        SyncOutcome::Pushed { remote, committed } => {
            if committed {
                println!("{} Backup committed and pushed to {}", "✓".green(), remote);
            } else {
                println!("{} Nothing new to commit; pushed to {}", "✓".green(), remote);
            }
        }
    }
    Ok(())
}

fn edit_in_editor(cfg: &Config, initial: &str) -> Result<String> {
    let mut temp_file = tempfile::NamedTempFile::new()?;
    temp_file.write_all(initial.as_bytes())?;
    temp_file.flush()?;

    let status = Command::new(&cfg.editor).arg(temp_file.path()).status()?;
    if !status.success() {
        return Err(DevlogError::EditorError);
    }

    let mut buf = String::new();
    temp_file.reopen()?.read_to_string(&mut buf)?;
    Ok(buf)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Colors a status label; `width` of 0 leaves it unpadded.
fn paint_status(status: &str, width: usize) -> String {
    let cell = if width == 0 {
        status.to_string()
    } else {
        format!("{:<width$}", truncate(status, width), width = width)
    };
    match status {
        "completed" => cell.green().to_string(),
        "in-progress" => cell.yellow().to_string(),
        "pending" => cell.magenta().to_string(),
        "none" | "" => cell.dimmed().to_string(),
        _ => cell.blue().to_string(),
    }
}

fn print_table(logs: &[LogEntry]) {
    println!(
        "{}",
        format!(
            "{:>5}  {:<16}  {:<12}  {:<12}  {:<16}  {}",
            "ID", "Time", "Project", "Status", "Tags", "Content"
        )
        .bold()
    );
    for log in logs {
        println!(
            "{:>5}  {}  {:<12}  {}  {}  {}",
            log.id,
            format!("{:<16}", log.display_time(TIME_FORMAT)).cyan(),
            truncate(&log.project, 12),
            paint_status(&log.status, 12),
            format!("{:<16}", truncate(&log.tags, 16)).yellow(),
            truncate(log.preview(), 60)
        );
    }
}

fn print_entry(entry: &LogEntry) {
    println!(
        "{} {}",
        format!("Log #{}", entry.id).bold(),
        entry.display_time("%Y-%m-%d %H:%M:%S").cyan()
    );
    if !entry.project.is_empty() {
        println!("Project: {}", entry.project.blue());
    }
    println!("Status:  {}", paint_status(&entry.status, 0));
    if !entry.tags.is_empty() {
        println!("Tags:    {}", entry.tags.yellow());
    }
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", entry.content.trim_end());
}

/// Display buckets for the activity heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeatLevel {
    Empty,
    Low,
    Medium,
    High,
}

impl HeatLevel {
    fn from_count(count: usize) -> Self {
        match count {
            0 => HeatLevel::Empty,
            1..=2 => HeatLevel::Low,
            3..=5 => HeatLevel::Medium,
            _ => HeatLevel::High,
        }
    }

    fn cell(self) -> String {
        match self {
            HeatLevel::Empty => "·".dimmed().to_string(),
            HeatLevel::Low => "░".green().to_string(),
            HeatLevel::Medium => "▒".green().to_string(),
            HeatLevel::High => "█".green().to_string(),
        }
    }
}

fn print_stats(report: &StatsReport, project: Option<&str>) {
    match project {
        Some(p) => println!("{} {}", "Stats for project".bold(), p.blue()),
        None => println!("{}", "Stats".bold()),
    }
    println!("Total entries: {}", report.total_count.bold());

    println!("\n{}", "Top tags".bold());
    if report.top_tags.is_empty() {
        println!("  (no tags)");
    }
    for (tag, count) in &report.top_tags {
        println!("  {:<20} {}", tag.yellow(), count);
    }

    println!("\n{}", "Most active days".bold());
    for (day, count) in &report.top_days {
        println!("  {}  {}", day.format("%Y-%m-%d").cyan(), count);
    }

    if let (Some((first, _)), Some((last, _))) =
        (report.activity_heatmap.first(), report.activity_heatmap.last())
    {
        println!(
            "\n{} ({} → {})",
            "Activity".bold(),
            first.format("%m-%d"),
            last.format("%m-%d")
        );
        let cells: String = report
            .activity_heatmap
            .iter()
            .map(|(_, count)| HeatLevel::from_count(*count).cell())
            .collect();
        println!("  {}", cells);
        println!(
            "  {} none  {} 1-2  {} 3-5  {} 6+",
            HeatLevel::Empty.cell(),
            HeatLevel::Low.cell(),
            HeatLevel::Medium.cell(),
            HeatLevel::High.cell()
        );
    }
}
