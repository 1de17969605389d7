// src/stats.rs

use crate::db;
use crate::error::Result;
use crate::models::{LogEntry, LogFilter};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::collections::HashMap;
use std::hash::Hash;

pub const TOP_N: usize = 5;
pub const HEATMAP_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub total_count: usize,
    /// Most used tags, most frequent first.
    pub top_tags: Vec<(String, usize)>,
    /// Busiest days, most entries first.
    pub top_days: Vec<(NaiveDate, usize)>,
    /// Entries per day for the window ending today, oldest first.
    pub activity_heatmap: Vec<(NaiveDate, usize)>,
}

/// Counts keys while remembering the order they were first seen, so that
/// equal counts rank in encounter order.
struct OrderedCounter<K> {
    index: HashMap<K, usize>,
    counts: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> OrderedCounter<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            counts: Vec::new(),
        }
    }

    fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    fn get(&self, key: &K) -> usize {
        self.index.get(key).map_or(0, |&i| self.counts[i].1)
    }

    fn most_common(&self, n: usize) -> Vec<(K, usize)> {
        let mut sorted = self.counts.clone();
        // sort_by 是稳定排序，同数量时保持首次出现的顺序
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

impl StatsReport {
    /// Aggregates `entries`. Returns `None` when there is nothing to report.
    pub fn from_entries(entries: &[LogEntry], today: NaiveDate) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let mut tags = OrderedCounter::new();
        let mut days = OrderedCounter::new();
        for entry in entries {
            for tag in entry.tag_list() {
                tags.add(tag.to_string());
            }
            if let Some(date) = entry.date() {
                days.add(date);
            }
        }

        let activity_heatmap = (0..HEATMAP_DAYS)
            .rev()
            .map(|offset| {
                let day = today - Duration::days(offset);
                (day, days.get(&day))
            })
            .collect();

        Some(Self {
            total_count: entries.len(),
            top_tags: tags.most_common(TOP_N),
            top_days: days.most_common(TOP_N),
            activity_heatmap,
        })
    }
}

/// 统计所有符合条件的日志
pub fn compute_stats(
    conn: &Connection,
    filter: &LogFilter,
    today: NaiveDate,
) -> Result<Option<StatsReport>> {
    let entries = db::list_all(conn, filter)?;
    Ok(StatsReport::from_entries(&entries, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{seed, temp_store};

    fn entry(id: i64, timestamp: &str, tags: &str) -> LogEntry {
        LogEntry {
            id,
            content: format!("entry {}", id),
            timestamp: timestamp.to_string(),
            tags: tags.to_string(),
            project: String::new(),
            status: "none".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn top_tags_rank_by_frequency() {
        let entries = vec![
            entry(1, "2024-01-01T10:00:00", "a,b"),
            entry(2, "2024-01-01T11:00:00", "a"),
            entry(3, "2024-01-02T10:00:00", "c"),
        ];
        let report = StatsReport::from_entries(&entries, day("2024-01-02")).unwrap();
        assert_eq!(report.total_count, 3);
        assert_eq!(
            report.top_tags,
            vec![("a".to_string(), 2), ("b".to_string(), 1), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn tags_are_trimmed_and_capped() {
        let entries = vec![
            entry(1, "2024-01-01T10:00:00", " x , ,y,z"),
            entry(2, "2024-01-01T10:00:00", "u,v,w,x"),
        ];
        let report = StatsReport::from_entries(&entries, day("2024-01-01")).unwrap();
        assert_eq!(report.top_tags.len(), TOP_N);
        assert_eq!(report.top_tags[0], ("x".to_string(), 2));
        assert_eq!(report.top_tags[1], ("y".to_string(), 1));
    }

    #[test]
    fn top_days_and_heatmap() {
        let entries = vec![
            entry(1, "2024-03-10T08:00:00.000000", ""),
            entry(2, "2024-03-10T18:00:00.000000", ""),
            entry(3, "2024-03-09T12:00:00.000000", ""),
            entry(4, "2024-01-01T12:00:00.000000", ""),
        ];
        let today = day("2024-03-10");
        let report = StatsReport::from_entries(&entries, today).unwrap();

        assert_eq!(report.top_days[0], (day("2024-03-10"), 2));
        assert_eq!(report.top_days[1], (day("2024-03-09"), 1));
        assert_eq!(report.top_days.len(), 3);

        assert_eq!(report.activity_heatmap.len(), 30);
        assert_eq!(report.activity_heatmap[0].0, day("2024-02-10"));
        assert_eq!(report.activity_heatmap[29], (today, 2));
        assert_eq!(report.activity_heatmap[28], (day("2024-03-09"), 1));
        let in_window: usize = report.activity_heatmap.iter().map(|(_, c)| c).sum();
        assert_eq!(in_window, 3);
    }

    #[test]
    fn empty_set_is_no_data() {
        assert!(StatsReport::from_entries(&[], day("2024-01-01")).is_none());
    }

    #[test]
    fn compute_stats_scopes_by_project() {
        let (_dir, conn) = temp_store();
        seed(&conn, "2024-01-01T09:00:00.000000", "one", "a,b", "api", "none");
        seed(&conn, "2024-01-02T09:00:00.000000", "two", "a", "api", "none");
        seed(&conn, "2024-01-03T09:00:00.000000", "three", "c", "web", "none");

        let today = day("2024-01-03");
        let all = compute_stats(&conn, &LogFilter::default(), today).unwrap().unwrap();
        assert_eq!(all.total_count, 3);

        let api = compute_stats(&conn, &LogFilter::for_project(Some("api".into())), today)
            .unwrap()
            .unwrap();
        assert_eq!(api.total_count, 2);
        assert_eq!(api.top_tags[0], ("a".to_string(), 2));

        let none = compute_stats(&conn, &LogFilter::for_project(Some("nope".into())), today).unwrap();
        assert!(none.is_none());
    }
}
