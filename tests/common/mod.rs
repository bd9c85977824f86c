#![allow(dead_code)]

use course_sync::args::{Cli, Mode};
use course_sync::config::{RunConfig, load_config};
use course_sync::error::SourceError;
use course_sync::model::{CategorySchema, CourseRow, MetricTable, PlayerStat, RoundRecord};
use course_sync::source::CourseTable;
use course_sync::source::course_table::CourseTableSource;
use course_sync::store::{DeleteFilter, MemoryStore, Row, RowRange, StorageError, TabularStore};
use std::path::Path;

/// Three categories of two metrics each. `hard_course` is ranked first everywhere and
/// `easy_course` last.
pub fn schema() -> CategorySchema {
    CategorySchema::new()
        .with_category("driving", &["driving_dist", "driving_acc"])
        .with_category("approach", &["app_150_200", "app_over_200"])
        .with_category("scoring", &["adj_score", "birdie_rate"])
}

/// Ten courses, `"Course 1"` ranked 1 in every metric through `"Course 10"` ranked 10.
pub fn ranked_table(names: &[&str]) -> MetricTable {
    let metrics = [
        "driving_dist",
        "driving_acc",
        "app_150_200",
        "app_over_200",
        "adj_score",
        "birdie_rate",
    ];
    let rows = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let rank = u32::try_from(i + 1).unwrap();
            metrics.iter().fold(CourseRow::new(*name), |row, metric| {
                row.with_metric(metric, Some(f64::from(rank) * 1.5), Some(rank))
            })
        })
        .collect();
    MetricTable::new(rows)
}

pub fn ten_courses() -> Vec<String> {
    (1..=10).map(|i| format!("Course {i}")).collect()
}

pub fn course_table() -> CourseTable {
    let names = ten_courses();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    CourseTable {
        table: ranked_table(&refs),
        schema: schema(),
    }
}

pub struct FixedCourseTable(pub CourseTable);

impl CourseTableSource for FixedCourseTable {
    fn fetch_course_table(&self) -> Result<CourseTable, SourceError> {
        Ok(self.0.clone())
    }
}

pub fn stat(player: &str, stat_id: &str, title: &str, value: &str) -> PlayerStat {
    PlayerStat {
        player_full_name: Some(player.to_string()),
        stat_id: Some(stat_id.to_string()),
        title: Some(title.to_string()),
        value: Some(value.to_string()),
        rank: Some("12".to_string()),
        year: Some(2025),
        ..PlayerStat::default()
    }
}

pub fn round(player: &str, course: &str, number: u8, score: i64) -> RoundRecord {
    RoundRecord {
        event_name: "The Open".to_string(),
        event_id: Some(100),
        course_name: course.to_string(),
        player_name: player.to_string(),
        dg_id: None,
        round: number,
        date: Some("2025-07-20".to_string()),
        score: Some(score),
        ..RoundRecord::default()
    }
}

/// Settings for a run whose files and backups live under `dir`, with no delay between
/// batches.
pub fn config_in(dir: &Path, mode: Mode) -> RunConfig {
    let cli = Cli {
        mode: Some(mode),
        data_dir: Some(dir.join("data")),
        backup_dir: Some(dir.join("backups")),
        db_path: Some(dir.join("course_sync.db")),
        batch_delay_ms: Some(0),
        stats_year: Some(2025),
        datagolf_key: Some("test-dg".to_string()),
        pga_api_key: Some("test-pga".to_string()),
        ..Cli::default()
    };
    load_config(cli).unwrap()
}

pub fn canary_row(column: &str) -> Row {
    let mut row = Row::new();
    row.insert(column.to_string(), serde_json::json!("DUMMY"));
    row
}

/// Memory store that logs every call and fails on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub ops: Vec<String>,
    /// `select` on this table fails.
    pub fail_select_on: Option<String>,
    /// The n-th (0-based) `insert` into this table fails, and every later one.
    pub fail_insert_on: Option<(String, usize)>,
    inserts_seen: usize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn deletes(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| op.strip_prefix("delete "))
            .collect()
    }
}

impl TabularStore for FlakyStore {
    fn select(&self, table: &str, range: RowRange) -> Result<Vec<Row>, StorageError> {
        if self.fail_select_on.as_deref() == Some(table) {
            return Err(StorageError::new(format!("select on {table} refused")));
        }
        self.inner.select(table, range)
    }

    fn delete(&mut self, table: &str, filter: &DeleteFilter) -> Result<usize, StorageError> {
        self.ops.push(format!("delete {table}"));
        self.inner.delete(table, filter)
    }

    fn insert(&mut self, table: &str, rows: &[Row]) -> Result<usize, StorageError> {
        self.ops.push(format!("insert {table} {}", rows.len()));
        if let Some((failing, from)) = &self.fail_insert_on {
            if failing == table {
                let seen = self.inserts_seen;
                self.inserts_seen += 1;
                if seen >= *from {
                    return Err(StorageError::new(format!("insert into {table} refused")));
                }
            }
        }
        self.inner.insert(table, rows)
    }
}
