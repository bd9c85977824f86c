//! Files the pipeline hands between stages: the course snapshot, the stats CSV, the rounds
//! JSON and the extended course report.

use crate::coerce::{json_to_i64, text_to_i64};
use crate::error::SyncError;
use crate::model::{
    Category, CategoryScore, CourseDifficultyRecord, CourseMetricLabels, DifficultyTier,
    PlayerRounds, PlayerStat, SupportingValue,
};
use crate::sync::load::normalize_stat_fields;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub const COURSE_SNAPSHOT_FILE: &str = "course_difficulty_data.json";
pub const STATS_CSV_FILE: &str = "scoring_stats.csv";
pub const ROUNDS_FILE: &str = "player_rounds_data.json";
pub const METRIC_LABELS_FILE: &str = "course_metric_labels.json";

pub const STAT_CSV_HEADER: [&str; 17] = [
    "dg_id",
    "player_first_name",
    "player_last_name",
    "player_full_name",
    "player_id",
    "title",
    "value",
    "rank",
    "year",
    "category",
    "aboveOrBelow",
    "fieldAverage",
    "statId",
    "supportingStat_description",
    "supportingStat_value",
    "supportingValue_description",
    "supportingValue_value",
];

/// Pretty-printed JSON; parent directories are created as needed.
///
/// # Errors
///
/// I/O and serialisation failures.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), SyncError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), data)?;
    Ok(())
}

/// # Errors
///
/// I/O and parse failures.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SyncError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// `course -> {category: percentile, ..., difficulty: {category: tier}}` in record order.
#[must_use]
pub fn course_snapshot(records: &[CourseDifficultyRecord], categories: &[Category]) -> Value {
    let mut courses = Map::new();
    for record in records {
        let mut entry = Map::new();
        let mut difficulty = Map::new();
        for category in categories {
            let score = record.score(*category);
            entry.insert(
                category.to_string(),
                score.percentile.map_or(Value::Null, Value::from),
            );
            difficulty.insert(
                category.to_string(),
                score.tier.map_or(Value::Null, |t| Value::from(t.as_str())),
            );
        }
        entry.insert("difficulty".into(), Value::Object(difficulty));
        courses.insert(record.course_name.clone(), Value::Object(entry));
    }
    Value::Object(courses)
}

/// # Errors
///
/// I/O and serialisation failures.
pub fn write_course_snapshot(
    path: &Path,
    records: &[CourseDifficultyRecord],
    categories: &[Category],
) -> Result<(), SyncError> {
    write_json(path, &course_snapshot(records, categories))
}

/// Reads a snapshot written by [`write_course_snapshot`], keeping file order.
///
/// # Errors
///
/// I/O, JSON, or a percentile or tier that does not parse.
pub fn read_course_snapshot(path: &Path) -> Result<Vec<CourseDifficultyRecord>, SyncError> {
    let courses: Map<String, Value> = read_json(path)?;
    let mut records = Vec::with_capacity(courses.len());
    for (course_name, entry) in courses {
        let mut record = CourseDifficultyRecord::new(course_name);
        let difficulty = entry.get("difficulty").and_then(Value::as_object);
        for category in Category::ALL {
            let Some(raw) = entry.get(category.as_str()) else {
                continue;
            };
            let field = format!("{}.{category}", record.course_name);
            let percentile = json_to_i64(&field, raw)?
                .map(|p| u32::try_from(p).map_err(|_| SyncError::coercion(&field, &p.to_string())))
                .transpose()?;
            let tier = difficulty
                .and_then(|d| d.get(category.as_str()))
                .and_then(Value::as_str)
                .map(|t| {
                    t.parse::<DifficultyTier>()
                        .map_err(|_| SyncError::coercion(&field, t))
                })
                .transpose()?;
            record
                .scores
                .insert(category, CategoryScore { percentile, tier });
        }
        records.push(record);
    }
    Ok(records)
}

/// One flattened CSV line of a player stat, columns in header order.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct StatCsvRow {
    dg_id: Option<String>,
    player_first_name: Option<String>,
    player_last_name: Option<String>,
    player_full_name: Option<String>,
    player_id: Option<String>,
    title: Option<String>,
    value: Option<String>,
    rank: Option<String>,
    year: Option<String>,
    category: Option<String>,
    #[serde(rename = "aboveOrBelow")]
    above_or_below: Option<String>,
    #[serde(rename = "fieldAverage")]
    field_average: Option<String>,
    #[serde(rename = "statId")]
    stat_id: Option<String>,
    #[serde(rename = "supportingStat_description")]
    supporting_stat_description: Option<String>,
    #[serde(rename = "supportingStat_value")]
    supporting_stat_value: Option<String>,
    #[serde(rename = "supportingValue_description")]
    supporting_value_description: Option<String>,
    #[serde(rename = "supportingValue_value")]
    supporting_value_value: Option<String>,
}

impl From<&PlayerStat> for StatCsvRow {
    fn from(stat: &PlayerStat) -> Self {
        let mut stat = stat.clone();
        normalize_stat_fields(&mut stat);
        Self {
            dg_id: stat.dg_id.map(|v| v.to_string()),
            year: stat.year.map(|v| v.to_string()),
            supporting_stat_description: stat.supporting_stat_description().map(str::to_string),
            supporting_stat_value: stat.supporting_stat_value().map(str::to_string),
            supporting_value_description: stat.supporting_value_description().map(str::to_string),
            supporting_value_value: stat.supporting_value_value().map(str::to_string),
            player_first_name: stat.player_first_name,
            player_last_name: stat.player_last_name,
            player_full_name: stat.player_full_name,
            player_id: stat.player_id,
            title: stat.title,
            value: stat.value,
            rank: stat.rank,
            category: stat.category,
            above_or_below: stat.above_or_below,
            field_average: stat.field_average,
            stat_id: stat.stat_id,
        }
    }
}

fn supporting(description: Option<String>, value: Option<String>) -> Option<SupportingValue> {
    if description.is_none() && value.is_none() {
        None
    } else {
        Some(SupportingValue { description, value })
    }
}

impl StatCsvRow {
    fn into_stat(self) -> Result<PlayerStat, SyncError> {
        let dg_id = match self.dg_id.as_deref() {
            Some(raw) => text_to_i64("dg_id", raw)?,
            None => None,
        };
        let year = match self.year.as_deref() {
            Some(raw) => text_to_i64("year", raw)?,
            None => None,
        };
        Ok(PlayerStat {
            dg_id,
            year,
            player_first_name: self.player_first_name,
            player_last_name: self.player_last_name,
            player_full_name: self.player_full_name,
            player_id: self.player_id,
            title: self.title,
            value: self.value,
            rank: self.rank,
            category: self.category,
            above_or_below: self.above_or_below,
            field_average: self.field_average,
            stat_id: self.stat_id,
            supporting_stat: supporting(self.supporting_stat_description, self.supporting_stat_value),
            supporting_value: supporting(
                self.supporting_value_description,
                self.supporting_value_value,
            ),
            extra: Map::new(),
        })
    }
}

/// Writes the stats CSV. Percent values are cleaned and their titles marked on the way out.
///
/// # Errors
///
/// I/O and CSV failures.
pub fn write_stats_csv(path: &Path, stats: &[PlayerStat]) -> Result<(), SyncError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    if stats.is_empty() {
        writer.write_record(STAT_CSV_HEADER)?;
    }
    for stat in stats {
        writer.serialize(StatCsvRow::from(stat))?;
    }
    writer.flush()?;
    Ok(())
}

/// # Errors
///
/// I/O, CSV, or a non-numeric `dg_id` / `year`.
pub fn read_stats_csv(path: &Path) -> Result<Vec<PlayerStat>, SyncError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut stats = Vec::new();
    for row in reader.deserialize::<StatCsvRow>() {
        stats.push(row?.into_stat()?);
    }
    Ok(stats)
}

/// # Errors
///
/// I/O and serialisation failures.
pub fn write_rounds(path: &Path, rounds: &PlayerRounds) -> Result<(), SyncError> {
    write_json(path, rounds)
}

/// # Errors
///
/// I/O, JSON, or a round field that is not a number where one is expected.
pub fn read_rounds(path: &Path) -> Result<PlayerRounds, SyncError> {
    read_json(path)
}

/// # Errors
///
/// I/O and serialisation failures.
pub fn write_metric_labels(path: &Path, labels: &[CourseMetricLabels]) -> Result<(), SyncError> {
    write_json(path, labels)
}
