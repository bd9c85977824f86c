//! Record to store-row conversion.

use crate::coerce::{is_missing, strip_numeric_noise, text_to_f64, text_to_i64};
use crate::error::SyncError;
use crate::model::{Category, CourseDifficultyRecord, PlayerRounds, PlayerStat};
use crate::store::Row;
use ahash::RandomState;
use serde_json::Value;
use std::collections::HashMap;

pub const PERCENTAGE_SUFFIX: &str = " Percentage";

/// Strips the percent decoration from a stat's value and marks its title once.
///
/// Safe to call any number of times: a cleaned value no longer contains `%`, and the
/// suffix is only added to a title that lacks it.
pub fn normalize_stat_fields(stat: &mut PlayerStat) {
    let Some(value) = stat.value.as_deref() else {
        return;
    };
    if !value.contains('%') {
        return;
    }
    stat.value = Some(strip_numeric_noise(value));
    if let Some(title) = stat.title.as_mut() {
        if !title.contains(PERCENTAGE_SUFFIX.trim_start()) {
            title.push_str(PERCENTAGE_SUFFIX);
        }
    }
}

fn text(value: Option<&str>) -> Value {
    match value {
        Some(v) if !is_missing(v) => Value::String(v.to_string()),
        _ => Value::Null,
    }
}

fn real(field: &str, value: Option<&str>) -> Result<Value, SyncError> {
    Ok(match value {
        Some(raw) => text_to_f64(field, raw)?.map_or(Value::Null, Value::from),
        None => Value::Null,
    })
}

fn integer(field: &str, value: Option<&str>) -> Result<Value, SyncError> {
    Ok(match value {
        Some(raw) => text_to_i64(field, raw)?.map_or(Value::Null, Value::from),
        None => Value::Null,
    })
}

fn opt<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}

/// # Errors
///
/// `SyncError::Coercion` for the first numeric field holding something that is not a number.
pub fn stat_rows(stats: &[PlayerStat]) -> Result<Vec<Row>, SyncError> {
    stats
        .iter()
        .map(|stat| {
            let mut stat = stat.clone();
            normalize_stat_fields(&mut stat);
            let mut row = Row::new();
            row.insert("dg_id".into(), opt(stat.dg_id));
            row.insert("player_full_name".into(), text(stat.player_full_name.as_deref()));
            row.insert("stat_id".into(), text(stat.stat_id.as_deref()));
            row.insert("title".into(), text(stat.title.as_deref()));
            row.insert("value".into(), real("value", stat.value.as_deref())?);
            row.insert("rank".into(), integer("rank", stat.rank.as_deref())?);
            row.insert("category".into(), text(stat.category.as_deref()));
            row.insert(
                "field_average".into(),
                real("fieldAverage", stat.field_average.as_deref())?,
            );
            row.insert("year".into(), opt(stat.year));
            row.insert("above_or_below".into(), text(stat.above_or_below.as_deref()));
            row.insert(
                "supporting_stat_description".into(),
                text(stat.supporting_stat_description()),
            );
            row.insert(
                "supporting_stat_value".into(),
                real("supportingStat_value", stat.supporting_stat_value())?,
            );
            row.insert(
                "supporting_value_description".into(),
                text(stat.supporting_value_description()),
            );
            row.insert(
                "supporting_value_value".into(),
                real("supportingValue_value", stat.supporting_value_value())?,
            );
            Ok(row)
        })
        .collect()
}

/// One row per round. A round without its own id borrows the one its player carries in
/// the scoring stats.
#[must_use]
pub fn round_rows(rounds: &PlayerRounds, stats: &[PlayerStat]) -> Vec<Row> {
    let mut ids: HashMap<String, i64, RandomState> = HashMap::with_hasher(RandomState::new());
    for stat in stats {
        if let (Some(name), Some(id)) = (stat.player_full_name.as_deref(), stat.dg_id) {
            ids.entry(name.to_lowercase()).or_insert(id);
        }
    }

    let mut rows = Vec::with_capacity(rounds.round_count());
    for (player, courses) in &rounds.players {
        let fallback = ids.get(&player.to_lowercase()).copied();
        for (course, course_rounds) in courses {
            for round in &course_rounds.rounds {
                let s = &round.stats;
                let mut row = Row::new();
                row.insert("dg_id".into(), opt(round.dg_id.or(fallback)));
                row.insert("course".into(), Value::String(course.clone()));
                row.insert("sg_total".into(), opt(s.sg_total));
                row.insert("sg_ott".into(), opt(s.sg_ott));
                row.insert("sg_app".into(), opt(s.sg_app));
                row.insert("sg_arg".into(), opt(s.sg_arg));
                row.insert("sg_putt".into(), opt(s.sg_putt));
                row.insert("gir".into(), opt(s.gir));
                row.insert("driving_acc".into(), opt(s.driving_acc));
                row.insert("driving_dist".into(), opt(s.driving_dist));
                row.insert("round_date".into(), text(round.date.as_deref()));
                rows.push(row);
            }
        }
    }
    rows
}

/// The store keeps category composites in `<category>_rank` columns.
#[must_use]
pub fn course_rows(records: &[CourseDifficultyRecord]) -> Vec<Row> {
    records
        .iter()
        .map(|record| {
            let mut row = Row::new();
            row.insert("course_name".into(), Value::String(record.course_name.clone()));
            for category in Category::ALL {
                row.insert(
                    format!("{category}_rank"),
                    opt(record.percentile(category)),
                );
            }
            for category in Category::ALL {
                row.insert(
                    format!("{category}_difficulty"),
                    opt(record.tier(category).map(|t| t.as_str())),
                );
            }
            row
        })
        .collect()
}
