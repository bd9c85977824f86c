mod common;

use course_sync::controller::builder::{CourseDifficultyBuilder, NamePolicy};
use course_sync::export::{read_stats_csv, write_stats_csv};
use course_sync::model::{Category, PlayerRounds, PlayerStat, SupportingValue};
use course_sync::sync::load::{course_rows, normalize_stat_fields, round_rows, stat_rows};
use serde_json::{Value, json};

#[test]
fn test6_percent_value_becomes_number_and_title_is_marked_once() {
    let mut stat = common::stat("Scheffler, Scottie", "103", "Greens in Regulation", "45%");
    normalize_stat_fields(&mut stat);
    normalize_stat_fields(&mut stat);
    assert_eq!(stat.value.as_deref(), Some("45"));
    assert_eq!(stat.title.as_deref(), Some("Greens in Regulation Percentage"));

    let rows = stat_rows(&[stat]).unwrap();
    assert_eq!(rows[0]["value"], json!(45.0));
    assert_eq!(rows[0]["title"], json!("Greens in Regulation Percentage"));
}

#[test]
fn test6_suffix_survives_a_csv_round_trip_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scoring_stats.csv");
    let stat = common::stat("Scheffler, Scottie", "103", "Greens in Regulation", "45%");

    write_stats_csv(&path, &[stat]).unwrap();
    let read_back = read_stats_csv(&path).unwrap();
    let rows = stat_rows(&read_back).unwrap();
    assert_eq!(rows[0]["value"], json!(45.0));
    assert_eq!(rows[0]["title"], json!("Greens in Regulation Percentage"));
}

#[test]
fn test6_missing_markers_become_null_and_separators_are_stripped() {
    let stat = PlayerStat {
        player_full_name: Some("Burns, Sam".into()),
        value: Some("1,234".into()),
        rank: Some("N/A".into()),
        field_average: Some(String::new()),
        supporting_stat: Some(SupportingValue {
            description: Some("Total Putts".into()),
            value: Some("\"2,001\"".into()),
        }),
        ..PlayerStat::default()
    };
    let rows = stat_rows(&[stat]).unwrap();
    let row = &rows[0];
    assert_eq!(row["value"], json!(1234.0));
    assert_eq!(row["rank"], Value::Null);
    assert_eq!(row["field_average"], Value::Null);
    assert_eq!(row["supporting_stat_description"], json!("Total Putts"));
    assert_eq!(row["supporting_stat_value"], json!(2001.0));
    assert_eq!(row["supporting_value_value"], Value::Null);
}

#[test]
fn test6_round_ids_fall_back_to_the_stats() {
    let mut stats = vec![common::stat("Scheffler, Scottie", "120", "Scoring Average", "68.9")];
    stats[0].dg_id = Some(18417);

    let mut rounds = PlayerRounds::default();
    rounds.push(common::round("Scheffler, Scottie", "Course 1", 1, 68));
    let mut own_id = common::round("McIlroy, Rory", "Course 2", 1, 71);
    own_id.dg_id = Some(10091);
    rounds.push(own_id);
    rounds.push(common::round("Unknown, Player", "Course 3", 2, 75));

    let rows = round_rows(&rounds, &stats);
    assert_eq!(rows.len(), 3);
    let id_for = |course: &str| {
        rows.iter()
            .find(|row| row["course"] == json!(course))
            .map(|row| row["dg_id"].clone())
    };
    assert_eq!(id_for("Course 1"), Some(json!(18417)));
    assert_eq!(id_for("Course 2"), Some(json!(10091)));
    assert_eq!(id_for("Course 3"), Some(Value::Null));
    assert!(rows.iter().all(|row| row["round_date"] == json!("2025-07-20")));
}

#[test]
fn test6_course_rows_carry_rank_and_difficulty_per_category() {
    let table = common::course_table();
    let records = CourseDifficultyBuilder::new(&[Category::Driving, Category::Scoring])
        .build(&table.table, &table.schema, NamePolicy::SourceNative)
        .records;
    let rows = course_rows(&records);
    assert_eq!(rows.len(), 10);
    let first = &rows[0];
    assert_eq!(first["course_name"], json!("Course 1"));
    assert_eq!(first["driving_rank"], json!(10));
    assert_eq!(first["driving_difficulty"], json!("hard"));
    assert_eq!(first["approach_rank"], Value::Null);
    assert_eq!(first["approach_difficulty"], Value::Null);
    assert_eq!(rows[9]["scoring_difficulty"], json!("easy"));
}
