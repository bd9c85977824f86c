mod common;

use course_sync::controller::builder::{CourseDifficultyBuilder, NamePolicy};
use course_sync::controller::catalog::{CollisionPolicy, CourseCatalog, CourseNameNormalizer};
use course_sync::model::{Category, CategorySchema, CourseRow, DifficultyTier, MetricTable};

#[test]
fn test4_one_record_per_row_in_source_order() {
    let table = common::course_table();
    let output = CourseDifficultyBuilder::new(&Category::ALL).build(
        &table.table,
        &table.schema,
        NamePolicy::SourceNative,
    );
    let names: Vec<&str> = output.records.iter().map(|r| r.course_name.as_str()).collect();
    assert_eq!(names, common::ten_courses());
    assert!(output.duplicates.is_empty());
    let first = &output.records[0];
    assert_eq!(first.percentile(Category::Scoring), Some(10));
    assert_eq!(first.tier(Category::Scoring), Some(DifficultyTier::Hard));
}

#[test]
fn test4_duplicate_key_keeps_first_position_and_last_values() {
    let schema = CategorySchema::new().with_category("driving", &["driving_dist"]);
    let table = MetricTable::new(vec![
        CourseRow::new("Riviera").with_metric("driving_dist", Some(290.0), Some(1)),
        CourseRow::new("Harbour Town").with_metric("driving_dist", Some(280.0), Some(2)),
        CourseRow::new("Riviera").with_metric("driving_dist", Some(300.0), Some(4)),
        CourseRow::new("Kapalua").with_metric("driving_dist", Some(310.0), Some(3)),
    ]);
    let output = CourseDifficultyBuilder::new(&[Category::Driving]).build(
        &table,
        &schema,
        NamePolicy::SourceNative,
    );
    let names: Vec<&str> = output.records.iter().map(|r| r.course_name.as_str()).collect();
    assert_eq!(names, ["Riviera", "Harbour Town", "Kapalua"]);
    assert_eq!(output.records[0].percentile(Category::Driving), Some(100));
    assert_eq!(output.duplicates, vec!["Riviera".to_string()]);
}

#[test]
fn test4_canonical_policy_merges_spellings() {
    let schema = CategorySchema::new().with_category("scoring", &["adj_score"]);
    let table = MetricTable::new(vec![
        CourseRow::new("Augusta National Golf Club").with_metric("adj_score", None, Some(1)),
        CourseRow::new("Mystery Links").with_metric("adj_score", None, Some(2)),
        CourseRow::new("Augusta National GC").with_metric("adj_score", None, Some(3)),
    ]);
    let catalog = CourseCatalog::default_pga(CollisionPolicy::LastWins).unwrap();
    let mut normalizer = CourseNameNormalizer::new(catalog);
    let builder = CourseDifficultyBuilder::new(&[Category::Scoring]);

    let canonical = builder.build(&table, &schema, NamePolicy::Canonical(&mut normalizer));
    let names: Vec<&str> = canonical.records.iter().map(|r| r.course_name.as_str()).collect();
    assert_eq!(names, ["Augusta National Golf Club", "Mystery Links"]);
    assert_eq!(canonical.records[0].percentile(Category::Scoring), Some(100));
    assert_eq!(normalizer.report().matched, 2);
    assert_eq!(normalizer.report().unmatched_names, vec!["Mystery Links".to_string()]);

    let native = builder.build(&table, &schema, NamePolicy::SourceNative);
    assert_eq!(native.records.len(), 3);
}

#[test]
fn test4_missing_category_scores_null() {
    let table = common::course_table();
    let schema = CategorySchema::new().with_category("driving", &["driving_dist", "driving_acc"]);
    let output = CourseDifficultyBuilder::new(&Category::ALL).build(
        &table.table,
        &schema,
        NamePolicy::SourceNative,
    );
    assert_eq!(
        output.aggregation.skipped_categories,
        vec![Category::Scoring, Category::Approach]
    );
    for record in &output.records {
        assert_eq!(record.percentile(Category::Approach), None);
        assert_eq!(record.tier(Category::Approach), None);
        assert!(record.percentile(Category::Driving).is_some());
    }
}

#[test]
fn test4_metric_labels_use_rank_cutoffs() {
    let table = common::course_table();
    let labels = CourseDifficultyBuilder::new(&[Category::Driving])
        .with_rank_band(2)
        .metric_labels(&table.table, &table.schema);
    assert_eq!(labels.len(), 10);
    assert_eq!(labels[0].metrics.len(), 2);
    let tier = |i: usize| labels[i].metrics["driving_dist"].difficulty;
    assert_eq!(tier(1), Some(DifficultyTier::Hard));
    assert_eq!(tier(2), Some(DifficultyTier::Medium));
    assert_eq!(tier(8), Some(DifficultyTier::Easy));
    assert_eq!(labels[0].metrics["driving_acc"].value, Some(1.5));
}
