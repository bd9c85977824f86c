mod common;

use common::FlakyStore;
use course_sync::controller::builder::{CourseDifficultyBuilder, NamePolicy};
use course_sync::error::SyncError;
use course_sync::model::{Category, PlayerRounds};
use course_sync::store::{MemoryStore, Row, TabularStore};
use course_sync::sync::{
    COURSE_DIFFICULTY, PLAYER_ROUNDS, SCORING_STATS, SyncPayload, SyncPhase, SyncPipeline,
    SyncSettings,
};
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

fn settings(dir: &Path) -> SyncSettings {
    SyncSettings {
        batch_size: 4,
        backup_page_size: 2,
        batch_delay: Duration::ZERO,
        backup_dir: dir.to_path_buf(),
    }
}

fn payload() -> SyncPayload {
    let table = common::course_table();
    let course_difficulty = CourseDifficultyBuilder::new(&Category::ALL)
        .build(&table.table, &table.schema, NamePolicy::SourceNative)
        .records;
    let mut player_rounds = PlayerRounds::default();
    player_rounds.push(common::round("Scheffler, Scottie", "Course 1", 1, 68));
    player_rounds.push(common::round("Scheffler, Scottie", "Course 1", 2, 70));
    player_rounds.push(common::round("McIlroy, Rory", "Course 2", 1, 71));
    SyncPayload {
        scoring_stats: vec![
            common::stat("Scheffler, Scottie", "103", "Greens in Regulation", "72.5%"),
            common::stat("Scheffler, Scottie", "120", "Scoring Average", "68.9"),
            common::stat("McIlroy, Rory", "02414", "SG: Total", "-0.2"),
        ],
        player_rounds,
        course_difficulty,
    }
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::with_tables(&[SCORING_STATS, PLAYER_ROUNDS, COURSE_DIFFICULTY]);
    store
        .insert(SCORING_STATS, &[common::canary_row("player_full_name")])
        .unwrap();
    store
        .insert(PLAYER_ROUNDS, &[common::canary_row("course")])
        .unwrap();
    let mut stale = Row::new();
    stale.insert("course_name".into(), json!("Course 1"));
    store.insert(COURSE_DIFFICULTY, &[stale]).unwrap();
    store
}

#[test]
fn test5_two_identical_runs_leave_one_record_per_course() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = SyncPipeline::new(seeded_store(), settings(dir.path()));
    let payload = payload();

    let first = pipeline.run(&payload).unwrap();
    assert_eq!(first.inserted_into(COURSE_DIFFICULTY), 10);
    let second = pipeline.run(&payload).unwrap();
    assert_eq!(second.cleared[COURSE_DIFFICULTY], 10);
    assert_eq!(
        second.phases,
        vec![
            SyncPhase::Backup,
            SyncPhase::Clear,
            SyncPhase::Load,
            SyncPhase::BatchInsert,
            SyncPhase::Done
        ]
    );
    assert_eq!(pipeline.history().len(), 10);
    assert_eq!(pipeline.phase(), SyncPhase::Done);

    let store = pipeline.into_store();
    let courses = store.rows(COURSE_DIFFICULTY);
    let names: HashSet<&str> = courses
        .iter()
        .filter_map(|row| row["course_name"].as_str())
        .collect();
    assert_eq!(courses.len(), 10);
    assert_eq!(names.len(), 10);
    assert_eq!(store.count(SCORING_STATS), 3 + 1);
    assert_eq!(store.count(PLAYER_ROUNDS), 3 + 1);
}

#[test]
fn test5_canary_rows_survive_the_clear() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = SyncPipeline::new(seeded_store(), settings(dir.path()));
    let report = pipeline.run(&payload()).unwrap();
    assert_eq!(report.cleared[SCORING_STATS], 0);
    assert_eq!(report.cleared[COURSE_DIFFICULTY], 1);

    let store = pipeline.into_store();
    assert!(
        store
            .rows(SCORING_STATS)
            .iter()
            .any(|row| row["player_full_name"] == json!("DUMMY"))
    );
    assert!(
        store
            .rows(PLAYER_ROUNDS)
            .iter()
            .any(|row| row["course"] == json!("DUMMY"))
    );
}

#[test]
fn test5_backup_failure_never_clears() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FlakyStore::new(seeded_store());
    store.fail_select_on = Some(PLAYER_ROUNDS.to_string());
    let mut pipeline = SyncPipeline::new(store, settings(dir.path()));

    let err = pipeline.run(&payload()).unwrap_err();
    match err {
        SyncError::Backup { collection, .. } => assert_eq!(collection, PLAYER_ROUNDS),
        other => panic!("expected a backup error, got {other}"),
    }
    assert_eq!(pipeline.phase(), SyncPhase::Failed);
    assert_eq!(pipeline.history(), [SyncPhase::Backup, SyncPhase::Failed]);
    assert_eq!(pipeline.report().backups.len(), 1);
    assert!(pipeline.store().deletes().is_empty());
    assert_eq!(pipeline.store().inner.count(COURSE_DIFFICULTY), 1);
}

#[test]
fn test5_batch_failure_leaves_partial_state_and_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FlakyStore::new(seeded_store());
    store.fail_insert_on = Some((COURSE_DIFFICULTY.to_string(), 1));
    let mut pipeline = SyncPipeline::new(store, settings(dir.path()));

    let err = pipeline.run(&payload()).unwrap_err();
    match err {
        SyncError::Batch {
            collection,
            batch,
            inserted,
            ..
        } => {
            assert_eq!(collection, COURSE_DIFFICULTY);
            assert_eq!(batch, 1);
            assert_eq!(inserted, 4);
        }
        other => panic!("expected a batch error, got {other}"),
    }
    assert_eq!(pipeline.phase(), SyncPhase::Failed);
    assert_eq!(
        pipeline.history(),
        [
            SyncPhase::Backup,
            SyncPhase::Clear,
            SyncPhase::Load,
            SyncPhase::BatchInsert,
            SyncPhase::Failed
        ]
    );
    assert_eq!(pipeline.report().inserted_into(SCORING_STATS), 3);
    assert_eq!(pipeline.report().inserted_into(COURSE_DIFFICULTY), 4);

    let inserts: Vec<&String> = pipeline
        .store()
        .ops
        .iter()
        .filter(|op| op.starts_with("insert course_difficulty"))
        .collect();
    assert_eq!(inserts.len(), 2);

    // a rerun against a healthy store recovers the full state
    let mut recovered = pipeline.into_store();
    assert_eq!(recovered.inner.count(COURSE_DIFFICULTY), 4);
    recovered.fail_insert_on = None;
    let mut pipeline = SyncPipeline::new(recovered, settings(dir.path()));
    pipeline.run(&payload()).unwrap();
    assert_eq!(pipeline.store().inner.count(COURSE_DIFFICULTY), 10);
}

#[test]
fn test5_numeric_coercion_failure_is_fatal_before_any_insert() {
    let dir = tempfile::tempdir().unwrap();
    let mut payload = payload();
    payload.scoring_stats[1].value = Some("sixty-eight".into());
    let mut pipeline = SyncPipeline::new(FlakyStore::new(seeded_store()), settings(dir.path()));

    assert!(matches!(
        pipeline.run(&payload),
        Err(SyncError::Coercion { .. })
    ));
    assert_eq!(pipeline.history().last(), Some(&SyncPhase::Failed));
    assert!(
        !pipeline
            .store()
            .ops
            .iter()
            .any(|op| op.starts_with("insert"))
    );
}

#[test]
fn test5_backup_only_writes_snapshots_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = SyncPipeline::new(FlakyStore::new(seeded_store()), settings(dir.path()));

    let snapshots = pipeline.backup_only().unwrap();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(pipeline.history(), [SyncPhase::Backup, SyncPhase::Done]);
    assert!(pipeline.store().ops.is_empty());
    for snapshot in &snapshots {
        assert_eq!(snapshot.rows, 1);
        let name = snapshot.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(&format!("{}_backup_", snapshot.collection)));
        let saved: Vec<Row> =
            serde_json::from_str(&std::fs::read_to_string(&snapshot.path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
    }

    // a full run may follow a backup-only run
    pipeline.run(&payload()).unwrap();
    assert_eq!(pipeline.phase(), SyncPhase::Done);
}

#[test]
fn test5_backup_pages_through_large_collections() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = MemoryStore::new();
    let rows: Vec<Row> = (0..5)
        .map(|i| {
            let mut row = Row::new();
            row.insert("course_name".into(), json!(format!("C{i}")));
            row
        })
        .collect();
    store.insert(COURSE_DIFFICULTY, &rows).unwrap();
    let mut pipeline = SyncPipeline::new(store, settings(dir.path()));
    let snapshots = pipeline.backup_only().unwrap();
    let course = snapshots
        .iter()
        .find(|s| s.collection == COURSE_DIFFICULTY)
        .unwrap();
    assert_eq!(course.rows, 5);
}
