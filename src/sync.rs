//! Full-refresh synchronisation of the derived tables into a [`TabularStore`].
//!
//! A run walks `BACKUP -> CLEAR -> LOAD -> BATCH_INSERT -> DONE`; any phase can end in
//! `FAILED`. Nothing is deleted until every collection has a snapshot on disk, and a
//! failed batch leaves the rows of earlier batches in place.

pub mod backup;
pub mod batch;
pub mod load;
pub mod report;

use crate::error::SyncError;
use crate::model::{CourseDifficultyRecord, PlayerRounds, PlayerStat};
use crate::store::{DeleteFilter, Row, TabularStore};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

pub use backup::BackupSnapshot;
pub use report::SyncReport;

pub const SCORING_STATS: &str = "scoring_stats";
pub const PLAYER_ROUNDS: &str = "player_rounds";
pub const COURSE_DIFFICULTY: &str = "course_difficulty";

/// Placeholder value of the row a collection keeps through every clear.
pub const CANARY_VALUE: &str = "DUMMY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPhase {
    Ready,
    Backup,
    Clear,
    Load,
    BatchInsert,
    Done,
    Failed,
}

impl SyncPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Backup => "BACKUP",
            Self::Clear => "CLEAR",
            Self::Load => "LOAD",
            Self::BatchInsert => "BATCH_INSERT",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }

    /// `Backup -> Done` is the backup-only run.
    fn may_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Ready | Self::Done | Self::Failed, Self::Backup)
                | (Self::Backup, Self::Clear | Self::Done)
                | (Self::Clear, Self::Load)
                | (Self::Load, Self::BatchInsert)
                | (Self::BatchInsert, Self::Done)
        ) || (next == Self::Failed && !matches!(self, Self::Done | Self::Failed))
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection the pipeline owns, and the row it must never delete.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub canary: Option<(String, Value)>,
}

impl CollectionSpec {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            canary: None,
        }
    }

    #[must_use]
    pub fn with_canary(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.canary = Some((column.to_string(), value.into()));
        self
    }

    /// `scoring_stats` and `player_rounds` keep their `DUMMY` row; `course_difficulty` has none.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(SCORING_STATS).with_canary("player_full_name", CANARY_VALUE),
            Self::new(PLAYER_ROUNDS).with_canary("course", CANARY_VALUE),
            Self::new(COURSE_DIFFICULTY),
        ]
    }

    #[must_use]
    pub fn delete_filter(&self) -> DeleteFilter {
        match &self.canary {
            Some((column, value)) => DeleteFilter::AllExcept {
                column: column.clone(),
                value: value.clone(),
            },
            None => DeleteFilter::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub batch_size: usize,
    pub backup_page_size: usize,
    pub batch_delay: Duration,
    pub backup_dir: PathBuf,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: 250,
            backup_page_size: 10_000,
            batch_delay: Duration::from_millis(100),
            backup_dir: PathBuf::from("backups"),
        }
    }
}

/// Everything one run writes.
#[derive(Debug, Clone, Default)]
pub struct SyncPayload {
    pub scoring_stats: Vec<PlayerStat>,
    pub player_rounds: PlayerRounds,
    pub course_difficulty: Vec<CourseDifficultyRecord>,
}

pub struct SyncPipeline<S: TabularStore> {
    store: S,
    settings: SyncSettings,
    collections: Vec<CollectionSpec>,
    phase: SyncPhase,
    history: Vec<SyncPhase>,
    report: SyncReport,
}

impl<S: TabularStore> SyncPipeline<S> {
    pub fn new(store: S, settings: SyncSettings) -> Self {
        Self {
            store,
            settings,
            collections: CollectionSpec::defaults(),
            phase: SyncPhase::Ready,
            history: Vec::new(),
            report: SyncReport::default(),
        }
    }

    #[must_use]
    pub fn with_collections(mut self, collections: Vec<CollectionSpec>) -> Self {
        self.collections = collections;
        self
    }

    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Every phase entered, across all runs of this pipeline.
    #[must_use]
    pub fn history(&self) -> &[SyncPhase] {
        &self.history
    }

    /// Counts from the latest run, including a failed one.
    #[must_use]
    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn advance(&mut self, next: SyncPhase, action: &'static str) -> Result<(), SyncError> {
        if !self.phase.may_advance_to(next) {
            return Err(SyncError::InvalidState {
                phase: self.phase,
                action,
            });
        }
        info!("sync phase {} -> {}", self.phase, next);
        self.phase = next;
        self.history.push(next);
        Ok(())
    }

    fn fail(&mut self, err: SyncError) -> SyncError {
        error!("sync failed in {}: {err}", self.phase);
        if self.phase.may_advance_to(SyncPhase::Failed) {
            self.phase = SyncPhase::Failed;
            self.history.push(SyncPhase::Failed);
        }
        err
    }

    /// Runs every phase against `payload`.
    ///
    /// # Errors
    ///
    /// Any phase error; the pipeline is left in `FAILED` and [`Self::report`] shows how far
    /// it got.
    pub fn run(&mut self, payload: &SyncPayload) -> Result<SyncReport, SyncError> {
        self.report = SyncReport::default();
        let start = self.history.len();
        let result = self.run_phases(payload).map_err(|err| self.fail(err));
        self.report.phases = self.history[start..].to_vec();
        result.map(|()| self.report.clone())
    }

    /// Snapshots every collection and stops.
    ///
    /// # Errors
    ///
    /// `SyncError::Backup` for the first collection that could not be saved.
    pub fn backup_only(&mut self) -> Result<Vec<BackupSnapshot>, SyncError> {
        self.report = SyncReport::default();
        match self.backup_phases() {
            Ok(()) => Ok(self.report.backups.clone()),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn backup_phases(&mut self) -> Result<(), SyncError> {
        self.advance(SyncPhase::Backup, "start a backup")?;
        self.backup_phase()?;
        self.advance(SyncPhase::Done, "finish a backup")
    }

    fn run_phases(&mut self, payload: &SyncPayload) -> Result<(), SyncError> {
        self.advance(SyncPhase::Backup, "start a run")?;
        self.backup_phase()?;

        self.advance(SyncPhase::Clear, "clear")?;
        for spec in &self.collections {
            let removed = self
                .store
                .delete(&spec.name, &spec.delete_filter())
                .map_err(|source| SyncError::Clear {
                    collection: spec.name.clone(),
                    source,
                })?;
            info!("cleared {removed} {} rows", spec.name);
            self.report.cleared.insert(spec.name.clone(), removed);
        }

        self.advance(SyncPhase::Load, "load")?;
        let loaded = self.load_phase(payload)?;

        self.advance(SyncPhase::BatchInsert, "insert")?;
        for (collection, rows) in &loaded {
            let result = batch::insert_in_batches(
                &mut self.store,
                collection,
                rows,
                self.settings.batch_size,
                self.settings.batch_delay,
            );
            match result {
                Ok(inserted) => {
                    self.report.inserted.insert(collection.clone(), inserted);
                }
                Err(err) => {
                    if let SyncError::Batch { inserted, .. } = &err {
                        self.report.inserted.insert(collection.clone(), *inserted);
                    }
                    return Err(err);
                }
            }
        }

        self.advance(SyncPhase::Done, "finish")
    }

    fn backup_phase(&mut self) -> Result<(), SyncError> {
        let stamp = backup::timestamp();
        for spec in &self.collections {
            let snapshot = backup::backup_collection(
                &self.store,
                &spec.name,
                self.settings.backup_page_size,
                &self.settings.backup_dir,
                &stamp,
            )?;
            self.report.backups.push(snapshot);
        }
        Ok(())
    }

    /// Rows for each owned collection, in collection order. Collections without a loader
    /// get no rows.
    fn load_phase(&self, payload: &SyncPayload) -> Result<Vec<(String, Vec<Row>)>, SyncError> {
        let mut loaded = Vec::with_capacity(self.collections.len());
        for spec in &self.collections {
            let rows = match spec.name.as_str() {
                SCORING_STATS => load::stat_rows(&payload.scoring_stats)?,
                PLAYER_ROUNDS => load::round_rows(&payload.player_rounds, &payload.scoring_stats),
                COURSE_DIFFICULTY => load::course_rows(&payload.course_difficulty),
                _ => Vec::new(),
            };
            info!("loaded {} {} rows", rows.len(), spec.name);
            loaded.push((spec.name.clone(), rows));
        }
        Ok(loaded)
    }
}
