//! One function per run mode. `main` wires the HTTP sources and the store in; tests wire
//! fixtures.

use crate::config::RunConfig;
use crate::controller::builder::{BuildOutput, CourseDifficultyBuilder, NamePolicy};
use crate::controller::catalog::CourseNameNormalizer;
use crate::controller::player_rounds::RoundGrouper;
use crate::controller::player_stats::process_player_stats;
use crate::export;
use crate::model::{CourseDifficultyRecord, CourseMetricLabels};
use crate::source::{
    CourseTableSource, PlayerStatsSource, RoundsSource, collect_player_stats, collect_rounds,
};
use crate::store::TabularStore;
use crate::sync::{BackupSnapshot, SyncPayload, SyncPipeline, SyncReport};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// The three remote feeds a full run reads.
pub struct Sources<'a> {
    pub course_table: &'a dyn CourseTableSource,
    pub rounds: &'a dyn RoundsSource,
    pub stats: &'a dyn PlayerStatsSource,
}

/// Fetches the course table and builds one difficulty record per course.
///
/// # Errors
///
/// Course table unavailable, or a catalog that fails to load when names are normalized.
pub fn build_course_difficulty(
    config: &RunConfig,
    source: &dyn CourseTableSource,
) -> Result<BuildOutput> {
    let fetched = source
        .fetch_course_table()
        .context("fetch course table")?;
    info!(
        "course table: {} courses, {} categories",
        fetched.table.population(),
        config.categories.len()
    );
    let builder = CourseDifficultyBuilder::new(&config.categories);
    let output = if config.normalize_course_table {
        let mut normalizer = CourseNameNormalizer::new(config.catalog()?);
        let output = builder.build(
            &fetched.table,
            &fetched.schema,
            NamePolicy::Canonical(&mut normalizer),
        );
        normalizer.report().log_summary("course table");
        output
    } else {
        builder.build(&fetched.table, &fetched.schema, NamePolicy::SourceNative)
    };
    if !output.duplicates.is_empty() {
        warn!(
            "{} duplicate course rows replaced: {:?}",
            output.duplicates.len(),
            output.duplicates
        );
    }
    Ok(output)
}

/// `course-difficulty` mode: writes the snapshot and returns its records.
///
/// # Errors
///
/// Fetch, catalog or file write failure.
pub fn course_difficulty(
    config: &RunConfig,
    source: &dyn CourseTableSource,
) -> Result<Vec<CourseDifficultyRecord>> {
    let output = build_course_difficulty(config, source)?;
    let path = config.course_snapshot_path();
    export::write_course_snapshot(&path, &output.records, &config.categories)
        .with_context(|| format!("write {}", path.display()))?;
    info!("wrote {} courses to {}", output.records.len(), path.display());
    Ok(output.records)
}

/// `extended` mode: per-metric rank labels for every course, logged by category.
///
/// # Errors
///
/// Fetch or file write failure.
pub fn extended_report(
    config: &RunConfig,
    source: &dyn CourseTableSource,
) -> Result<Vec<CourseMetricLabels>> {
    let fetched = source
        .fetch_course_table()
        .context("fetch course table")?;
    let builder = CourseDifficultyBuilder::new(&config.categories);
    let labels = builder.metric_labels(&fetched.table, &fetched.schema);

    for category in &config.categories {
        let Some(metrics) = fetched.schema.metrics_for(*category) else {
            warn!("category {category} not in course table");
            continue;
        };
        info!("== {category} ==");
        for course in &labels {
            let line: Vec<String> = metrics
                .iter()
                .filter_map(|metric| course.metrics.get(metric).map(|l| (metric, l)))
                .map(|(metric, label)| {
                    let tier = label.difficulty.map_or("-", |t| t.as_str());
                    match (label.value, label.rank) {
                        (Some(value), Some(rank)) => format!("{metric}={value} #{rank} {tier}"),
                        _ => format!("{metric}=n/a"),
                    }
                })
                .collect();
            info!("{}: {}", course.course_name, line.join(", "));
        }
    }

    let path = config.metric_labels_path();
    export::write_metric_labels(&path, &labels)
        .with_context(|| format!("write {}", path.display()))?;
    info!("wrote labels for {} courses to {}", labels.len(), path.display());
    Ok(labels)
}

/// Fetches stats, rounds and course difficulty, writes the three data files and returns
/// what was written.
///
/// # Errors
///
/// A listing feed (rankings, players, events, course table) is unavailable, or a file
/// cannot be written. Single players or events that fail are skipped.
pub fn fetch_files(config: &RunConfig, sources: &Sources<'_>) -> Result<SyncPayload> {
    let ranked = sources
        .rounds
        .ranked_players()
        .context("fetch player rankings")?;
    info!("{} ranked players", ranked.len());

    let raw_stats = collect_player_stats(sources.stats, config.stats_year, config.player_limit())
        .context("fetch player directory")?;
    let scoring_stats = process_player_stats(raw_stats, &ranked, &config.stat_selection());
    let stats_path = config.stats_csv_path();
    export::write_stats_csv(&stats_path, &scoring_stats)
        .with_context(|| format!("write {}", stats_path.display()))?;

    let rounds = collect_rounds(sources.rounds, config.stats_year).context("fetch event list")?;
    let mut normalizer = if config.normalize_round_courses {
        Some(CourseNameNormalizer::new(config.catalog()?))
    } else {
        None
    };
    let player_rounds = {
        let mut grouper = RoundGrouper::new(config.round_course_blacklist.iter().cloned());
        if let Some(normalizer) = normalizer.as_mut() {
            grouper = grouper.normalize_with(normalizer);
        }
        grouper.group(rounds)
    };
    if let Some(normalizer) = &normalizer {
        normalizer.report().log_summary("player rounds");
    }
    let rounds_path = config.rounds_path();
    export::write_rounds(&rounds_path, &player_rounds)
        .with_context(|| format!("write {}", rounds_path.display()))?;

    let course_difficulty = course_difficulty(config, sources.course_table)?;

    Ok(SyncPayload {
        scoring_stats,
        player_rounds,
        course_difficulty,
    })
}

/// Reads the data files a previous fetch wrote.
///
/// # Errors
///
/// A missing or malformed file.
pub fn read_files(config: &RunConfig) -> Result<SyncPayload> {
    let stats_path = config.stats_csv_path();
    let scoring_stats = export::read_stats_csv(&stats_path)
        .with_context(|| format!("read {}", stats_path.display()))?;
    let rounds_path = config.rounds_path();
    let player_rounds = export::read_rounds(&rounds_path)
        .with_context(|| format!("read {}", rounds_path.display()))?;
    let snapshot_path = config.course_snapshot_path();
    let course_difficulty = export::read_course_snapshot(&snapshot_path)
        .with_context(|| format!("read {}", snapshot_path.display()))?;
    info!(
        "read {} stats, {} rounds, {} courses",
        scoring_stats.len(),
        player_rounds.round_count(),
        course_difficulty.len()
    );
    Ok(SyncPayload {
        scoring_stats,
        player_rounds,
        course_difficulty,
    })
}

/// Runs the sync pipeline once and logs its summary, including after a failure.
///
/// # Errors
///
/// The pipeline's error, with the phase it failed in.
pub fn sync<S: TabularStore>(
    config: &RunConfig,
    store: S,
    payload: &SyncPayload,
) -> Result<SyncReport> {
    let mut pipeline = SyncPipeline::new(store, config.sync_settings());
    match pipeline.run(payload) {
        Ok(report) => {
            report.log_summary();
            Ok(report)
        }
        Err(err) => {
            pipeline.report().log_summary();
            let phases: Vec<&str> = pipeline.history().iter().map(|p| p.as_str()).collect();
            Err(err).with_context(|| format!("sync failed after {}", phases.join(" -> ")))
        }
    }
}

/// `backup` mode.
///
/// # Errors
///
/// The first collection that could not be saved.
pub fn backup<S: TabularStore>(config: &RunConfig, store: S) -> Result<Vec<BackupSnapshot>> {
    let mut pipeline = SyncPipeline::new(store, config.sync_settings());
    let snapshots = pipeline.backup_only().context("backup")?;
    pipeline.report().log_summary();
    Ok(snapshots)
}
