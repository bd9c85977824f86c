use anyhow::{Context, Result};
use clap::Parser;
use course_sync::app::{self, Sources};
use course_sync::args::{Cli, Mode};
use course_sync::config::{RunConfig, load_config};
use course_sync::source::{DataGolfClient, HttpCourseTable, PgaTourClient};
use course_sync::store::TabularStore;
use course_sync::store::memory::MemoryStore;
use course_sync::store::sqlite::SqliteStore;
use course_sync::sync::{COURSE_DIFFICULTY, PLAYER_ROUNDS, SCORING_STATS};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn open_store(config: &RunConfig) -> Result<Box<dyn TabularStore>> {
    if config.dry_run {
        info!("dry run: syncing into an in-memory store");
        return Ok(Box::new(MemoryStore::with_tables(&[
            SCORING_STATS,
            PLAYER_ROUNDS,
            COURSE_DIFFICULTY,
        ])));
    }
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("open database {}", config.db_path.display()))?;
    Ok(Box::new(store))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(Cli::parse())?;
    info!(mode = ?config.mode, year = config.stats_year, "starting");
    let course_table = HttpCourseTable::new(&config.course_table_url);

    match config.mode {
        Mode::CourseDifficulty => {
            app::course_difficulty(&config, &course_table)?;
        }
        Mode::Extended => {
            app::extended_report(&config, &course_table)?;
        }
        Mode::Full => {
            let datagolf = DataGolfClient::new(config.datagolf_key()?);
            let pga = PgaTourClient::new(config.pga_api_key()?);
            let sources = Sources {
                course_table: &course_table,
                rounds: &datagolf,
                stats: &pga,
            };
            let payload = app::fetch_files(&config, &sources)?;
            app::sync(&config, open_store(&config)?, &payload)?;
        }
        Mode::Sync => {
            let payload = app::read_files(&config)?;
            app::sync(&config, open_store(&config)?, &payload)?;
        }
        Mode::Backup => {
            let snapshots = app::backup(&config, open_store(&config)?)?;
            info!("{} collections backed up", snapshots.len());
        }
    }
    info!("done");
    Ok(())
}
