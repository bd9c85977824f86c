use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Fetch every feed, write the data files, then sync them into the store.
    Full,
    /// Fetch the course table and write the difficulty snapshot only.
    CourseDifficulty,
    /// Fetch the course table and write per-metric rank labels.
    Extended,
    /// Sync previously written data files into the store.
    Sync,
    /// Snapshot the store's collections and stop.
    Backup,
}

impl Mode {
    #[must_use]
    pub fn fetches_feeds(self) -> bool {
        matches!(self, Mode::Full)
    }

    #[must_use]
    pub fn touches_store(self) -> bool {
        matches!(self, Mode::Full | Mode::Sync | Mode::Backup)
    }
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Course difficulty and player stats sync", long_about = None)]
pub struct Cli {
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
    #[arg(long, value_parser = crate::args::validation::check_readable_file)]
    pub config_toml: Option<PathBuf>,
    /// SQLite database file the collections live in.
    #[arg(long)]
    pub db_path: Option<PathBuf>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
    #[arg(long)]
    pub course_table_url: Option<String>,
    #[arg(long, env = "DATAGOLF_KEY", hide_env_values = true)]
    pub datagolf_key: Option<String>,
    #[arg(long, env = "PGA_API_KEY", hide_env_values = true)]
    pub pga_api_key: Option<String>,
    #[arg(long)]
    pub stats_year: Option<i32>,
    /// One catalog name per line; replaces the built-in list.
    #[arg(long, value_parser = crate::args::validation::check_readable_file)]
    pub catalog_path: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub catalog_collisions: Option<crate::controller::catalog::CollisionPolicy>,
    #[arg(long, value_parser = crate::args::validation::check_positive)]
    pub batch_size: Option<usize>,
    #[arg(long, value_parser = crate::args::validation::check_positive)]
    pub backup_page_size: Option<usize>,
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,
    /// Only fetch stats for the first few players.
    #[arg(long)]
    pub test: bool,
    /// Run the sync against an in-memory store instead of the database.
    #[arg(long)]
    pub dry_run: bool,
}
