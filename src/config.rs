use crate::args::{Cli, Mode};
use crate::controller::catalog::{CollisionPolicy, CourseCatalog};
use crate::controller::player_rounds::DEFAULT_COURSE_BLACKLIST;
use crate::controller::player_stats::{DEFAULT_RELEVANT_STAT_IDS, StatSelection};
use crate::export::{COURSE_SNAPSHOT_FILE, METRIC_LABELS_FILE, ROUNDS_FILE, STATS_CSV_FILE};
use crate::model::Category;
use crate::source::course_table::COURSE_TABLE_URL;
use crate::sync::SyncSettings;
use anyhow::{Context, Result, anyhow, bail};
use chrono::Datelike;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TEST_PLAYER_LIMIT: usize = 15;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    mode: Option<Mode>,
    db_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    course_table_url: Option<String>,
    datagolf_key: Option<String>,
    pga_api_key: Option<String>,
    stats_year: Option<i32>,
    categories: Option<Vec<String>>,
    relevant_stat_ids: Option<Vec<String>>,
    catalog_path: Option<PathBuf>,
    catalog_collisions: Option<CollisionPolicy>,
    normalize_course_table: Option<bool>,
    normalize_round_courses: Option<bool>,
    round_course_blacklist: Option<Vec<String>>,
    batch_size: Option<usize>,
    backup_page_size: Option<usize>,
    batch_delay_ms: Option<u64>,
    test_player_limit: Option<usize>,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: Mode,
    pub dry_run: bool,
    pub test_mode: bool,
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub course_table_url: String,
    pub datagolf_key: Option<String>,
    pub pga_api_key: Option<String>,
    pub stats_year: i32,
    pub categories: Vec<Category>,
    pub relevant_stat_ids: Vec<String>,
    pub catalog_path: Option<PathBuf>,
    pub catalog_collisions: CollisionPolicy,
    pub normalize_course_table: bool,
    pub normalize_round_courses: bool,
    pub round_course_blacklist: Vec<String>,
    pub batch_size: usize,
    pub backup_page_size: usize,
    pub batch_delay_ms: u64,
    pub test_player_limit: usize,
}

impl RunConfig {
    #[must_use]
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            batch_size: self.batch_size,
            backup_page_size: self.backup_page_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            backup_dir: self.backup_dir.clone(),
        }
    }

    #[must_use]
    pub fn stat_selection(&self) -> StatSelection {
        StatSelection::new(self.relevant_stat_ids.iter().cloned())
    }

    /// The configured catalog file, or the built-in list.
    ///
    /// # Errors
    ///
    /// Unreadable file, or a prefix collision under the `reject` policy.
    pub fn catalog(&self) -> Result<CourseCatalog> {
        let catalog = match &self.catalog_path {
            Some(path) => CourseCatalog::from_file(path, self.catalog_collisions)?,
            None => CourseCatalog::default_pga(self.catalog_collisions)?,
        };
        Ok(catalog)
    }

    /// `Some(limit)` only under `--test`.
    #[must_use]
    pub fn player_limit(&self) -> Option<usize> {
        self.test_mode.then_some(self.test_player_limit)
    }

    #[must_use]
    pub fn course_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(COURSE_SNAPSHOT_FILE)
    }

    #[must_use]
    pub fn stats_csv_path(&self) -> PathBuf {
        self.data_dir.join(STATS_CSV_FILE)
    }

    #[must_use]
    pub fn rounds_path(&self) -> PathBuf {
        self.data_dir.join(ROUNDS_FILE)
    }

    #[must_use]
    pub fn metric_labels_path(&self) -> PathBuf {
        self.data_dir.join(METRIC_LABELS_FILE)
    }

    /// # Errors
    ///
    /// Returns an error when the mode needs a key that is not set.
    pub fn datagolf_key(&self) -> Result<&str> {
        self.datagolf_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("missing --datagolf-key (or DATAGOLF_KEY)"))
    }

    /// # Errors
    ///
    /// Returns an error when the mode needs a key that is not set.
    pub fn pga_api_key(&self) -> Result<&str> {
        self.pga_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("missing --pga-api-key (or PGA_API_KEY)"))
    }

    /// # Errors
    ///
    /// Returns an error for a zero batch or page size, an unreadable catalog, or a
    /// fetching mode without its keys.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.backup_page_size == 0 {
            bail!("backup_page_size must be greater than zero");
        }
        if self.categories.is_empty() {
            bail!("at least one category is required");
        }
        if let Some(path) = &self.catalog_path {
            fs::metadata(path)
                .with_context(|| format!("catalog file {} is not readable", path.display()))?;
        }
        if self.mode.fetches_feeds() {
            self.datagolf_key()?;
            self.pga_api_key()?;
        }
        Ok(())
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config toml {}", path.display()))?;
    toml::from_str::<FileConfig>(&contents)
        .with_context(|| format!("parse config toml {}", path.display()))
}

fn parse_categories(raw: &[String]) -> Result<Vec<Category>> {
    let mut categories = Vec::with_capacity(raw.len());
    for name in raw {
        let category = name.parse::<Category>().map_err(|e| anyhow!(e))?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

/// Load config from CLI and optional TOML file. CLI values win over the file, the file
/// over built-in defaults.
///
/// # Errors
/// Returns an error if the config file is unreadable or invalid, a category is unknown,
/// or the merged settings fail [`RunConfig::validate`].
pub fn load_config(cli: Cli) -> Result<RunConfig> {
    let file_config = match cli.config_toml.as_ref() {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    let categories = match file_config.categories {
        Some(names) => parse_categories(&names)?,
        None => Category::ALL.to_vec(),
    };

    let config = RunConfig {
        mode: cli.mode.or(file_config.mode).unwrap_or(Mode::Full),
        dry_run: cli.dry_run,
        test_mode: cli.test,
        db_path: cli
            .db_path
            .or(file_config.db_path)
            .unwrap_or_else(|| PathBuf::from("data/course_sync.db")),
        data_dir: cli
            .data_dir
            .or(file_config.data_dir)
            .unwrap_or_else(|| PathBuf::from("data")),
        backup_dir: cli
            .backup_dir
            .or(file_config.backup_dir)
            .unwrap_or_else(|| PathBuf::from("backups")),
        course_table_url: cli
            .course_table_url
            .or(file_config.course_table_url)
            .unwrap_or_else(|| COURSE_TABLE_URL.to_string()),
        datagolf_key: cli.datagolf_key.or(file_config.datagolf_key),
        pga_api_key: cli.pga_api_key.or(file_config.pga_api_key),
        stats_year: cli
            .stats_year
            .or(file_config.stats_year)
            .unwrap_or_else(|| chrono::Local::now().year()),
        categories,
        relevant_stat_ids: file_config.relevant_stat_ids.unwrap_or_else(|| {
            DEFAULT_RELEVANT_STAT_IDS
                .iter()
                .map(ToString::to_string)
                .collect()
        }),
        catalog_path: cli.catalog_path.or(file_config.catalog_path),
        catalog_collisions: cli
            .catalog_collisions
            .or(file_config.catalog_collisions)
            .unwrap_or_default(),
        normalize_course_table: file_config.normalize_course_table.unwrap_or(false),
        normalize_round_courses: file_config.normalize_round_courses.unwrap_or(false),
        round_course_blacklist: file_config.round_course_blacklist.unwrap_or_else(|| {
            DEFAULT_COURSE_BLACKLIST
                .iter()
                .map(ToString::to_string)
                .collect()
        }),
        batch_size: cli.batch_size.or(file_config.batch_size).unwrap_or(250),
        backup_page_size: cli
            .backup_page_size
            .or(file_config.backup_page_size)
            .unwrap_or(10_000),
        batch_delay_ms: cli
            .batch_delay_ms
            .or(file_config.batch_delay_ms)
            .unwrap_or(100),
        test_player_limit: file_config
            .test_player_limit
            .unwrap_or(DEFAULT_TEST_PLAYER_LIMIT),
    };
    config.validate()?;
    Ok(config)
}
