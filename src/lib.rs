pub mod app;
pub mod args;
pub mod coerce;
pub mod config;
pub mod controller {
    pub mod aggregate;
    pub mod builder;
    pub mod catalog;
    pub mod percentile;
    pub mod player_rounds;
    pub mod player_stats;
    pub mod tiers;
}
pub mod error;
pub mod export;
pub mod model;
pub mod source;
pub mod store;
pub mod sync;

pub use config::{RunConfig, load_config};
pub use error::{CatalogError, SourceError, SyncError};
pub use store::{StorageError, TabularStore};
