use crate::store::StorageError;
use crate::sync::SyncPhase;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("backup of {collection} failed: {source}")]
    Backup {
        collection: String,
        #[source]
        source: Box<SyncError>,
    },
    #[error("clear of {collection} failed: {source}")]
    Clear {
        collection: String,
        #[source]
        source: StorageError,
    },
    #[error(
        "batch {batch} of {collection} failed after {inserted} rows were committed: {source}"
    )]
    Batch {
        collection: String,
        batch: usize,
        inserted: usize,
        #[source]
        source: StorageError,
    },
    #[error("field {field} has non-numeric value {value:?}")]
    Coercion { field: String, value: String },
    #[error("pipeline cannot {action} from state {phase}")]
    InvalidState { phase: SyncPhase, action: &'static str },
    #[error("store error: {0}")]
    Store(#[from] StorageError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    #[must_use]
    pub fn coercion(field: &str, value: &str) -> Self {
        Self::Coercion {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog prefix {prefix:?} is shared by {first:?} and {second:?}")]
    PrefixCollision {
        prefix: String,
        first: String,
        second: String,
    },
    #[error("catalog file {path} unreadable: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
