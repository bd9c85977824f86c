//! The tabular store the pipeline writes to.
//!
//! Three logical collections live in it: `scoring_stats`, `player_rounds` and
//! `course_difficulty`. Rows are loosely shaped JSON objects so any backend that can
//! hold named scalar columns can sit behind [`TabularStore`].

pub mod memory;
pub mod sqlite;

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

impl From<String> for StorageError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StorageError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(format!("sqlite: {value}"))
    }
}

/// A window of rows: `limit` rows starting at `offset`, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: usize,
    pub limit: usize,
}

impl RowRange {
    #[must_use]
    pub fn page(index: usize, size: usize) -> Self {
        Self {
            offset: index * size,
            limit: size,
        }
    }
}

/// Which rows a delete removes.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteFilter {
    All,
    /// Everything except rows whose `column` equals `value`; rows where it is null go too.
    AllExcept { column: String, value: Value },
}

impl DeleteFilter {
    #[must_use]
    pub fn keeps(&self, row: &Row) -> bool {
        match self {
            Self::All => false,
            Self::AllExcept { column, value } => row.get(column) == Some(value),
        }
    }
}

pub trait TabularStore {
    /// # Errors
    ///
    /// Returns `StorageError` when the table is unknown or the backend fails.
    fn select(&self, table: &str, range: RowRange) -> Result<Vec<Row>, StorageError>;

    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the table is unknown or the backend fails.
    fn delete(&mut self, table: &str, filter: &DeleteFilter) -> Result<usize, StorageError>;

    /// Inserts `rows` as one unit: either all of them land or none do.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when any row is rejected; nothing from the call is kept.
    fn insert(&mut self, table: &str, rows: &[Row]) -> Result<usize, StorageError>;
}

impl<T: TabularStore + ?Sized> TabularStore for &mut T {
    fn select(&self, table: &str, range: RowRange) -> Result<Vec<Row>, StorageError> {
        (**self).select(table, range)
    }

    fn delete(&mut self, table: &str, filter: &DeleteFilter) -> Result<usize, StorageError> {
        (**self).delete(table, filter)
    }

    fn insert(&mut self, table: &str, rows: &[Row]) -> Result<usize, StorageError> {
        (**self).insert(table, rows)
    }
}

impl<T: TabularStore + ?Sized> TabularStore for Box<T> {
    fn select(&self, table: &str, range: RowRange) -> Result<Vec<Row>, StorageError> {
        (**self).select(table, range)
    }

    fn delete(&mut self, table: &str, filter: &DeleteFilter) -> Result<usize, StorageError> {
        (**self).delete(table, filter)
    }

    fn insert(&mut self, table: &str, rows: &[Row]) -> Result<usize, StorageError> {
        (**self).insert(table, rows)
    }
}
