use crate::error::SyncError;
use crate::export::{read_json, write_json};
use crate::store::{Row, RowRange, StorageError, TabularStore};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSnapshot {
    pub collection: String,
    pub rows: usize,
    pub path: PathBuf,
}

#[must_use]
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[must_use]
pub fn snapshot_path(dir: &Path, collection: &str, stamp: &str) -> PathBuf {
    dir.join(format!("{collection}_backup_{stamp}.json"))
}

/// Reads `table` page by page until a page comes back short.
///
/// # Errors
///
/// The first failed `select`, or a zero page size.
pub fn fetch_all_rows<S: TabularStore + ?Sized>(
    store: &S,
    table: &str,
    page_size: usize,
) -> Result<Vec<Row>, StorageError> {
    if page_size == 0 {
        return Err(StorageError::new("backup page size must be positive"));
    }
    let mut rows = Vec::new();
    let mut page = 0;
    loop {
        let batch = store.select(table, RowRange::page(page, page_size))?;
        let short = batch.len() < page_size;
        rows.extend(batch);
        if short {
            return Ok(rows);
        }
        page += 1;
    }
}

/// Writes a snapshot of `collection` and reads it back before reporting success.
///
/// # Errors
///
/// `SyncError::Backup` wrapping whatever stopped the snapshot.
pub fn backup_collection<S: TabularStore + ?Sized>(
    store: &S,
    collection: &str,
    page_size: usize,
    dir: &Path,
    stamp: &str,
) -> Result<BackupSnapshot, SyncError> {
    snapshot(store, collection, page_size, dir, stamp).map_err(|source| SyncError::Backup {
        collection: collection.to_string(),
        source: Box::new(source),
    })
}

fn snapshot<S: TabularStore + ?Sized>(
    store: &S,
    collection: &str,
    page_size: usize,
    dir: &Path,
    stamp: &str,
) -> Result<BackupSnapshot, SyncError> {
    let rows = fetch_all_rows(store, collection, page_size)?;
    let path = snapshot_path(dir, collection, stamp);
    write_json(&path, &rows)?;

    let written: Vec<Row> = read_json(&path)?;
    if written.len() != rows.len() {
        return Err(SyncError::Io(std::io::Error::other(format!(
            "{} holds {} rows, expected {}",
            path.display(),
            written.len(),
            rows.len()
        ))));
    }
    info!(
        "backed up {} {collection} records to {}",
        rows.len(),
        path.display()
    );
    Ok(BackupSnapshot {
        collection: collection.to_string(),
        rows: rows.len(),
        path,
    })
}
