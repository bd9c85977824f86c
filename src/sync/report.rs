use super::{BackupSnapshot, SyncPhase};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub phases: Vec<SyncPhase>,
    pub backups: Vec<BackupSnapshot>,
    pub cleared: BTreeMap<String, usize>,
    /// Rows committed per collection. After a failed batch this is the count that made it in.
    pub inserted: BTreeMap<String, usize>,
}

impl SyncReport {
    #[must_use]
    pub fn inserted_into(&self, collection: &str) -> usize {
        self.inserted.get(collection).copied().unwrap_or(0)
    }

    pub fn log_summary(&self) {
        for backup in &self.backups {
            info!("backup: {} rows of {}", backup.rows, backup.collection);
        }
        for (collection, removed) in &self.cleared {
            info!("cleared: {removed} rows of {collection}");
        }
        for (collection, inserted) in &self.inserted {
            info!("written: {inserted} rows of {collection}");
        }
    }
}
