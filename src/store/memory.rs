use super::{DeleteFilter, Row, RowRange, StorageError, TabularStore};
use std::collections::BTreeMap;

/// Store backed by plain vectors. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<Row>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already knows `tables`, each empty.
    #[must_use]
    pub fn with_tables(tables: &[&str]) -> Self {
        let mut store = Self::new();
        for table in tables {
            store.tables.insert((*table).to_string(), Vec::new());
        }
        store
    }

    #[must_use]
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn count(&self, table: &str) -> usize {
        self.rows(table).len()
    }
}

impl TabularStore for MemoryStore {
    fn select(&self, table: &str, range: RowRange) -> Result<Vec<Row>, StorageError> {
        Ok(self
            .rows(table)
            .iter()
            .skip(range.offset)
            .take(range.limit)
            .cloned()
            .collect())
    }

    fn delete(&mut self, table: &str, filter: &DeleteFilter) -> Result<usize, StorageError> {
        let Some(rows) = self.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| filter.keeps(row));
        Ok(before - rows.len())
    }

    fn insert(&mut self, table: &str, rows: &[Row]) -> Result<usize, StorageError> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(rows.len())
    }
}
