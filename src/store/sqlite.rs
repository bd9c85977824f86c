use super::{DeleteFilter, Row, RowRange, StorageError, TabularStore};
use regex::Regex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use serde_json::{Number, Value};
use std::path::Path;
use std::sync::OnceLock;

const SCHEMA: [&str; 3] = [
    include_str!("../sql/schema/sqlite/00_scoring_stats.sql"),
    include_str!("../sql/schema/sqlite/01_player_rounds.sql"),
    include_str!("../sql/schema/sqlite/02_course_difficulty.sql"),
];

fn identifier_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok())
        .as_ref()
}

/// Table and column names are spliced into SQL text, so only plain identifiers pass.
fn checked_identifier(name: &str) -> Result<&str, StorageError> {
    if identifier_pattern().is_some_and(|pattern| pattern.is_match(name)) {
        Ok(name)
    } else {
        Err(StorageError::new(format!("invalid identifier {name:?}")))
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the three collections exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be opened or the schema fails to apply.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::new(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.apply_schema()?;
        Ok(store)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the schema fails to apply.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.apply_schema()?;
        Ok(store)
    }

    fn apply_schema(&self) -> Result<(), StorageError> {
        for ddl in SCHEMA {
            self.conn.execute_batch(ddl)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError` for an unknown table.
    pub fn count(&self, table: &str) -> Result<usize, StorageError> {
        let table = checked_identifier(table)?;
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        usize::try_from(n).map_err(|e| StorageError::new(e.to_string()))
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real))
            .unwrap_or(SqlValue::Null),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

impl TabularStore for SqliteStore {
    fn select(&self, table: &str, range: RowRange) -> Result<Vec<Row>, StorageError> {
        let table = checked_identifier(table)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {table} ORDER BY rowid LIMIT ?1 OFFSET ?2"
        ))?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();
        let limit = i64::try_from(range.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(range.offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit, offset], |row| {
            let mut out = Row::new();
            for (i, name) in columns.iter().enumerate() {
                out.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            Ok(out)
        })?;

        let mut selected = Vec::new();
        for row in rows {
            selected.push(row?);
        }
        Ok(selected)
    }

    fn delete(&mut self, table: &str, filter: &DeleteFilter) -> Result<usize, StorageError> {
        let table = checked_identifier(table)?;
        let removed = match filter {
            DeleteFilter::All => self.conn.execute(&format!("DELETE FROM {table}"), [])?,
            DeleteFilter::AllExcept { column, value } => {
                let column = checked_identifier(column)?;
                self.conn.execute(
                    &format!("DELETE FROM {table} WHERE {column} IS NOT ?1"),
                    [to_sql(value)],
                )?
            }
        };
        Ok(removed)
    }

    fn insert(&mut self, table: &str, rows: &[Row]) -> Result<usize, StorageError> {
        let table = checked_identifier(table)?;
        let tx = self.conn.transaction()?;
        for row in rows {
            let mut columns = Vec::with_capacity(row.len());
            for column in row.keys() {
                columns.push(checked_identifier(column)?);
            }
            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            );
            tx.execute(&sql, params_from_iter(row.values().map(to_sql)))?;
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_checked() {
        assert!(checked_identifier("course_difficulty").is_ok());
        assert!(checked_identifier("course_difficulty; DROP TABLE x").is_err());
        assert!(checked_identifier("").is_err());
    }
}
