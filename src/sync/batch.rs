use crate::error::SyncError;
use crate::store::{Row, TabularStore};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Inserts `rows` in chunks of `batch_size`, one after another, pausing `delay` between chunks.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// `SyncError::Batch` for the first rejected chunk. Earlier chunks stay committed and
/// later ones are never sent.
pub fn insert_in_batches<S: TabularStore + ?Sized>(
    store: &mut S,
    collection: &str,
    rows: &[Row],
    batch_size: usize,
    delay: Duration,
) -> Result<usize, SyncError> {
    let batch_size = batch_size.max(1);
    let total = rows.len();
    let mut done = 0;
    for (index, chunk) in rows.chunks(batch_size).enumerate() {
        if index > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        store
            .insert(collection, chunk)
            .map_err(|source| SyncError::Batch {
                collection: collection.to_string(),
                batch: index,
                inserted: done,
                source,
            })?;
        done += chunk.len();
        info!("inserted {done}/{total} {collection}");
    }
    Ok(done)
}
