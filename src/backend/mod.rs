//! Storage backends that accept bulk inserts.

use async_trait::async_trait;
use std::sync::Arc;

use crate::model::{RowBatch, Table};
use crate::SeedResult;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryBackend, StoredRow};
pub use postgres::{PostgresBackend, PoolConfig};

/// The single capability the seeder needs from storage.
///
/// Implementations are handed to the `Seeder` explicitly, which keeps the
/// pipeline free of process-wide connection state and lets tests substitute
/// an in-memory backend.
#[async_trait]
pub trait InsertBackend: Send + Sync {
    /// Insert every row of `batch` as one statement and return the number of rows written.
    async fn insert_batch(&self, batch: &RowBatch) -> SeedResult<u64>;

    /// Largest number of rows a single batch for `table` may hold, if limited.
    fn max_batch_rows(&self, _table: Table) -> Option<u64> {
        None
    }

    /// Release any resources held by the backend.
    async fn close(&self);
}

#[async_trait]
impl<T: InsertBackend + ?Sized> InsertBackend for Arc<T> {
    async fn insert_batch(&self, batch: &RowBatch) -> SeedResult<u64> {
        (**self).insert_batch(batch).await
    }

    fn max_batch_rows(&self, table: Table) -> Option<u64> {
        (**self).max_batch_rows(table)
    }

    async fn close(&self) {
        (**self).close().await
    }
}
