use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use ecommerce_seed::backend::postgres::bind_limit_rows;
use ecommerce_seed::{InsertBackend, MemoryBackend, RowBatch, SeedResult, Table};

/// Memory backend that yields mid-insert and tracks how many batches overlap
pub struct PacedBackend {
    inner: MemoryBackend,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl PacedBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    /// Highest number of batches that were inside `insert_batch` at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsertBackend for PacedBackend {
    async fn insert_batch(&self, batch: &RowBatch) -> SeedResult<u64> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let result = self.inner.insert_batch(batch).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

/// Memory backend limited to the rows PostgreSQL can bind per INSERT
pub struct BindLimitedBackend {
    inner: MemoryBackend,
}

impl BindLimitedBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
        }
    }

    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }
}

#[async_trait]
impl InsertBackend for BindLimitedBackend {
    async fn insert_batch(&self, batch: &RowBatch) -> SeedResult<u64> {
        self.inner.insert_batch(batch).await
    }

    fn max_batch_rows(&self, table: Table) -> Option<u64> {
        Some(bind_limit_rows(table))
    }

    async fn close(&self) {
        self.inner.close().await
    }
}
