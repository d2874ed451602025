use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use ecommerce_seed::{SeedError, SeedObserver, SeedResult, StageReport, Table};

/// Observer that records every notification for verification in tests
pub struct BatchRecorder {
    batches: Arc<RwLock<Vec<(Table, usize, u64)>>>,
    stages: Arc<RwLock<Vec<StageReport>>>,
}

impl BatchRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Arc::new(RwLock::new(Vec::new())),
            stages: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Row counts of the batches reported for `table`, ordered by batch index
    pub fn batch_rows(&self, table: Table) -> Vec<u64> {
        let mut batches: Vec<(usize, u64)> = self
            .batches
            .read()
            .iter()
            .filter(|(t, _, _)| *t == table)
            .map(|(_, index, rows)| (*index, *rows))
            .collect();
        batches.sort();
        batches.into_iter().map(|(_, rows)| rows).collect()
    }

    pub fn completed_stages(&self) -> Vec<Table> {
        self.stages.read().iter().map(|s| s.table).collect()
    }
}

#[async_trait]
impl SeedObserver for BatchRecorder {
    async fn on_batch_inserted(&self, table: Table, batch: usize, rows: u64) -> SeedResult<()> {
        self.batches.write().push((table, batch, rows));
        Ok(())
    }

    async fn on_stage_complete(&self, report: &StageReport) -> SeedResult<()> {
        self.stages.write().push(report.clone());
        Ok(())
    }
}

/// Observer that fails at a chosen point of the run
pub struct FailingObserver {
    table: Table,
    batch: Option<usize>,
}

impl FailingObserver {
    /// Fail once all batches of `table` are inserted
    pub fn on_stage(table: Table) -> Arc<Self> {
        Arc::new(Self { table, batch: None })
    }

    /// Fail right after batch `batch` of `table` is inserted
    pub fn on_batch(table: Table, batch: usize) -> Arc<Self> {
        Arc::new(Self {
            table,
            batch: Some(batch),
        })
    }
}

#[async_trait]
impl SeedObserver for FailingObserver {
    async fn on_batch_inserted(&self, table: Table, batch: usize, _rows: u64) -> SeedResult<()> {
        if table == self.table && self.batch == Some(batch) {
            return Err(SeedError::Observer(format!("refusing {table} batch {batch}")));
        }
        Ok(())
    }

    async fn on_stage_complete(&self, report: &StageReport) -> SeedResult<()> {
        if self.batch.is_none() && report.table == self.table {
            return Err(SeedError::Observer(format!("refusing {}", report.table)));
        }
        Ok(())
    }
}
