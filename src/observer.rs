use async_trait::async_trait;

use crate::model::Table;
use crate::seeder::StageReport;
use crate::SeedResult;

/// Trait for components that need to be notified of seeding progress.
///
/// Observers are registered with a `Seeder` and receive a callback after
/// every committed batch and after every completed stage. Returning an error
/// from either callback aborts the run.
#[async_trait]
pub trait SeedObserver: Send + Sync {
    /// Called after the backend accepted a batch.
    ///
    /// With concurrency above one, batches of a stage may complete out of
    /// order; `batch` is the 0-based position in the stage's batch plan.
    async fn on_batch_inserted(&self, table: Table, batch: usize, rows: u64) -> SeedResult<()>;

    /// Called once all batches of a stage have been inserted.
    async fn on_stage_complete(&self, report: &StageReport) -> SeedResult<()>;
}
