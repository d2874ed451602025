//! The staged population pipeline.
//!
//! A run executes four stages in dependency order:
//!
//! ```text
//! users ──► products ──► orders ──► order items ──► close backend
//!                          │             │
//!                    user ids 1..=U   order ids 1..=O, product ids 1..=P
//! ```
//!
//! Foreign keys are drawn from the configured totals of earlier stages, not
//! from a query against the backend. This is only sound when nothing else
//! writes to the tables during a run.

use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::backend::InsertBackend;
use crate::batch::BatchPlan;
use crate::generator::RowGenerator;
use crate::model::{RowBatch, Table};
use crate::observer::SeedObserver;
use crate::{SeedError, SeedResult};

/// Outcome of one population stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub table: Table,
    pub rows_inserted: u64,
    pub batch_count: u64,
    pub duration: Duration,
}

impl StageReport {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.rows_inserted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Outcome of a full run, one report per stage in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub stages: Vec<StageReport>,
}

impl SeedReport {
    pub fn stage(&self, table: Table) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.table == table)
    }

    pub fn total_rows(&self) -> u64 {
        self.stages.iter().map(|s| s.rows_inserted).sum()
    }

    pub fn total_batches(&self) -> u64 {
        self.stages.iter().map(|s| s.batch_count).sum()
    }
}

/// Row totals and batching for a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub users: u64,
    pub products: u64,
    pub orders: u64,
    pub items_per_order: u64,
    pub batch_size: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            users: 100_000,
            products: 10_000,
            orders: 2_500_000,
            items_per_order: 3,
            batch_size: 10_000,
        }
    }
}

impl DatasetConfig {
    pub fn order_items(&self) -> u64 {
        self.orders * self.items_per_order
    }
}

/// Generates synthetic rows and submits them to a backend in batches.
pub struct Seeder<B: InsertBackend> {
    backend: B,
    generator: RowGenerator,
    concurrency: usize,
    observers: Arc<RwLock<Vec<Arc<dyn SeedObserver>>>>,
}

impl<B: InsertBackend> Seeder<B> {
    pub fn new(backend: B, generator: RowGenerator) -> Self {
        Self {
            backend,
            generator,
            concurrency: 1,
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Allow up to `concurrency` batches of one stage in flight at once.
    ///
    /// Stages still run one after another. Values below one are treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Register a component that needs to be notified of seeding progress.
    pub fn register_observer(&self, observer: Arc<dyn SeedObserver>) {
        self.observers.write().push(observer);
    }

    pub async fn generate_users(&mut self, total: u64, batch_size: u64) -> SeedResult<StageReport> {
        self.run_stage(Table::Users, total, batch_size, |generator, range| {
            RowBatch::Users(generator.users(range))
        })
        .await
    }

    pub async fn generate_products(&mut self, total: u64, batch_size: u64) -> SeedResult<StageReport> {
        self.run_stage(Table::Products, total, batch_size, |generator, range| {
            RowBatch::Products(generator.products(range))
        })
        .await
    }

    pub async fn generate_orders(
        &mut self,
        total: u64,
        batch_size: u64,
        user_count: u64,
    ) -> SeedResult<StageReport> {
        require_references(Table::Orders, total, &[(Table::Users, user_count)])?;
        self.run_stage(Table::Orders, total, batch_size, |generator, range| {
            RowBatch::Orders(generator.orders(range, user_count))
        })
        .await
    }

    /// Inserts `total_orders * items_multiplier` order items.
    pub async fn generate_order_items(
        &mut self,
        total_orders: u64,
        items_multiplier: u64,
        batch_size: u64,
        order_count: u64,
        product_count: u64,
    ) -> SeedResult<StageReport> {
        let total = total_orders.checked_mul(items_multiplier).ok_or_else(|| {
            SeedError::Config(format!(
                "{total_orders} orders x {items_multiplier} items overflows"
            ))
        })?;
        require_references(
            Table::OrderItems,
            total,
            &[(Table::Orders, order_count), (Table::Products, product_count)],
        )?;
        self.run_stage(Table::OrderItems, total, batch_size, |generator, range| {
            RowBatch::OrderItems(generator.order_items(range, order_count, product_count))
        })
        .await
    }

    /// Populate all four tables and close the backend.
    ///
    /// The backend is closed exactly once, whether or not the stages succeed.
    pub async fn run(mut self, config: &DatasetConfig) -> SeedResult<SeedReport> {
        let result = self.run_stages(config).await;
        if let Err(e) = &result {
            error!("Seeding aborted: {}", e);
        }
        self.close().await;
        result
    }

    /// Release the backend. Consumes the seeder so it cannot be closed twice.
    pub async fn close(self) {
        self.backend.close().await;
    }

    /// Reject a batch size the backend cannot accept for `table`.
    ///
    /// Only the rows actually sent count, so a stage smaller than the batch
    /// size is checked against its total.
    fn check_batch_size(&self, table: Table, total: u64, batch_size: u64) -> SeedResult<()> {
        let rows = batch_size.min(total);
        match self.backend.max_batch_rows(table) {
            Some(max) if rows > max => Err(SeedError::Config(format!(
                "batch size {batch_size} exceeds the backend limit of {max} rows for {table}"
            ))),
            _ => Ok(()),
        }
    }

    /// Check every stage of `config` before any row is written.
    fn preflight(&self, config: &DatasetConfig) -> SeedResult<()> {
        BatchPlan::new(0, config.batch_size)?;
        let order_items = config.orders.checked_mul(config.items_per_order).ok_or_else(|| {
            SeedError::Config(format!(
                "{} orders x {} items overflows",
                config.orders, config.items_per_order
            ))
        })?;

        require_references(Table::Orders, config.orders, &[(Table::Users, config.users)])?;
        require_references(
            Table::OrderItems,
            order_items,
            &[(Table::Orders, config.orders), (Table::Products, config.products)],
        )?;

        for (table, total) in [
            (Table::Users, config.users),
            (Table::Products, config.products),
            (Table::Orders, config.orders),
            (Table::OrderItems, order_items),
        ] {
            self.check_batch_size(table, total, config.batch_size)?;
        }
        Ok(())
    }

    async fn run_stages(&mut self, config: &DatasetConfig) -> SeedResult<SeedReport> {
        self.preflight(config)?;
        let started = Instant::now();
        let mut report = SeedReport::default();

        report
            .stages
            .push(self.generate_users(config.users, config.batch_size).await?);
        report
            .stages
            .push(self.generate_products(config.products, config.batch_size).await?);
        report.stages.push(
            self.generate_orders(config.orders, config.batch_size, config.users)
                .await?,
        );
        report.stages.push(
            self.generate_order_items(
                config.orders,
                config.items_per_order,
                config.batch_size,
                config.orders,
                config.products,
            )
            .await?,
        );

        info!(
            "Seeding complete: {} rows in {} batches ({:?})",
            report.total_rows(),
            report.total_batches(),
            started.elapsed()
        );
        Ok(report)
    }

    async fn run_stage<F>(
        &mut self,
        table: Table,
        total: u64,
        batch_size: u64,
        mut build: F,
    ) -> SeedResult<StageReport>
    where
        F: FnMut(&mut RowGenerator, Range<u64>) -> RowBatch,
    {
        let plan = BatchPlan::new(total, batch_size)?;
        self.check_batch_size(table, total, batch_size)?;

        info!(
            "Populating table '{}' with {} rows (batch size: {}, batches: {})",
            table,
            total,
            batch_size,
            plan.batch_count()
        );

        let started = Instant::now();
        let backend = &self.backend;
        let generator = &mut self.generator;

        // Batches are built lazily in plan order as the stream is polled,
        // so generation never runs ahead of the in-flight window
        let mut submissions = stream::iter(plan.batches().enumerate())
            .map(|(index, range)| {
                let batch = build(generator, range);
                async move {
                    let rows = backend
                        .insert_batch(&batch)
                        .await
                        .map_err(|e| SeedError::batch(table, index, e))?;
                    Ok::<_, SeedError>((index, rows))
                }
            })
            .buffer_unordered(self.concurrency);

        let mut rows_inserted = 0;
        let mut batch_count = 0;
        while let Some(result) = submissions.next().await {
            let (index, rows) = result?;
            rows_inserted += rows;
            batch_count += 1;
            debug!(
                "Batch {} of '{}' complete: {} rows inserted, {} of {} total",
                index, table, rows, rows_inserted, total
            );

            let observers = self.observers.read().clone();
            for observer in observers.iter() {
                observer.on_batch_inserted(table, index, rows).await?;
            }
        }

        if rows_inserted != total {
            return Err(SeedError::RowCountMismatch {
                table,
                expected: total,
                actual: rows_inserted,
            });
        }

        let report = StageReport {
            table,
            rows_inserted,
            batch_count,
            duration: started.elapsed(),
        };
        info!(
            "Table '{}' complete: {} rows in {:?} ({:.2} rows/sec)",
            table,
            report.rows_inserted,
            report.duration,
            report.rows_per_second()
        );

        let observers = self.observers.read().clone();
        for observer in observers.iter() {
            observer.on_stage_complete(&report).await?;
        }
        Ok(report)
    }
}

/// A stage with rows to insert needs every referenced table to be non-empty.
fn require_references(table: Table, total: u64, references: &[(Table, u64)]) -> SeedResult<()> {
    if total == 0 {
        return Ok(());
    }
    for (referenced, count) in references {
        if *count == 0 {
            return Err(SeedError::Config(format!(
                "cannot generate {total} {table} rows referencing an empty {referenced} range"
            )));
        }
        if i64::try_from(*count).is_err() {
            return Err(SeedError::Config(format!(
                "{referenced} range of {count} ids does not fit a BIGINT key"
            )));
        }
    }
    Ok(())
}
