use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::InsertBackend;
use crate::model::{NewOrder, NewOrderItem, NewProduct, NewUser, RowBatch, Table};
use crate::{SeedError, SeedResult};

/// A row together with the id the backend assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow<T> {
    pub id: i64,
    pub row: T,
}

#[derive(Default)]
struct Tables {
    users: Vec<StoredRow<NewUser>>,
    products: Vec<StoredRow<NewProduct>>,
    orders: Vec<StoredRow<NewOrder>>,
    order_items: Vec<StoredRow<NewOrderItem>>,
}

/// In-process backend that keeps inserted rows in memory.
///
/// Ids are assigned sequentially per table starting at 1 and keep counting
/// across runs, like a serial column. Every accepted batch size is recorded
/// in submission order.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    batches: RwLock<Vec<(Table, usize)>>,
    submitted: RwLock<HashMap<Table, usize>>,
    fail_at: RwLock<Option<(Table, usize)>>,
    closed: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `batch`-th (0-based) submission for `table`.
    pub fn fail_at(self, table: Table, batch: usize) -> Self {
        *self.fail_at.write() = Some((table, batch));
        self
    }

    pub fn users(&self) -> Vec<StoredRow<NewUser>> {
        self.tables.read().users.clone()
    }

    pub fn products(&self) -> Vec<StoredRow<NewProduct>> {
        self.tables.read().products.clone()
    }

    pub fn orders(&self) -> Vec<StoredRow<NewOrder>> {
        self.tables.read().orders.clone()
    }

    pub fn order_items(&self) -> Vec<StoredRow<NewOrderItem>> {
        self.tables.read().order_items.clone()
    }

    pub fn row_count(&self, table: Table) -> usize {
        let tables = self.tables.read();
        match table {
            Table::Users => tables.users.len(),
            Table::Products => tables.products.len(),
            Table::Orders => tables.orders.len(),
            Table::OrderItems => tables.order_items.len(),
        }
    }

    /// Sizes of the accepted batches for `table`, in the order they arrived.
    pub fn batch_sizes(&self, table: Table) -> Vec<usize> {
        self.batches
            .read()
            .iter()
            .filter(|(t, _)| *t == table)
            .map(|(_, size)| *size)
            .collect()
    }

    /// How many times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

fn append<T: Clone>(target: &mut Vec<StoredRow<T>>, rows: &[T]) {
    let mut next_id = target.last().map_or(1, |last| last.id + 1);
    for row in rows {
        target.push(StoredRow {
            id: next_id,
            row: row.clone(),
        });
        next_id += 1;
    }
}

#[async_trait]
impl InsertBackend for MemoryBackend {
    async fn insert_batch(&self, batch: &RowBatch) -> SeedResult<u64> {
        let table = batch.table();

        let position = {
            let mut submitted = self.submitted.write();
            let counter = submitted.entry(table).or_insert(0);
            let position = *counter;
            *counter += 1;
            position
        };

        if *self.fail_at.read() == Some((table, position)) {
            return Err(SeedError::Rejected(format!(
                "injected failure for {table} batch {position}"
            )));
        }

        // Rows and batch log are updated under the table lock so that
        // concurrent batches land as contiguous id ranges
        let mut tables = self.tables.write();
        match batch {
            RowBatch::Users(rows) => append(&mut tables.users, rows),
            RowBatch::Products(rows) => append(&mut tables.products, rows),
            RowBatch::Orders(rows) => append(&mut tables.orders, rows),
            RowBatch::OrderItems(rows) => append(&mut tables.order_items, rows),
        }
        self.batches.write().push((table, batch.len()));

        Ok(batch.len() as u64)
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
