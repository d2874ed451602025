use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::InsertBackend;
use crate::model::{RowBatch, Table};
use crate::{SeedError, SeedResult};

/// PostgreSQL accepts at most this many bind parameters in one statement.
pub const MAX_BIND_PARAMS: u64 = 65_535;

/// Most rows of `table` that fit one INSERT under the bind parameter limit.
pub fn bind_limit_rows(table: Table) -> u64 {
    MAX_BIND_PARAMS / table.columns().len() as u64
}

/// Connection pool sizing.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Backend that writes batches to PostgreSQL through a shared connection pool.
pub struct PostgresBackend {
    pool: Arc<PgPool>,
}

impl PostgresBackend {
    /// Create a new PostgresBackend with the given connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// The pool is acquired once and lives until `close` is called.
    pub async fn connect(database_url: &str, config: &PoolConfig) -> SeedResult<Self> {
        tracing::debug!(
            "Creating database pool: max={}, timeout={:?}",
            config.max_connections,
            config.acquire_timeout
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create database pool: {}", e);
                SeedError::Connection(e)
            })?;

        tracing::info!(
            "Database pool created with {} max connections",
            config.max_connections
        );
        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Build one multi-row INSERT with every value passed as a bind parameter.
pub(crate) fn build_insert(batch: &RowBatch) -> QueryBuilder<'_, Postgres> {
    let table = batch.table();
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        table.name(),
        table.columns().join(", ")
    ));

    match batch {
        RowBatch::Users(rows) => {
            builder.push_values(rows, |mut b, user| {
                b.push_bind(user.email.as_str()).push_bind(user.created_at);
            });
        }
        RowBatch::Products(rows) => {
            builder.push_values(rows, |mut b, product| {
                b.push_bind(product.name.as_str()).push_bind(product.price);
            });
        }
        RowBatch::Orders(rows) => {
            builder.push_values(rows, |mut b, order| {
                b.push_bind(order.user_id)
                    .push_bind(order.created_at)
                    .push_bind(order.status.as_str());
            });
        }
        RowBatch::OrderItems(rows) => {
            builder.push_values(rows, |mut b, item| {
                b.push_bind(item.order_id)
                    .push_bind(item.product_id)
                    .push_bind(item.quantity)
                    .push_bind(item.price);
            });
        }
    }

    builder
}

#[async_trait]
impl InsertBackend for PostgresBackend {
    async fn insert_batch(&self, batch: &RowBatch) -> SeedResult<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut builder = build_insert(batch);
        let result = builder.build().execute(&*self.pool).await?;
        Ok(result.rows_affected())
    }

    fn max_batch_rows(&self, table: Table) -> Option<u64> {
        Some(bind_limit_rows(table))
    }

    async fn close(&self) {
        tracing::debug!("Closing database pool");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewOrder, NewUser, OrderStatus};
    use chrono::Utc;

    #[test]
    fn test_insert_uses_bind_parameters() {
        let batch = RowBatch::Users(vec![
            NewUser {
                email: "user1@example.com".to_string(),
                created_at: Utc::now(),
            },
            NewUser {
                email: "o'brien@example.com".to_string(),
                created_at: Utc::now(),
            },
        ]);

        let builder = build_insert(&batch);
        let sql = builder.sql();

        assert_eq!(
            sql,
            "INSERT INTO users (email, created_at) VALUES ($1, $2), ($3, $4)"
        );
        assert!(!sql.contains("o'brien"));
    }

    #[test]
    fn test_orders_insert_columns() {
        let batch = RowBatch::Orders(vec![NewOrder {
            user_id: 1,
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }]);

        let builder = build_insert(&batch);
        assert_eq!(
            builder.sql(),
            "INSERT INTO orders (user_id, created_at, status) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_reference_batch_size_fits_bind_limit() {
        // Widest table at the default batch size of 10k rows
        let widest = Table::ALL.iter().map(|t| t.columns().len()).max().unwrap() as u64;
        assert_eq!(widest, 4);
        assert!(10_000 * widest <= MAX_BIND_PARAMS);
        assert_eq!(bind_limit_rows(Table::OrderItems), 16_383);
        assert_eq!(bind_limit_rows(Table::Users), 32_767);
    }
}
