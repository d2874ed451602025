use crate::model::Table;

/// Error type for seeding operations
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Batch {batch} of table '{table}' failed: {source}")]
    Batch {
        table: Table,
        batch: usize,
        #[source]
        source: Box<SeedError>,
    },

    #[error("Table '{table}' expected {expected} rows but {actual} were inserted")]
    RowCountMismatch {
        table: Table,
        expected: u64,
        actual: u64,
    },

    #[error("Batch rejected by backend: {0}")]
    Rejected(String),

    #[error("Observer failed: {0}")]
    Observer(String),
}

impl SeedError {
    /// Wrap a backend failure with the batch it happened in.
    pub fn batch(table: Table, batch: usize, source: SeedError) -> Self {
        SeedError::Batch {
            table,
            batch,
            source: Box::new(source),
        }
    }
}

/// Result type for seeding operations
pub type SeedResult<T> = Result<T, SeedError>;
