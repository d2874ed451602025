use std::ops::Range;

use crate::{SeedError, SeedResult};

/// Splits a row total into fixed-size batches.
///
/// Ranges are 0-based row indexes; the last batch is shorter when `total`
/// is not a multiple of `batch_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    total: u64,
    batch_size: u64,
}

impl BatchPlan {
    pub fn new(total: u64, batch_size: u64) -> SeedResult<Self> {
        if batch_size == 0 {
            return Err(SeedError::Config("batch size must be greater than zero".to_string()));
        }
        Ok(Self { total, batch_size })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Number of batches, `ceil(total / batch_size)`.
    pub fn batch_count(&self) -> u64 {
        self.total.div_ceil(self.batch_size)
    }

    pub fn batches(&self) -> impl Iterator<Item = Range<u64>> {
        let total = self.total;
        let batch_size = self.batch_size;
        (0..self.batch_count()).map(move |i| {
            let start = i * batch_size;
            start..(start + batch_size).min(total)
        })
    }
}
