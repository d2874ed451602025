//! Random row synthesis for the four seeded tables.

use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::ops::Range;

use crate::model::{NewOrder, NewOrderItem, NewProduct, NewUser, OrderStatus};
use crate::{SeedError, SeedResult};

/// Upper bound for product and order item prices, in cents.
pub const MAX_PRICE_CENTS: i64 = 50_000;

/// Inclusive bounds for order item quantities.
pub const MIN_QUANTITY: i32 = 1;
pub const MAX_QUANTITY: i32 = 10;

/// Closed interval that generated timestamps are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SeedResult<Self> {
        if start >= end {
            return Err(SeedError::Config(format!(
                "time window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window from midnight UTC of `start` until now.
    pub fn since(start: NaiveDate) -> SeedResult<Self> {
        let start = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| SeedError::Config(format!("invalid start date {start}")))?
            .and_utc();
        Self::new(start, Utc::now())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Uniform sample at whole-second resolution.
    ///
    /// Only whole seconds inside `[start, end]` are drawn; a window too
    /// narrow to contain one yields `start`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> DateTime<Utc> {
        let first = self.start.timestamp() + i64::from(self.start.timestamp_subsec_nanos() > 0);
        let last = self.end.timestamp();
        if first > last {
            return self.start;
        }
        let ts = rng.gen_range(first..=last);
        DateTime::from_timestamp(ts, 0).unwrap_or(self.start)
    }
}

/// Produces rows for a range of 0-based row indexes.
///
/// All randomness comes from one `StdRng`, so a seeded generator yields the
/// same rows as long as ranges are requested in the same order.
pub struct RowGenerator {
    rng: StdRng,
    window: TimeWindow,
}

impl RowGenerator {
    pub fn new(window: TimeWindow, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, window }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn users(&mut self, range: Range<u64>) -> Vec<NewUser> {
        range
            .map(|index| NewUser {
                email: format!("user{}@example.com", index + 1),
                created_at: self.window.sample(&mut self.rng),
            })
            .collect()
    }

    pub fn products(&mut self, range: Range<u64>) -> Vec<NewProduct> {
        range
            .map(|index| NewProduct {
                name: format!("Product {}", index + 1),
                price: random_price(&mut self.rng),
            })
            .collect()
    }

    /// Orders referencing users in `[1, user_count]`. `user_count` must be non-zero.
    pub fn orders(&mut self, range: Range<u64>, user_count: u64) -> Vec<NewOrder> {
        range
            .map(|_| NewOrder {
                user_id: random_id(&mut self.rng, user_count),
                status: OrderStatus::Completed,
                created_at: self.window.sample(&mut self.rng),
            })
            .collect()
    }

    /// Items referencing orders in `[1, order_count]` and products in
    /// `[1, product_count]`. Both counts must be non-zero.
    pub fn order_items(
        &mut self,
        range: Range<u64>,
        order_count: u64,
        product_count: u64,
    ) -> Vec<NewOrderItem> {
        range
            .map(|_| NewOrderItem {
                order_id: random_id(&mut self.rng, order_count),
                product_id: random_id(&mut self.rng, product_count),
                quantity: self.rng.gen_range(MIN_QUANTITY..=MAX_QUANTITY),
                price: random_price(&mut self.rng),
            })
            .collect()
    }
}

fn random_id<R: Rng>(rng: &mut R, count: u64) -> i64 {
    rng.gen_range(1..=i64::try_from(count).unwrap_or(i64::MAX))
}

fn random_price<R: Rng>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(0..=MAX_PRICE_CENTS), 2)
}
