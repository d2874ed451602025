//! E-commerce Seed Module
//!
//! This module populates a relational database with synthetic users, products,
//! orders and order items. Rows are generated in memory in bounded batches and
//! submitted as one bulk insert per batch, stage by stage in foreign-key order.

pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod observer;
pub mod seeder;

pub use backend::{InsertBackend, MemoryBackend, PoolConfig, PostgresBackend, StoredRow};
pub use batch::BatchPlan;
pub use config::SeedConfig;
pub use error::{SeedError, SeedResult};
pub use generator::{RowGenerator, TimeWindow};
pub use model::{NewOrder, NewOrderItem, NewProduct, NewUser, OrderStatus, RowBatch, Table};
pub use observer::SeedObserver;
pub use seeder::{DatasetConfig, SeedReport, Seeder, StageReport};
