pub mod backends;
pub mod database;
pub mod observers;

pub use backends::{BindLimitedBackend, PacedBackend};
pub use database::{cleanup_database, setup_database};
pub use observers::{BatchRecorder, FailingObserver};
