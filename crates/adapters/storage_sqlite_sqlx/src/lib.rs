//! `SQLite` storage adapter for the reading repository port.
//!
//! The single production implementation of
//! [`ReadingRepository`](cems_app::ports::storage::ReadingRepository).
//! Downstream consumers (report generation, dashboards) read these tables
//! through the same port and never touch the collection logic.

mod error;
mod pool;
mod reading_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use reading_repo::SqliteReadingRepository;
