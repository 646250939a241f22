//! ObjSync Store - SQLite persistence for objsync records
//!
//! Provides:
//! - Connection helpers
//! - Column codec between `objsync_core::Value` and SQLite values
//! - `SqliteStore`, implementing the updater's `Persist` and
//!   `FindOrCreate` capabilities with one table per model

pub mod codec;
pub mod db;
pub mod errors;
pub mod sqlite;

// Re-export key types
pub use errors::Result;
pub use sqlite::SqliteStore;
