//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

use crate::errors::{sqlite_error, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(sqlite_error("open"))
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(sqlite_error("open"))
}

/// Configure a connection for objsync tables
pub fn configure(conn: &Connection) -> Result<()> {
    // Enable foreign keys
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(sqlite_error("configure"))?;

    Ok(())
}
