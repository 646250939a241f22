//! Error handling for objsync-store
//!
//! Maps SQLite failures onto objsync-core's `Persistence` error

use objsync_core::{ObjSyncError, RecordId};

/// Result type alias using ObjSyncError
pub use objsync_core::errors::Result;

/// Wrap a rusqlite::Error raised during `op`
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> ObjSyncError {
    ObjSyncError::Persistence {
        op: op.to_string(),
        message: err.to_string(),
    }
}

/// `map_err` adapter for [`from_rusqlite`]
pub fn sqlite_error(op: &'static str) -> impl Fn(rusqlite::Error) -> ObjSyncError {
    move |err| from_rusqlite(op, err)
}

/// A constrained update that matched no row
pub fn no_rows_affected(model: &str, pk: &RecordId) -> ObjSyncError {
    ObjSyncError::Persistence {
        op: "update".to_string(),
        message: format!(
            "Save with update_fields did not affect any rows ({} {})",
            model, pk
        ),
    }
}

/// A stored column that cannot be read back as its declared type
pub fn corrupt_column(model: &str, field: &str, reason: impl Into<String>) -> ObjSyncError {
    ObjSyncError::InvalidValue {
        model: model.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}
