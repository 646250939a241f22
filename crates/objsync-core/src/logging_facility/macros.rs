//! Canonical logging macros
//!
//! These macros keep the shape of change events consistent across sinks.

/// Log a record whose fields changed
///
/// `$pk` is an `Option<&str>`; `None` omits the field. `$changes` is
/// recorded with its `Display` form (the JSON change map).
///
/// # Example
///
/// ```
/// # use objsync_core::log_record_updated;
/// log_record_updated!("obj_update", "FooModel", Some("1"), "{}", "[text a->b]");
/// ```
#[macro_export]
macro_rules! log_record_updated {
    ($op:expr, $model:expr, $pk:expr, $changes:expr, $summary:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::objsync_core_types::schema::EVENT_UPDATED,
            model = $model,
            pk = $pk,
            changes = %$changes,
            "{}",
            $summary
        );
    };
}

/// Log a newly created record
///
/// # Example
///
/// ```
/// # use objsync_core::log_record_created;
/// log_record_created!("obj_update_or_create", "FooModel", Some("1"));
/// ```
#[macro_export]
macro_rules! log_record_created {
    ($op:expr, $model:expr, $pk:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::objsync_core_types::schema::EVENT_CREATED,
            model = $model,
            pk = $pk,
            "CREATED {} {}",
            $model,
            $pk.unwrap_or($crate::objsync_core_types::schema::NULL_REPR)
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use objsync_core::{log_op_error, errors::ObjSyncError};
/// let err = ObjSyncError::UnknownField {
///     model: "FooModel".to_string(),
///     field: "nope".to_string(),
/// };
/// log_op_error!("obj_update", err, model = "FooModel");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::objsync_core_types::schema::EVENT_END_ERROR,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            "{}",
            ex_err
        );
    }};
    ($op:expr, $err:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::objsync_core_types::schema::EVENT_END_ERROR,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($field)*,
            "{}",
            ex_err
        );
    }};
}
