//! Change-log sinks injected into the updater.

use crate::diff::ChangeSet;
use crate::model::RecordId;
use crate::{log_record_created, log_record_updated};
use objsync_core_types::schema::{OP_OBJ_UPDATE, OP_OBJ_UPDATE_OR_CREATE};

/// Receiver of change and creation events
pub trait ChangeLog {
    /// One event per update call that changed at least one field
    fn record_updated(&self, model: &str, pk: Option<&RecordId>, changes: &ChangeSet);

    /// One event per record created by an upsert
    fn record_created(&self, model: &str, pk: Option<&RecordId>);
}

/// Emits change events through `tracing` at debug level
///
/// The event carries `model`, `pk` and `changes` (JSON object of
/// field -> {old, new}); its message is the `[field old->new]` summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChangeLog;

/// Process-wide default sink
pub static DEFAULT_CHANGE_LOG: TracingChangeLog = TracingChangeLog;

impl ChangeLog for TracingChangeLog {
    fn record_updated(&self, model: &str, pk: Option<&RecordId>, changes: &ChangeSet) {
        let pk = pk.map(ToString::to_string);
        log_record_updated!(
            OP_OBJ_UPDATE,
            model,
            pk.as_deref(),
            changes.to_json(),
            changes.human_summary()
        );
    }

    fn record_created(&self, model: &str, pk: Option<&RecordId>) {
        let pk = pk.map(ToString::to_string);
        log_record_created!(OP_OBJ_UPDATE_OR_CREATE, model, pk.as_deref());
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangeLog;

impl ChangeLog for NoopChangeLog {
    fn record_updated(&self, _model: &str, _pk: Option<&RecordId>, _changes: &ChangeSet) {}

    fn record_created(&self, _model: &str, _pk: Option<&RecordId>) {}
}
