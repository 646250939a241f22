//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_MESSAGE: &str = "message";

// Record identity
pub const FIELD_MODEL: &str = "model";
pub const FIELD_PK: &str = "pk";

// Change payload: JSON object of field -> {old, new}
pub const FIELD_CHANGES: &str = "changes";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical operation names
pub const OP_OBJ_UPDATE: &str = "obj_update";
pub const OP_OBJ_UPDATE_OR_CREATE: &str = "obj_update_or_create";

// Canonical event names
pub const EVENT_UPDATED: &str = "updated";
pub const EVENT_CREATED: &str = "created";
pub const EVENT_END_ERROR: &str = "end_error";

/// Rendering of a null old/new value in human-readable summaries
pub const NULL_REPR: &str = "None";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_MODEL.is_empty());
        assert!(!FIELD_PK.is_empty());
        assert!(!FIELD_CHANGES.is_empty());
        assert!(!EVENT_UPDATED.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_UPDATED, EVENT_CREATED);
        assert_ne!(EVENT_UPDATED, EVENT_END_ERROR);
        assert_ne!(EVENT_CREATED, EVENT_END_ERROR);
    }

    #[test]
    fn test_op_names_are_distinct() {
        assert_ne!(OP_OBJ_UPDATE, OP_OBJ_UPDATE_OR_CREATE);
    }
}
