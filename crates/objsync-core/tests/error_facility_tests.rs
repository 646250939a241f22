use objsync_core::errors::{ExError, ExErrorKind, ObjSyncError};

#[test]
fn test_unknown_field_verifiable_by_kind() {
    let err = ObjSyncError::UnknownField {
        model: "FooModel".to_string(),
        field: "nope".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::UnknownField);
    assert_eq!(ex_err.code(), "ERR_UNKNOWN_FIELD");
    assert_eq!(ex_err.model(), Some("FooModel"));
    assert_eq!(ex_err.field(), Some("nope"));
}

#[test]
fn test_unknown_model_shares_unknown_field_kind() {
    let ex_err: ExError = ObjSyncError::UnknownModel {
        model: "Nope".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::UnknownField);
    assert_eq!(ex_err.field(), None);
}

#[test]
fn test_unsaved_partial_write_is_invariant_violation() {
    let err = ObjSyncError::UnsavedPartialWrite {
        model: "FooModel".to_string(),
        fields: vec![],
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvariantViolation);
    assert_eq!(ex_err.code(), "ERR_INVARIANT_VIOLATION");
    assert_eq!(ex_err.op(), Some("persist"));
    assert_ne!(ex_err.kind(), ExErrorKind::Persistence);
}

#[test]
fn test_persistence_keeps_operation_and_message() {
    let err = ObjSyncError::Persistence {
        op: "update".to_string(),
        message: "disk full".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Persistence);
    assert_eq!(ex_err.op(), Some("update"));
    assert_eq!(ex_err.message(), "disk full");
    assert_eq!(
        ex_err.to_string(),
        "[ERR_PERSISTENCE] in operation 'update': disk full"
    );
}

#[test]
fn test_lookup_errors_are_distinct() {
    let not_found: ExError = ObjSyncError::RecordNotFound {
        model: "FooModel".to_string(),
        pk: "3".to_string(),
    }
    .into();
    let ambiguous: ExError = ObjSyncError::MultipleRecords {
        model: "FooModel".to_string(),
        count: 2,
    }
    .into();

    assert_eq!(not_found.kind(), ExErrorKind::NotFound);
    assert_eq!(ambiguous.kind(), ExErrorKind::AmbiguousSelection);
    assert!(ambiguous.message().contains('2'));
}

#[test]
fn test_invalid_value_maps_to_invalid_input() {
    let ex_err: ExError = ObjSyncError::InvalidValue {
        model: "FooModel".to_string(),
        field: "decimal".to_string(),
        reason: "'abc' is not a decimal".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.field(), Some("decimal"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::UnknownField, "ERR_UNKNOWN_FIELD"),
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::AmbiguousSelection, "ERR_AMBIGUOUS_SELECTION"),
        (ExErrorKind::InvariantViolation, "ERR_INVARIANT_VIOLATION"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, code) in kinds {
        assert_eq!(kind.code(), code);
        assert!(seen.insert(code), "Duplicate code {}", code);
    }
}
