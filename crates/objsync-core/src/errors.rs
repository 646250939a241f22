use thiserror::Error;

/// Result type alias using ObjSyncError
pub type Result<T> = std::result::Result<T, ObjSyncError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Schema
    UnknownField,

    // Input
    InvalidInput,
    NotFound,
    AmbiguousSelection,

    // Write contract
    /// Unsaved record asked to write a constrained field set
    InvariantViolation,

    // Integration/IO
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownField => "ERR_UNKNOWN_FIELD",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousSelection => "ERR_AMBIGUOUS_SELECTION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Structured representation of an error with classification fields for
/// programmatic handling and record context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    model: Option<String>,
    field: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            model: None,
            field: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add model (record type) context
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the model context, if any
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Get the field context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(model) = &self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for change detection and conditional persistence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjSyncError {
    /// The field name has no descriptor on the record's model
    #[error("Unknown field '{field}' on model {model}")]
    UnknownField { model: String, field: String },

    /// The model has no schema
    #[error("Unknown model {model}")]
    UnknownModel { model: String },

    /// A record without a primary key was asked to write a constrained field set
    #[error("Cannot write fields {fields:?} of unsaved {model}: first write must include every field")]
    UnsavedPartialWrite { model: String, fields: Vec<String> },

    /// A value cannot be stored in the field's column type
    #[error("Invalid value for {model}.{field}: {reason}")]
    InvalidValue {
        model: String,
        field: String,
        reason: String,
    },

    /// No record with the given primary key
    #[error("{model} not found: {pk}")]
    RecordNotFound { model: String, pk: String },

    /// A lookup that must match at most one record matched several
    #[error("Lookup on {model} matched {count} records")]
    MultipleRecords { model: String, count: usize },

    /// Failure reported by the storage collaborator
    #[error("Persistence failure in {op}: {message}")]
    Persistence { op: String, message: String },
}

/// Conversion from ObjSyncError to ExError
impl From<ObjSyncError> for ExError {
    fn from(err: ObjSyncError) -> Self {
        match err {
            ObjSyncError::UnknownField { model, field } => {
                ExError::new(ExErrorKind::UnknownField)
                    .with_model(model)
                    .with_field(field)
                    .with_message("Field has no descriptor")
            }

            ObjSyncError::UnknownModel { model } => ExError::new(ExErrorKind::UnknownField)
                .with_model(model)
                .with_message("Model has no schema"),

            ObjSyncError::UnsavedPartialWrite { model, fields } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_op("persist")
                    .with_model(model)
                    .with_message(format!(
                        "Unsaved record cannot write a constrained field set ({} fields)",
                        fields.len()
                    ))
            }

            ObjSyncError::InvalidValue {
                model,
                field,
                reason,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_model(model)
                .with_field(field)
                .with_message(reason),

            ObjSyncError::RecordNotFound { model, pk } => ExError::new(ExErrorKind::NotFound)
                .with_model(model)
                .with_message(format!("No record with pk {}", pk)),

            ObjSyncError::MultipleRecords { model, count } => {
                ExError::new(ExErrorKind::AmbiguousSelection)
                    .with_model(model)
                    .with_message(format!("Lookup matched {} records", count))
            }

            ObjSyncError::Persistence { op, message } => ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::UnknownField, "ERR_UNKNOWN_FIELD"),
            (ExErrorKind::InvariantViolation, "ERR_INVARIANT_VIOLATION"),
            (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::UnknownField)
            .with_op("obj_update")
            .with_model("FooModel")
            .with_field("nope");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_UNKNOWN_FIELD]"));
        assert!(rendered.contains("obj_update"));
        assert!(rendered.contains("FooModel"));
        assert!(rendered.contains("nope"));
    }
}
