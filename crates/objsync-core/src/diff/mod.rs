//! Field-level change detection.
//!
//! ## Entry point
//!
//! ```
//! use objsync_core::diff::Differ;
//! use objsync_core::model::{DynRecord, FieldType, ModelSchema, Value};
//!
//! let schema = ModelSchema::new("FooModel").field("text", FieldType::Text);
//! let mut record = DynRecord::new("FooModel");
//! let change = Differ::new(&schema)
//!     .compare(&mut record, "text", Value::from("hello"))
//!     .unwrap();
//! assert!(change.is_some());
//! ```
//!
//! ## Equivalence rules
//!
//! - **Reference**: equal when both null or both identify the same pk.
//! - **Timestamp**: native values render as ISO-8601 (`Z` for zero offset);
//!   text has a space separator read as `T`; then exact string equality.
//! - **Scalar**: exact equality of display strings.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{canonical_repr, compare_resolved, Differ};
pub use model::{ChangeSet, FieldChange};
