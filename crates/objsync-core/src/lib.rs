//! ObjSync Core - field-level change detection and conditional persistence
//!
//! This crate provides:
//! - A dynamic value model and model schemas with typed field descriptors
//! - The differ: per-kind equivalence rules (reference, timestamp, scalar)
//! - The updater: apply a request, log one change event, persist only dirty fields
//! - Upsert: find-or-create followed by a conditional update
//! - Storage capability traits and an in-memory store
//!
//! ```
//! use objsync_core::{
//!     MemoryStore, ModelSchema, FieldType, Schema, UpdateOptions, UpdateRequest, Updater,
//! };
//!
//! let schema = Schema::new().with_model(ModelSchema::new("FooModel").field("text", FieldType::Text));
//! let mut store = MemoryStore::new(schema.clone());
//! let mut record = store
//!     .create("FooModel", &UpdateRequest::new().set("text", "a"))
//!     .unwrap();
//!
//! let updater = Updater::new(&schema);
//! let request = UpdateRequest::new().set("text", "a");
//! assert!(!updater.apply(&mut store, &mut record, &request, &UpdateOptions::default()).unwrap());
//! ```

pub use objsync_core_types;

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod store;
pub mod update;

// Re-export commonly used types
pub use diff::{ChangeSet, Differ, FieldChange};
pub use errors::{ExError, ExErrorKind, ObjSyncError, Result};
pub use logging_facility::{ChangeLog, NoopChangeLog, TracingChangeLog};
pub use model::{
    DynRecord, FieldDef, FieldDescriptor, FieldKind, FieldLookup, FieldType, ModelSchema, Record,
    RecordId, Reference, Schema, Timestamp, Value,
};
pub use store::{FindOrCreate, MemoryStore, Persist, WriteSet};
pub use update::{UpdateFields, UpdateOptions, UpdateRequest, Updater, UpsertOutcome, UpsertUpdater};
