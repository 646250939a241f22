pub mod record;
pub mod schema;
pub mod value;

pub use record::{DynRecord, Record};
pub use schema::{
    FieldAccess, FieldDef, FieldDescriptor, FieldKind, FieldLookup, FieldType, ModelSchema,
    Schema,
};
pub use value::{RecordId, Reference, Timestamp, Value};
