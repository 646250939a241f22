use std::collections::BTreeMap;

use super::schema::{FieldAccess, FieldDescriptor, FieldType};
use super::value::{RecordId, Reference, Value};

/// An addressable, mutable record with named, typed fields
///
/// The record is owned by the caller; change detection only reads and
/// writes fields in place through the resolved descriptor.
pub trait Record {
    /// Name of the record's model (its type)
    fn model_name(&self) -> &str;

    /// Primary key, `None` until first persisted
    fn pk(&self) -> Option<RecordId>;

    /// Current value of the described field (`Value::Null` when unset)
    fn get(&self, field: &FieldDescriptor) -> Value;

    /// Overwrite the described field in memory
    fn set(&mut self, field: &FieldDescriptor, value: Value);

    /// Record the identity assigned by the storage layer on first insert
    fn set_pk(&mut self, pk: RecordId);
}

/// A record whose fields live in a column map
///
/// Reference columns hold a `Value::Ref`; identifier access reads and
/// writes the referenced pk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynRecord {
    model: String,
    pk: Option<RecordId>,
    values: BTreeMap<String, Value>,
}

impl DynRecord {
    /// Create an unsaved record with no field values
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            pk: None,
            values: BTreeMap::new(),
        }
    }

    /// Rebuild a persisted record from stored columns
    pub fn from_parts(
        model: impl Into<String>,
        pk: Option<RecordId>,
        values: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            model: model.into(),
            pk,
            values,
        }
    }

    /// Raw column value, bypassing descriptor resolution
    pub fn column(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    /// Overwrite a raw column value
    pub fn set_column(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    /// All column values in column-name order
    pub fn columns(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

impl Record for DynRecord {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn pk(&self) -> Option<RecordId> {
        self.pk.clone()
    }

    fn get(&self, field: &FieldDescriptor) -> Value {
        let value = self.column(&field.column);
        match field.access {
            FieldAccess::Entity => value.clone(),
            FieldAccess::Identifier => match value {
                Value::Ref(reference) => Value::from(reference.pk.clone()),
                other => other.clone(),
            },
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value) {
        let stored = match (field.access, &field.field_type) {
            (FieldAccess::Identifier, FieldType::ForeignKey { to }) => match value.as_record_id() {
                Some(pk) => Value::Ref(Reference::new(to.clone(), pk)),
                None => value,
            },
            _ => value,
        };
        self.values.insert(field.column.clone(), stored);
    }

    fn set_pk(&mut self, pk: RecordId) {
        self.pk = Some(pk);
    }
}
