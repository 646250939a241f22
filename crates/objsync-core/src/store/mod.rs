//! Storage capabilities consumed by the updater, plus an in-memory store.
//!
//! The updater only ever talks to storage through [`Persist`] and
//! [`FindOrCreate`]. [`MemoryStore`] implements both over plain maps;
//! the `objsync-store` crate provides a SQLite implementation.

pub mod memory;

pub use memory::MemoryStore;

use chrono::Utc;

use crate::errors::{ObjSyncError, Result};
use crate::model::{FieldDef, FieldDescriptor, FieldType, ModelSchema, Record, Value};
use crate::update::UpdateRequest;

/// Fields a single write covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSet<'a> {
    /// Every declared field
    All,
    /// Only these fields (plus fields the store maintains itself)
    Fields(&'a [String]),
}

impl WriteSet<'_> {
    /// Whether the write is limited to a caller-chosen subset
    pub fn is_constrained(&self) -> bool {
        matches!(self, WriteSet::Fields(_))
    }
}

/// Apply-fields-and-persist capability
pub trait Persist<R: Record + ?Sized> {
    /// Write `fields` of `record`, assigning its pk on first insert
    ///
    /// # Errors
    ///
    /// Returns `UnsavedPartialWrite` when `record` has no pk and `fields`
    /// is constrained, `UnknownField` for undeclared names, and
    /// `Persistence` for storage failures.
    fn persist(&mut self, record: &mut R, fields: WriteSet<'_>) -> Result<()>;
}

/// Find-or-create capability
pub trait FindOrCreate<R: Record> {
    /// Find the single record matching `lookup`, or create one from
    /// `lookup` overlaid with `defaults`
    ///
    /// Returns the record and whether it was created. A found record
    /// reflects stored values; `defaults` are not applied to it.
    ///
    /// # Errors
    ///
    /// Returns `MultipleRecords` when the lookup is ambiguous, and any
    /// error of the underlying read or insert.
    fn find_or_create(
        &mut self,
        model: &str,
        lookup: &UpdateRequest,
        defaults: &UpdateRequest,
    ) -> Result<(R, bool)>;
}

/// Reject a constrained write on a record that was never persisted
///
/// # Errors
///
/// Returns `UnsavedPartialWrite` when `record` has no pk and `fields` is
/// constrained.
pub fn ensure_writable<R: Record + ?Sized>(record: &R, fields: WriteSet<'_>) -> Result<()> {
    match fields {
        WriteSet::Fields(names) if record.pk().is_none() => Err(ObjSyncError::UnsavedPartialWrite {
            model: record.model_name().to_string(),
            fields: names.to_vec(),
        }),
        _ => Ok(()),
    }
}

/// Declared fields covered by a write, in write order
///
/// Constrained writes list the named fields (deduplicated, `_id` names
/// mapped to their reference field) followed by every `auto_now` field.
///
/// # Errors
///
/// Returns `UnknownField` if a named field is not declared.
pub fn write_columns<'m>(model: &'m ModelSchema, fields: WriteSet<'_>) -> Result<Vec<&'m FieldDef>> {
    let names = match fields {
        WriteSet::All => return Ok(model.fields().iter().collect()),
        WriteSet::Fields(names) => names,
    };
    let mut columns: Vec<&FieldDef> = Vec::with_capacity(names.len());
    for name in names {
        let column = model.describe(name)?.column;
        push_unique(&mut columns, model, &column);
    }
    for def in model.fields() {
        if matches!(def.field_type, FieldType::DateTime { auto_now: true, .. }) {
            push_unique(&mut columns, model, &def.name);
        }
    }
    Ok(columns)
}

fn push_unique<'m>(columns: &mut Vec<&'m FieldDef>, model: &'m ModelSchema, name: &str) {
    if columns.iter().any(|c| c.name == name) {
        return;
    }
    if let Some(def) = model.get(name) {
        columns.push(def);
    }
}

/// Storage-maintained timestamps for one write
///
/// `auto_now` fields are stamped on every write, `auto_now_add` fields only
/// on insert. Stamps feed [`coerce_columns`] and reach the record through
/// [`AutoStamps::apply_to`] once the write has landed.
#[derive(Debug, Clone, Default)]
pub struct AutoStamps {
    stamps: Vec<(FieldDescriptor, Value)>,
}

impl AutoStamps {
    /// # Errors
    ///
    /// Returns `UnknownField` if the model's own fields fail to resolve.
    pub fn for_write(model: &ModelSchema, inserting: bool) -> Result<Self> {
        let now = Value::from(Utc::now());
        let mut stamps = Vec::new();
        for def in model.fields() {
            if let FieldType::DateTime {
                auto_now,
                auto_now_add,
            } = def.field_type
            {
                if auto_now || (inserting && auto_now_add) {
                    stamps.push((model.describe(&def.name)?, now.clone()));
                }
            }
        }
        Ok(Self { stamps })
    }

    pub fn value_for(&self, column: &str) -> Option<&Value> {
        self.stamps
            .iter()
            .find(|(descriptor, _)| descriptor.column == column)
            .map(|(_, value)| value)
    }

    pub fn apply_to<R: Record + ?Sized>(self, record: &mut R) {
        for (descriptor, value) in self.stamps {
            record.set(&descriptor, value);
        }
    }
}

/// Stored representation of each write column
///
/// Values come from `record`, except columns covered by `stamps`.
///
/// # Errors
///
/// Returns `InvalidValue` if a value does not fit its column type.
pub fn coerce_columns<R: Record + ?Sized>(
    model: &ModelSchema,
    record: &R,
    columns: &[&FieldDef],
    stamps: &AutoStamps,
) -> Result<Vec<(String, Value)>> {
    columns
        .iter()
        .map(|def| {
            let value = match stamps.value_for(&def.name) {
                Some(stamp) => stamp.clone(),
                None => record.get(&model.describe(&def.name)?),
            };
            let value = def.field_type.coerce(model.name(), &def.name, value)?;
            Ok((def.name.clone(), value))
        })
        .collect()
}

/// Stored representation of lookup values, keyed by declared field name
///
/// # Errors
///
/// Returns `UnknownField` or `InvalidValue` for unusable lookup entries.
pub fn coerce_lookup(model: &ModelSchema, lookup: &UpdateRequest) -> Result<Vec<(String, Value)>> {
    lookup
        .iter()
        .map(|(name, value)| {
            let descriptor = model.describe(name)?;
            let value = descriptor
                .field_type
                .coerce(model.name(), &descriptor.column, value.clone())?;
            Ok((descriptor.column, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DynRecord;

    fn foo() -> ModelSchema {
        ModelSchema::new("FooModel")
            .field("text", FieldType::Text)
            .field("foreignkey", FieldType::foreign_key("BarModel"))
            .field(
                "created",
                FieldType::DateTime {
                    auto_now: false,
                    auto_now_add: true,
                },
            )
            .field(
                "updated",
                FieldType::DateTime {
                    auto_now: true,
                    auto_now_add: false,
                },
            )
    }

    #[test]
    fn test_constrained_columns_append_auto_now() {
        let model = foo();
        let names = vec!["foreignkey_id".to_string(), "foreignkey".to_string()];
        let columns = write_columns(&model, WriteSet::Fields(&names)).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["foreignkey", "updated"]);
    }

    #[test]
    fn test_all_columns() {
        let model = foo();
        assert_eq!(write_columns(&model, WriteSet::All).unwrap().len(), 4);
    }

    #[test]
    fn test_unsaved_record_rejects_constrained_write() {
        let record = DynRecord::new("FooModel");
        let names = vec!["text".to_string()];
        let err = ensure_writable(&record, WriteSet::Fields(&names)).unwrap_err();
        assert!(matches!(err, ObjSyncError::UnsavedPartialWrite { .. }));
        assert!(ensure_writable(&record, WriteSet::All).is_ok());
    }

    #[test]
    fn test_stamp_insert_sets_both_timestamps() {
        let model = foo();
        let mut record = DynRecord::new("FooModel");
        AutoStamps::for_write(&model, true)
            .unwrap()
            .apply_to(&mut record);
        assert!(!record.column("created").is_null());
        assert!(!record.column("updated").is_null());
    }

    #[test]
    fn test_stamp_update_leaves_created() {
        let model = foo();
        let mut record = DynRecord::new("FooModel");
        AutoStamps::for_write(&model, false)
            .unwrap()
            .apply_to(&mut record);
        assert!(record.column("created").is_null());
        assert!(!record.column("updated").is_null());
    }
}
