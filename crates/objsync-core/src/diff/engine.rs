//! Per-field equivalence rules and the differ.
//!
//! Each field kind normalizes both operands to a canonical string; the
//! field is dirty when the normalized forms differ. Normalization is
//! intentionally shallow: timestamp text only has its date/time separator
//! unified (no sub-second or time-zone canonicalization), and scalars are
//! compared by display string only (`1.0` and `1` stay different).

use crate::diff::model::FieldChange;
use crate::errors::Result;
use crate::model::{FieldDescriptor, FieldKind, FieldLookup, Record, Value};

/// Canonical string form of `value` under the descriptor's equivalence rule
///
/// Returns `None` for null.
pub fn canonical_repr(field: &FieldDescriptor, value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let repr = match field.kind {
        // entity or raw identifier both reduce to the identifier
        FieldKind::Reference => match value {
            Value::Ref(reference) => reference.pk.to_string(),
            other => other.to_string(),
        },
        FieldKind::Timestamp => match value {
            Value::Timestamp(ts) => ts.to_iso(),
            other => other.to_string().replace(' ', "T"),
        },
        FieldKind::Scalar => value.to_string(),
    };
    Some(repr)
}

/// Compare a resolved field against a candidate, applying it on change
///
/// On a change the record's in-memory field is overwritten immediately.
pub fn compare_resolved<R: Record + ?Sized>(
    record: &mut R,
    field: &FieldDescriptor,
    candidate: Value,
) -> Option<FieldChange> {
    let old_repr = canonical_repr(field, &record.get(field));
    let new_repr = canonical_repr(field, &candidate);
    if old_repr == new_repr {
        return None;
    }
    record.set(field, candidate);
    Some(FieldChange::new(field.name.clone(), old_repr, new_repr))
}

/// Field-level differ backed by a descriptor lookup
pub struct Differ<'a> {
    lookup: &'a dyn FieldLookup,
}

impl<'a> Differ<'a> {
    pub fn new(lookup: &'a dyn FieldLookup) -> Self {
        Self { lookup }
    }

    /// Resolve the descriptor of `field` on the record's model
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if the model has no such field.
    pub fn resolve<R: Record + ?Sized>(&self, record: &R, field: &str) -> Result<FieldDescriptor> {
        self.lookup.describe(record.model_name(), field)
    }

    /// Compare the record's current value of `field` against `candidate`
    ///
    /// Returns the change when the values are not equivalent; the record
    /// then already holds `candidate`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if the model has no such field; the record is
    /// left untouched.
    pub fn compare<R: Record + ?Sized>(
        &self,
        record: &mut R,
        field: &str,
        candidate: Value,
    ) -> Result<Option<FieldChange>> {
        let descriptor = self.resolve(record, field)?;
        Ok(compare_resolved(record, &descriptor, candidate))
    }
}
