//! Column codec between record values and SQLite values
//!
//! Decimals and timestamps are stored as TEXT (decimal display string and
//! ISO-8601 respectively), booleans as INTEGER 0/1, and references as the
//! referenced pk in a `<field>_id` column.

use objsync_core::model::schema::ID_SUFFIX;
use objsync_core::{FieldDef, FieldType, RecordId, Value};
use rusqlite::types::Value as SqlValue;

use crate::errors::{corrupt_column, Result};

/// Quote an SQL identifier
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Column holding a declared field
pub fn column_name(def: &FieldDef) -> String {
    match def.field_type {
        FieldType::ForeignKey { .. } => format!("{}{}", def.name, ID_SUFFIX),
        _ => def.name.clone(),
    }
}

/// SQLite column type (affinity) for a field type
pub fn column_type(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Integer | FieldType::Boolean | FieldType::ForeignKey { .. } => "INTEGER",
        FieldType::Float => "REAL",
        FieldType::Text | FieldType::Decimal { .. } | FieldType::DateTime { .. } => "TEXT",
    }
}

pub fn record_id_sql(pk: &RecordId) -> SqlValue {
    match pk {
        RecordId::Int(id) => SqlValue::Integer(*id),
        RecordId::Text(id) => SqlValue::Text(id.clone()),
    }
}

/// SQLite representation of a coerced column value
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(x) => SqlValue::Real(*x),
        Value::Decimal(d) => SqlValue::Text(d.to_string()),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Timestamp(ts) => SqlValue::Text(ts.to_iso()),
        Value::Ref(reference) => record_id_sql(&reference.pk),
    }
}

/// Read a stored column back as its declared field type
///
/// # Errors
///
/// Returns `InvalidValue` when the stored value does not parse as the
/// field's type (for instance a BLOB, or malformed decimal text).
pub fn from_sql(model: &str, def: &FieldDef, raw: SqlValue) -> Result<Value> {
    let loose = match raw {
        SqlValue::Null => return Ok(Value::Null),
        SqlValue::Integer(i) => Value::Int(i),
        SqlValue::Real(x) => Value::Float(x),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(_) => return Err(corrupt_column(model, &def.name, "unexpected BLOB")),
    };
    def.field_type.coerce(model, &def.name, loose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use objsync_core::Reference;

    fn def(name: &str, field_type: FieldType) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            field_type,
        }
    }

    #[test]
    fn test_foreign_key_column_name() {
        assert_eq!(
            column_name(&def("foreignkey", FieldType::foreign_key("BarModel"))),
            "foreignkey_id"
        );
        assert_eq!(column_name(&def("text", FieldType::Text)), "text");
    }

    #[test]
    fn test_quote_escapes_double_quotes() {
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_boolean_round_trip() {
        let d = def("flag", FieldType::Boolean);
        let stored = to_sql(&Value::Bool(true));
        assert_eq!(stored, SqlValue::Integer(1));
        assert_eq!(from_sql("M", &d, stored).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_reference_reads_back_as_reference() {
        let d = def("foreignkey", FieldType::foreign_key("BarModel"));
        let stored = to_sql(&Value::Ref(Reference::new("BarModel", 3)));
        assert_eq!(stored, SqlValue::Integer(3));
        assert_eq!(
            from_sql("FooModel", &d, stored).unwrap(),
            Value::Ref(Reference::new("BarModel", 3))
        );
    }

    #[test]
    fn test_blob_is_rejected() {
        let d = def("text", FieldType::Text);
        assert!(from_sql("FooModel", &d, SqlValue::Blob(vec![1])).is_err());
    }
}
