//! Field metadata: column types, equivalence kinds, and descriptor lookup.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::value::{Reference, Timestamp, Value};
use crate::errors::{ObjSyncError, Result};

/// Suffix addressing a reference field by its raw identifier
pub const ID_SUFFIX: &str = "_id";

/// Equivalence rule family for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Denotes another record; compared by identifier
    Reference,
    /// Date-time; compared by normalized ISO rendering
    Timestamp,
    /// Everything else; compared by display string
    Scalar,
}

/// How a field was addressed in a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    /// The field itself (`foreignkey`)
    Entity,
    /// The raw identifier of a reference field (`foreignkey_id`)
    Identifier,
}

/// Column type of a field as the storage layer sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Decimal {
        max_digits: u32,
        decimal_places: u32,
    },
    Boolean,
    DateTime {
        /// Refreshed by the store on every write
        auto_now: bool,
        /// Set by the store on insert
        auto_now_add: bool,
    },
    ForeignKey {
        /// Model name of the referenced record
        to: String,
    },
}

impl FieldType {
    /// Plain date-time column with no storage-maintained behaviour
    pub fn datetime() -> Self {
        FieldType::DateTime {
            auto_now: false,
            auto_now_add: false,
        }
    }

    pub fn decimal(max_digits: u32, decimal_places: u32) -> Self {
        FieldType::Decimal {
            max_digits,
            decimal_places,
        }
    }

    pub fn foreign_key(to: impl Into<String>) -> Self {
        FieldType::ForeignKey { to: to.into() }
    }

    /// Equivalence kind used by the differ
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldType::ForeignKey { .. } => FieldKind::Reference,
            FieldType::DateTime { .. } => FieldKind::Timestamp,
            _ => FieldKind::Scalar,
        }
    }

    /// Convert an incoming value to the representation stored in this column
    ///
    /// Null is accepted by every column type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the value cannot be represented in the column.
    pub fn coerce(&self, model: &str, field: &str, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let invalid = |reason: String| ObjSyncError::InvalidValue {
            model: model.to_string(),
            field: field.to_string(),
            reason,
        };

        match self {
            FieldType::Text => match value {
                Value::Ref(_) => Err(invalid("reference stored in text column".to_string())),
                other => Ok(Value::Text(other.to_string())),
            },

            FieldType::Integer => match value {
                Value::Int(i) => Ok(Value::Int(i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                Value::Float(x) if x.fract() == 0.0 => x
                    .to_i64()
                    .map(Value::Int)
                    .ok_or_else(|| invalid(format!("{} out of range", x))),
                Value::Decimal(d) if d.fract().is_zero() => d
                    .to_i64()
                    .map(Value::Int)
                    .ok_or_else(|| invalid(format!("{} out of range", d))),
                Value::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| invalid(format!("'{}': {}", s, e))),
                other => Err(invalid(format!("'{}' is not an integer", other))),
            },

            FieldType::Float => match value {
                Value::Float(x) => Ok(Value::Float(x)),
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Decimal(d) => d
                    .to_f64()
                    .map(Value::Float)
                    .ok_or_else(|| invalid(format!("{} out of range", d))),
                Value::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|e| invalid(format!("'{}': {}", s, e))),
                other => Err(invalid(format!("'{}' is not a float", other))),
            },

            FieldType::Decimal {
                max_digits,
                decimal_places,
            } => {
                let d = match value {
                    Value::Decimal(d) => d,
                    Value::Int(i) => Decimal::from(i),
                    // shortest round-trip rendering, so 1.01 stays 1.01
                    Value::Float(x) => Decimal::from_str(&x.to_string())
                        .map_err(|e| invalid(format!("{}: {}", x, e)))?,
                    Value::Text(s) => Decimal::from_str(s.trim())
                        .map_err(|e| invalid(format!("'{}': {}", s, e)))?,
                    other => return Err(invalid(format!("'{}' is not a decimal", other))),
                };
                let rounded = d.round_dp(*decimal_places);
                let int_digits = max_digits.saturating_sub(*decimal_places);
                if exceeds_integer_digits(&rounded, int_digits) {
                    return Err(invalid(format!(
                        "{} has more than {} integer digits",
                        rounded, int_digits
                    )));
                }
                Ok(Value::Decimal(rounded))
            }

            FieldType::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(b)),
                Value::Int(0) => Ok(Value::Bool(false)),
                Value::Int(1) => Ok(Value::Bool(true)),
                Value::Text(s) => match s.trim() {
                    "true" | "True" | "1" => Ok(Value::Bool(true)),
                    "false" | "False" | "0" => Ok(Value::Bool(false)),
                    _ => Err(invalid(format!("'{}' is not a boolean", s))),
                },
                other => Err(invalid(format!("'{}' is not a boolean", other))),
            },

            FieldType::DateTime { .. } => match value {
                Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
                Value::Text(s) => parse_timestamp(&s)
                    .map(Value::Timestamp)
                    .ok_or_else(|| invalid(format!("'{}' is not a date-time", s))),
                other => Err(invalid(format!("'{}' is not a date-time", other))),
            },

            FieldType::ForeignKey { to } => match value {
                Value::Ref(reference) => Ok(Value::Ref(reference)),
                other => other
                    .as_record_id()
                    .map(|pk| Value::Ref(Reference::new(to.clone(), pk)))
                    .ok_or_else(|| invalid(format!("'{}' is not an identifier", other))),
            },
        }
    }
}

fn exceeds_integer_digits(d: &Decimal, int_digits: u32) -> bool {
    let mut limit = Decimal::ONE;
    for _ in 0..int_digits {
        match limit.checked_mul(Decimal::TEN) {
            Some(next) => limit = next,
            None => return false,
        }
    }
    d.abs() >= limit
}

/// Parse date-time text, accepting a space or `T` separator and an optional offset
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let normalized = text.trim().replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(Timestamp::Aware(dt));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(Timestamp::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Timestamp::Naive)
}

/// Declared field on a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
}

/// Field metadata resolved for one lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Model the field belongs to
    pub model: String,
    /// Name as requested (`foreignkey` or `foreignkey_id`)
    pub name: String,
    /// Declared field name backing the request
    pub column: String,
    pub field_type: FieldType,
    pub kind: FieldKind,
    pub access: FieldAccess,
}

/// Declared fields of one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field, replacing an earlier declaration of the same name
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.field_type = field_type,
            None => self.fields.push(FieldDef { name, field_type }),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve a field name, including the `<reference>_id` identifier form
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if no declared field answers to `name`.
    pub fn describe(&self, name: &str) -> Result<FieldDescriptor> {
        if let Some(def) = self.get(name) {
            return Ok(self.descriptor(name, def, FieldAccess::Entity));
        }
        if let Some(def) = name
            .strip_suffix(ID_SUFFIX)
            .and_then(|base| self.get(base))
            .filter(|def| def.field_type.kind() == FieldKind::Reference)
        {
            return Ok(self.descriptor(name, def, FieldAccess::Identifier));
        }
        Err(ObjSyncError::UnknownField {
            model: self.name.clone(),
            field: name.to_string(),
        })
    }

    fn descriptor(&self, name: &str, def: &FieldDef, access: FieldAccess) -> FieldDescriptor {
        FieldDescriptor {
            model: self.name.clone(),
            name: name.to_string(),
            column: def.name.clone(),
            field_type: def.field_type.clone(),
            kind: def.field_type.kind(),
            access,
        }
    }
}

/// Field descriptor lookup capability
pub trait FieldLookup {
    /// Describe `field` on `model`
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if the model or field does not exist.
    fn describe(&self, model: &str, field: &str) -> Result<FieldDescriptor>;
}

/// Registry of model schemas
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: BTreeMap<String, ModelSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::register`]
    pub fn with_model(mut self, model: ModelSchema) -> Self {
        self.register(model);
        self
    }

    pub fn register(&mut self, model: ModelSchema) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn model(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.values()
    }
}

impl FieldLookup for Schema {
    fn describe(&self, model: &str, field: &str) -> Result<FieldDescriptor> {
        self.models
            .get(model)
            .ok_or_else(|| ObjSyncError::UnknownField {
                model: model.to_string(),
                field: field.to_string(),
            })?
            .describe(field)
    }
}

impl FieldLookup for ModelSchema {
    fn describe(&self, model: &str, field: &str) -> Result<FieldDescriptor> {
        if model != self.name {
            return Err(ObjSyncError::UnknownField {
                model: model.to_string(),
                field: field.to_string(),
            });
        }
        ModelSchema::describe(self, field)
    }
}
