use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Primary key of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

/// A value denoting another record, compared by identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Model name of the referenced record
    pub model: String,
    /// Primary key of the referenced record
    pub pk: RecordId,
}

impl Reference {
    pub fn new(model: impl Into<String>, pk: impl Into<RecordId>) -> Self {
        Self {
            model: model.into(),
            pk: pk.into(),
        }
    }
}

/// A native date-time, with or without a UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// ISO-8601 rendering with a zero offset written as `Z`
    ///
    /// The fractional part is omitted when the sub-second part is zero,
    /// written with 6 digits when microsecond aligned, 9 digits otherwise.
    pub fn to_iso(&self) -> String {
        match self {
            Timestamp::Naive(dt) => naive_iso(dt),
            Timestamp::Aware(dt) => {
                let mut out = naive_iso(&dt.naive_local());
                out.push_str(&offset_suffix(dt.offset().local_minus_utc()));
                out
            }
        }
    }
}

fn naive_iso(dt: &NaiveDateTime) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    // leap seconds carry nanos past one second
    let nanos = dt.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        if nanos % 1_000 == 0 {
            out.push_str(&format!(".{:06}", nanos / 1_000));
        } else {
            out.push_str(&format!(".{:09}", nanos));
        }
    }
    out
}

fn offset_suffix(seconds: i32) -> String {
    if seconds == 0 {
        return "Z".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let (hours, minutes, secs) = (abs / 3600, (abs % 3600) / 60, abs % 60);
    if secs == 0 {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

/// A dynamically typed field value
///
/// Incoming update values and stored record values share this type, so the
/// same field may hold different representations of one logical value
/// (text vs. native timestamp, float vs. decimal, reference vs. raw id).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(Timestamp),
    Ref(Reference),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text of a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret this value as a record identifier
    ///
    /// References yield their pk; integers and text are taken as raw ids.
    pub fn as_record_id(&self) -> Option<RecordId> {
        match self {
            Value::Int(id) => Some(RecordId::Int(*id)),
            Value::Text(id) => Some(RecordId::Text(id.clone())),
            Value::Ref(reference) => Some(reference.pk.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&float_repr(*x)),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => f.write_str(&ts.to_iso()),
            Value::Ref(reference) => write!(f, "{}", reference.pk),
        }
    }
}

/// Shortest round-trip rendering of a float that always reads as a float
///
/// Whole values keep a `.0` suffix (`1.0`), and magnitudes outside
/// `[1e-4, 1e16)` use exponent form with a signed two-digit exponent
/// (`1e+16`, `1.5e-05`).
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if x == 0.0 || (1e-4..1e16).contains(&x.abs()) {
        let fixed = x.to_string();
        return if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        };
    }
    let sci = format!("{:e}", x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::Timestamp(Timestamp::Naive(dt))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(Timestamp::Aware(dt))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Timestamp(Timestamp::Aware(dt.fixed_offset()))
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Value::Ref(reference)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Int(i) => Value::Int(i),
            RecordId::Text(s) => Value::Text(s),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
