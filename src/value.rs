//! Raw column values and typed extraction.

use crate::error::DecodeErrorKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;

/// A single column value as delivered by a row source.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the value's kind, used in decode error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BYTES",
            Value::Decimal(_) => "DECIMAL",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Mismatch error for converting this value into `expected`.
    pub(crate) fn mismatch(&self, expected: &'static str) -> DecodeErrorKind {
        DecodeErrorKind::TypeMismatch {
            expected,
            found: self.type_name(),
            data: self.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
        }
    }
}

/// Types that can be extracted from a non-NULL [`Value`].
///
/// NULL handling belongs to the caller: [`crate::decode::column`] maps NULL
/// to `None` and [`crate::decode::required`] rejects it.
pub trait FromValue: Sized {
    /// Target type name for error messages.
    const TYPE_NAME: &'static str;

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        Ok(value)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| DecodeErrorKind::OutOfRange {
                            expected: Self::TYPE_NAME,
                            data: v.to_string(),
                        }),
                        other => Err(other.mismatch(Self::TYPE_NAME)),
                    }
                }
            }
        )*
    };
}

narrow_int!(i16 => "i16", i32 => "i32");

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for Decimal {
    const TYPE_NAME: &'static str = "Decimal";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Int(v) => Ok(Decimal::from(v)),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for NaiveDate {
    const TYPE_NAME: &'static str = "NaiveDate";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Date(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for NaiveTime {
    const TYPE_NAME: &'static str = "NaiveTime";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Time(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

impl FromValue for NaiveDateTime {
    const TYPE_NAME: &'static str = "NaiveDateTime";

    fn from_value(value: Value) -> Result<Self, DecodeErrorKind> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(other.mismatch(Self::TYPE_NAME)),
        }
    }
}

// Implement From traits for Value
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// JSON fixtures: numbers become `Int` when they fit, arrays and objects
/// are kept as their JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}
