//! Single-column decoders.

use super::{Composer, one_column};
use crate::code::{CodeProperty, CodeTable, value_of_code};
use crate::error::{DecodeErrorKind, RowError, RowResult};
use crate::source::Row;
use crate::value::{FromValue, Value};
use chrono::Month;
use num_bigint::BigInt;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

/// Read `column` as a `T`. NULL is `None`; any other kind of value than
/// `T` accepts is a decode failure.
pub fn get<T: FromValue>(row: &dyn Row, column: usize) -> RowResult<Option<T>> {
    match row.value(column)? {
        Value::Null => Ok(None),
        value => T::from_value(value)
            .map(Some)
            .map_err(|kind| RowError::decode(column, kind)),
    }
}

/// Nullable typed column.
pub fn column<T: FromValue>() -> impl Composer<Option<T>> + Clone + Send + Sync {
    one_column(|row: &dyn Row, at: usize| get::<T>(row, at))
}

/// Non-nullable typed column: NULL is [`DecodeErrorKind::UnexpectedNull`].
pub fn required<T: FromValue>() -> impl Composer<T> + Clone + Send + Sync {
    one_column(|row: &dyn Row, at: usize| match get::<T>(row, at)? {
        Some(value) => Ok(value),
        None => Err(RowError::decode(
            at,
            DecodeErrorKind::UnexpectedNull {
                expected: T::TYPE_NAME,
            },
        )),
    })
}

/// Any numeric column narrowed to `i32`, fractions truncated.
///
/// Aggregates such as `COUNT(*)` come back as different numeric kinds
/// depending on the driver.
pub fn int_value() -> impl Composer<Option<i32>> + Clone + Send + Sync {
    one_column(|row: &dyn Row, at: usize| {
        let value = row.value(at)?;
        let narrowed = match &value {
            Value::Null => return Ok(None),
            Value::Int(v) => i32::try_from(*v).ok(),
            Value::Decimal(v) => v.trunc().to_i32(),
            Value::Float(v) if v.is_finite() => v.trunc().to_i32(),
            Value::Float(_) => None,
            other => return Err(RowError::decode(at, other.mismatch("number"))),
        };
        narrowed.map(Some).ok_or_else(|| {
            RowError::decode(
                at,
                DecodeErrorKind::OutOfRange {
                    expected: "i32",
                    data: value.to_string(),
                },
            )
        })
    })
}

/// Integer of any size, from a text column or an integer column.
pub fn big_integer() -> impl Composer<Option<BigInt>> + Clone + Send + Sync {
    one_column(|row: &dyn Row, at: usize| match row.value(at)? {
        Value::Null => Ok(None),
        Value::Int(v) => Ok(Some(BigInt::from(v))),
        Value::Text(text) => text.trim().parse::<BigInt>().map(Some).map_err(|_| {
            RowError::decode(
                at,
                DecodeErrorKind::Unparsable {
                    expected: "BigInt",
                    data: text,
                },
            )
        }),
        other => Err(RowError::decode(at, other.mismatch("BigInt"))),
    })
}

/// Text column holding a month name such as `Jan`.
pub fn month() -> impl Composer<Option<Month>> + Clone + Send + Sync {
    one_column(|row: &dyn Row, at: usize| {
        let Some(text) = get::<String>(row, at)? else {
            return Ok(None);
        };
        text.trim().parse::<Month>().map(Some).map_err(|_| {
            RowError::decode(
                at,
                DecodeErrorKind::Unparsable {
                    expected: "Month",
                    data: text,
                },
            )
        })
    })
}

/// Text column holding the code of an `E`.
///
/// NULL decodes to `None` rather than failing; an unknown code is
/// [`DecodeErrorKind::UnknownCode`].
pub fn code<E: CodeProperty>() -> impl Composer<Option<E>> + Clone + Send + Sync {
    one_column(|row: &dyn Row, at: usize| {
        let Some(text) = get::<String>(row, at)? else {
            return Ok(None);
        };
        match value_of_code::<E>(&text) {
            Some(value) => Ok(Some(value)),
            None => Err(RowError::decode(at, DecodeErrorKind::UnknownCode { code: text })),
        }
    })
}

/// Like [`code`], resolved through a prebuilt table.
pub fn code_in<E: CodeProperty>(table: Arc<CodeTable<E>>) -> impl Composer<Option<E>> + Clone {
    one_column(move |row: &dyn Row, at: usize| {
        let Some(text) = get::<String>(row, at)? else {
            return Ok(None);
        };
        match table.find(&text) {
            Some(value) => Ok(Some(value)),
            None => Err(RowError::decode(at, DecodeErrorKind::UnknownCode { code: text })),
        }
    })
}
