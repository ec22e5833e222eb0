//! Scalar field marshalling
//!
//! Integers cross the boundary as `i64`. A field holding its width's unset
//! pattern becomes null, and null coming back restores the pattern.

use crate::error::FieldConversionError;
use crate::marshal::sentinel::Width;
use crate::runtime::value::Value;

/// How a scalar field is presented to the script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Plain unsigned integer
    Integer,
    /// Integer flag presented as a boolean
    Boolean,
}

/// Scalar field -> dynamic value
pub fn to_dynamic(
    width: Width,
    raw: u64,
    coercion: Coercion,
) -> Value {
    if width.is_unset(raw) {
        return Value::Null;
    }
    match coercion {
        Coercion::Integer => Value::Int(width.truncate(raw) as i64),
        Coercion::Boolean => Value::Bool(width.truncate(raw) != 0),
    }
}

/// Dynamic value -> scalar field, already wrapped to `width`
pub fn from_dynamic(
    field: &'static str,
    width: Width,
    value: &Value,
    coercion: Coercion,
) -> Result<u64, FieldConversionError> {
    if value.is_null() {
        return Ok(width.unset());
    }
    if coercion == Coercion::Boolean {
        return Ok(u64::from(value.is_truthy()));
    }
    let raw = coerce_integer(field, value)?;
    Ok(width.truncate(raw as u64))
}

/// Timestamp field -> dynamic value; timestamps are always present
pub fn time_to_dynamic(raw: i64) -> Value {
    Value::Int(raw)
}

/// Dynamic value -> timestamp field
pub fn time_from_dynamic(
    field: &'static str,
    value: &Value,
) -> Result<i64, FieldConversionError> {
    if value.is_null() {
        return Err(FieldConversionError::new(field, "timestamps cannot be unset"));
    }
    coerce_integer(field, value)
}

/// Integer coercion shared by every numeric kind
///
/// Text is accepted when it parses as a signed or unsigned decimal; values
/// above `i64::MAX` keep their bit pattern.
fn coerce_integer(
    field: &'static str,
    value: &Value,
) -> Result<i64, FieldConversionError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<u64>().map(|u| u as i64))
                .map_err(|_| {
                    FieldConversionError::new(field, format!("\"{}\" is not an integer", s))
                })
        }
        other => Err(FieldConversionError::new(
            field,
            format!("expected an integer, instead found a {}", other.type_name()),
        )),
    }
}
