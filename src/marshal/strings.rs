//! Text and text-array marshalling
//!
//! Everything written back into the record is a fresh owned copy of the
//! value's textual representation; nothing aliases runtime storage.

use tracing::debug;

use crate::error::FieldConversionError;
use crate::runtime::value::Value;

/// Optional text -> dynamic value
pub fn string_to_dynamic(text: Option<&str>) -> Value {
    match text {
        Some(s) => Value::Text(s.to_string()),
        None => Value::Null,
    }
}

/// Dynamic value -> optional text, rewriting `slot` only when it changed
pub fn dynamic_to_string(
    field: &'static str,
    value: &Value,
    slot: &mut Option<String>,
) -> Result<(), FieldConversionError> {
    let text = match value {
        Value::Null => {
            *slot = None;
            return Ok(());
        }
        Value::Text(s) => s.as_str(),
        Value::Bool(_) | Value::Int(_) => {
            *slot = Some(value.to_text());
            return Ok(());
        }
        other => {
            return Err(FieldConversionError::new(
                field,
                format!("expected text, instead found a {}", other.type_name()),
            ))
        }
    };
    if slot.as_deref() != Some(text) {
        *slot = Some(text.to_string());
    }
    Ok(())
}

/// Text array -> dynamic sequence; an empty array is absent
pub fn array_to_dynamic(strings: &[String]) -> Value {
    if strings.is_empty() {
        return Value::Null;
    }
    Value::Sequence(strings.iter().map(|s| Value::Text(s.clone())).collect())
}

/// Dynamic sequence -> text array
///
/// Null or an empty sequence clears the array. Anything that is not a
/// sequence leaves the array untouched.
pub fn dynamic_to_array(
    field: &'static str,
    value: &Value,
    array: &mut Vec<String>,
) -> Result<(), FieldConversionError> {
    let items = match value {
        Value::Null => {
            clear_array(array);
            return Ok(());
        }
        Value::Sequence(items) => items,
        other => {
            return Err(FieldConversionError::new(
                field,
                format!("attribute is not a sequence, found a {}", other.type_name()),
            ))
        }
    };

    if items.is_empty() {
        clear_array(array);
        return Ok(());
    }

    // Shrinking drops the surplus entries, growing only reserves.
    if items.len() < array.len() {
        debug!("{}: shrinking from {} to {}", field, array.len(), items.len());
        array.truncate(items.len());
    } else {
        array.reserve_exact(items.len() - array.len());
    }

    for (i, item) in items.iter().enumerate() {
        let text = item.to_text();
        match array.get_mut(i) {
            Some(existing) => {
                if *existing != text {
                    *existing = text;
                }
            }
            None => array.push(text),
        }
    }
    Ok(())
}

/// Free every entry and the backing storage
pub fn clear_array(array: &mut Vec<String>) {
    *array = Vec::new();
}
