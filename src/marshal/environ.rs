//! Environment-style `key=value` arrays
//!
//! These are exposed to the script as a mapping so key identity survives.
//! Coming back, the edited mapping is reconciled against the original
//! array instead of being rewritten wholesale:
//!
//! ```text
//! original  ["A=1", "B=2"]      mapping after script  {"A": "9", "C": "3"}
//!
//! 1. visit    A=1 -> changed    -> slot rewritten "A=9", A settled
//!             B=2 -> missing    -> slot nulled
//! 2. compact  ["A=9", null]
//! 3. resize   settled (1) + unmatched mapping entries (1)
//! 4. append   ["A=9", "C=3"]
//! ```
//!
//! Untouched entries keep their original text and position; additions
//! follow in mapping iteration order.

use std::mem;

use crate::error::FieldConversionError;
use crate::marshal::defrag::defragment;
use crate::runtime::value::{Mapping, Value};

/// Split an entry at its first `=`
pub fn split_entry(entry: &str) -> Option<(&str, &str)> {
    entry.split_once('=')
}

/// `key=value` array -> mapping; an empty array is absent
pub fn array_to_mapping(
    field: &'static str,
    entries: &[String],
) -> Result<Value, FieldConversionError> {
    if entries.is_empty() {
        return Ok(Value::Null);
    }
    let mut map = Mapping::with_capacity(entries.len());
    for entry in entries {
        let (key, value) = split_entry(entry).ok_or_else(|| {
            FieldConversionError::new(field, format!("entry \"{}\" has no '='", entry))
        })?;
        map.insert(key.to_string(), Value::Text(value.to_string()));
    }
    Ok(Value::Mapping(map))
}

/// What happens to one original slot
enum SlotAction {
    Keep,
    Rewrite(String),
    Drop,
}

/// Reconcile an edited mapping back into the `key=value` array
///
/// Null clears the array; a value that is not a mapping leaves it
/// untouched and is reported.
pub fn mapping_to_array(
    field: &'static str,
    value: Value,
    array: &mut Vec<String>,
) -> Result<(), FieldConversionError> {
    let map = match value {
        Value::Null => {
            *array = Vec::new();
            return Ok(());
        }
        Value::Mapping(map) => map,
        other => {
            return Err(FieldConversionError::new(
                field,
                format!("expected a mapping, instead found a {}", other.type_name()),
            ))
        }
    };

    // Settled keys are marked rather than removed so the survivors keep
    // their iteration order for step 4.
    let mut settled = vec![false; map.len()];
    let mut slots: Vec<Option<String>> = mem::take(array).into_iter().map(Some).collect();

    for slot in slots.iter_mut() {
        let action = match slot.as_deref() {
            None => continue,
            Some(entry) => {
                let (key, stored) = split_entry(entry).unwrap_or((entry, ""));
                match map.get_full(key) {
                    Some((index, _, current)) if !settled[index] => {
                        settled[index] = true;
                        let current = current.to_text();
                        if current == stored {
                            SlotAction::Keep
                        } else {
                            SlotAction::Rewrite(format!("{}={}", key, current))
                        }
                    }
                    _ => SlotAction::Drop,
                }
            }
        };
        match action {
            SlotAction::Keep => {}
            SlotAction::Rewrite(entry) => *slot = Some(entry),
            SlotAction::Drop => *slot = None,
        }
    }

    let survivors = defragment(&mut slots);
    slots.truncate(survivors);

    let added = settled.iter().filter(|done| !**done).count();
    let mut reconciled = Vec::with_capacity(survivors + added);
    reconciled.extend(slots.into_iter().flatten());
    for ((key, value), done) in map.into_iter().zip(settled) {
        if !done {
            reconciled.push(format!("{}={}", key, value.to_text()));
        }
    }
    *array = reconciled;
    Ok(())
}
