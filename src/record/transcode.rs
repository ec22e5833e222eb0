//! Whole-record encode/decode
//!
//! Both directions are a single loop over the schema table; the kind of
//! each descriptor selects the marshaller.

use tracing::{debug, error};

use crate::error::FieldConversionError;
use crate::marshal::environ::{array_to_mapping, mapping_to_array};
use crate::marshal::scalar::{self, time_from_dynamic, time_to_dynamic, Coercion};
use crate::marshal::strings::{array_to_dynamic, dynamic_to_array, dynamic_to_string, string_to_dynamic};
use crate::plugin::PLUGIN_TYPE;
use crate::record::schema::{FieldMut, FieldRef, JobRecord, FIELDS};
use crate::runtime::value::{Mapping, Value};

/// Mapping view of a `JobRecord`, keyed by field name
pub type DynamicRecord = Mapping;

/// Encode every schema field.
///
/// A field that cannot be converted is logged and presented as null; the
/// record as a whole always encodes.
pub fn encode(record: &JobRecord) -> DynamicRecord {
    encode_checked(record).0
}

/// Encode every schema field, also returning the fields that could not be
/// converted. Pass them to `decode_except` so a placeholder null is not
/// read back as a clear.
pub fn encode_checked(record: &JobRecord) -> (DynamicRecord, Vec<FieldConversionError>) {
    let mut dynamic = DynamicRecord::with_capacity(FIELDS.len());
    let mut failures = Vec::new();
    for desc in FIELDS {
        let value = encode_field(desc.name, (desc.read)(record)).unwrap_or_else(|err| {
            error!("{}: {}", PLUGIN_TYPE, err);
            failures.push(err);
            Value::Null
        });
        dynamic.insert(desc.name.to_string(), value);
    }
    (dynamic, failures)
}

fn encode_field(
    name: &'static str,
    field: FieldRef<'_>,
) -> Result<Value, FieldConversionError> {
    let value = match field {
        FieldRef::Text(text) => string_to_dynamic(text),
        FieldRef::Uint(width, raw) => scalar::to_dynamic(width, raw, Coercion::Integer),
        FieldRef::Flag(width, raw) => scalar::to_dynamic(width, raw, Coercion::Boolean),
        FieldRef::Time(raw) => time_to_dynamic(raw),
        FieldRef::List(items) => array_to_dynamic(items),
        FieldRef::Env(entries) => array_to_mapping(name, entries)?,
    };
    Ok(value)
}

/// Write the dynamic record back into `record`.
///
/// Every schema key still present is consumed and applied; keys the script
/// deleted leave their field untouched. Conversion failures are logged and
/// returned, their fields are left as they were. Unknown keys stay in
/// `dynamic` and are otherwise ignored.
pub fn decode(
    record: &mut JobRecord,
    dynamic: &mut DynamicRecord,
) -> Vec<FieldConversionError> {
    decode_except(record, dynamic, &[])
}

/// `decode`, treating the fields in `unconvertible` as placeholders: their
/// key is consumed, but a value still null is not written back.
pub fn decode_except(
    record: &mut JobRecord,
    dynamic: &mut DynamicRecord,
    unconvertible: &[FieldConversionError],
) -> Vec<FieldConversionError> {
    let mut failures = Vec::new();
    for desc in FIELDS {
        let Some(value) = dynamic.swap_remove(desc.name) else {
            continue;
        };
        if value.is_null() && unconvertible.iter().any(|err| err.field == desc.name) {
            debug!("{}: {} was not presented, leaving it unchanged", PLUGIN_TYPE, desc.name);
            continue;
        }
        if let Err(err) = decode_field(desc.name, (desc.write)(record), value) {
            error!("{}: {}", PLUGIN_TYPE, err);
            failures.push(err);
        }
    }
    if !dynamic.is_empty() {
        debug!(
            "{}: ignoring unknown keys: {}",
            PLUGIN_TYPE,
            dynamic.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    failures
}

fn decode_field(
    name: &'static str,
    field: FieldMut<'_>,
    value: Value,
) -> Result<(), FieldConversionError> {
    match field {
        FieldMut::Text(slot) => dynamic_to_string(name, &value, slot),
        FieldMut::Uint(mut slot) => {
            let raw = scalar::from_dynamic(name, slot.width(), &value, Coercion::Integer)?;
            slot.store(raw);
            Ok(())
        }
        FieldMut::Flag(mut slot) => {
            let raw = scalar::from_dynamic(name, slot.width(), &value, Coercion::Boolean)?;
            slot.store(raw);
            Ok(())
        }
        FieldMut::Time(slot) => {
            *slot = time_from_dynamic(name, &value)?;
            Ok(())
        }
        FieldMut::List(array) => dynamic_to_array(name, &value, array),
        FieldMut::Env(array) => mapping_to_array(name, value, array),
    }
}
