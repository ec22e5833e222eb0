//! Field marshallers
//!
//! Kind-specific conversions between record fields and dynamic values.
//! The record transcoder picks one per schema entry.

pub mod defrag;
pub mod environ;
pub mod scalar;
pub mod sentinel;
pub mod strings;

pub use defrag::defragment;
pub use environ::{array_to_mapping, mapping_to_array};
pub use scalar::Coercion;
pub use sentinel::{is_unset, unset, Width, NO_VAL, NO_VAL16, NO_VAL64, NO_VAL8};
pub use strings::{array_to_dynamic, dynamic_to_array, dynamic_to_string, string_to_dynamic};

#[cfg(test)]
mod tests;
