//! Dynamic values crossing the script boundary
//!
//! This module provides the tagged value type every marshaller converts
//! to and from.

pub mod runtime_value;
pub use runtime_value::*;

#[cfg(test)]
mod tests;
