//! Values and host functions shared with the embedded runtime

pub mod extfunc;
pub mod value;

pub use extfunc::{LogSink, MessageBridge, TracingSink, HOST_FUNCTIONS};
pub use value::{Mapping, Value};

#[cfg(test)]
mod tests;
