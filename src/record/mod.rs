//! Job record schema and transcoder

pub mod schema;
pub mod transcode;

pub use schema::{descriptor, FieldDescriptor, FieldKind, JobRecord, FIELDS};
pub use transcode::{decode, decode_except, encode, encode_checked, DynamicRecord};

#[cfg(test)]
mod tests;
