//! Marshaller tests
