//! Embedded runtime tests
