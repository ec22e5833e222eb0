//! Value tests
