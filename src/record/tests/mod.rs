//! Record tests
