//! Host function tests
