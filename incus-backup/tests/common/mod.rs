//! Shared fixtures for the integration tests

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;

pub use fixtures::*;
