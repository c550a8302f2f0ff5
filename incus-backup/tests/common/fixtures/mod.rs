//! This module provides reusable test utilities:
//! - A scripted command runner standing in for the `incus` binary
//! - Test configuration builders
//! - Canned control-plane responses

pub mod mock_runner;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_runner::{MockRunner, Reply};
pub use test_config::TestConfigBuilder;
pub use test_data::*;
