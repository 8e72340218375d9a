//! Shared utilities: error types and log initialization.

pub mod error;
pub mod logging;
