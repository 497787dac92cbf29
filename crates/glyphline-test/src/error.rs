//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building test fixtures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TestError {
    /// The fixture input cannot be encoded in the requested symbology
    #[error("{symbology} fixture cannot encode '{input}': {reason}")]
    FixtureInput {
        symbology: &'static str,
        input: String,
        reason: &'static str,
    },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
