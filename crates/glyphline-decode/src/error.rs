//! Error types for glyphline-decode
//!
//! A scanline that simply is not a barcode is not an error; it is reported as
//! [`Decode::NotRecognized`](crate::Decode::NotRecognized). The variants here
//! cover inputs that violate the caller contract.

use thiserror::Error;

/// Errors that can occur at the decode boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A run-length sequence contained a run of zero modules
    #[error("run {index} has zero length")]
    ZeroLengthRun { index: usize },

    /// Expanding the input would exceed the module ceiling
    #[error("input expands to {modules} modules, maximum is {max}")]
    InputTooLong { modules: usize, max: usize },
}

/// Result type for decode boundary operations
pub type DecodeResult<T> = Result<T, DecodeError>;
