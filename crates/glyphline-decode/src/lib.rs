//! glyphline-decode - 1D barcode decode engine
//!
//! This crate turns one binarized scanline into barcode text:
//!
//! - **Module handling**: Trimming, inversion, reversal, run-length conversion
//! - **Symbology decoders**: EAN/UPC, 2-of-5 family, Code 128/GS1-128,
//!   Code 39/32/93, Codabar, MSI, Code 11, Plessey, Patch Code, Telepen,
//!   Pharmacode, and GS1 DataBar Truncated/Expanded
//! - **Dispatch**: Open-mode priority order or a targeted symbology hint
//! - **Transform driver**: Retries inverted and reversed scanlines
//!
//! # Quick Start
//!
//! ```
//! use glyphline_decode::{DecodeOptions, Symbology, decode_runs};
//!
//! // Codabar A1B as alternating dark/light runs: start A, digit 1, stop B
//! let runs = [
//!     1, 1, 2, 2, 1, 2, 1, 1, // A
//!     1, 1, 1, 1, 2, 2, 1, 1, // 1
//!     1, 2, 1, 2, 1, 1, 2, // B
//! ];
//! let result = decode_runs(&runs, &DecodeOptions::default()).unwrap();
//! let symbol = result.into_result().unwrap();
//! assert_eq!(symbol.symbology, Symbology::Codabar);
//! // Start and stop characters are not part of the text
//! assert_eq!(symbol.text, "1");
//! ```
//!
//! # Modules
//!
//! - [`modules`]: Scanline primitives and width classification
//! - [`formats`]: Per-symbology decoders

mod dispatch;
mod driver;
mod error;
pub mod formats;
pub mod modules;
mod pool;
mod types;

pub use error::{DecodeError, DecodeResult};

pub use driver::{DecodeJob, decode, decode_runs};
pub use types::{
    ALL_SYMBOLOGIES, ChecksumPolicy, Decode, DecodeDiagnostics, DecodeOptions, DecodedResult,
    Symbology,
};

// Re-export the stop token types used by DecodeJob
pub use enough::{Stop, Unstoppable};
