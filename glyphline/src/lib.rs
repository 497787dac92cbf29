//! Glyphline - Linear barcode decoding for Rust
//!
//! Glyphline turns one binarized scanline into barcode text. Image capture,
//! binarization, and choosing where to scan are left to the caller.
//!
//! # Overview
//!
//! Supported symbologies include:
//!
//! - EAN-8, EAN-13, UPC-A, UPC-E (with 2/5-digit add-ons)
//! - Interleaved 2 of 5, ITF-14, Industrial/Matrix/IATA 2 of 5
//! - Code 128, GS1-128, Code 39, Code 32, Code 93
//! - Codabar, MSI, Code 11, Plessey, Telepen
//! - Patch Code, Pharmacode
//! - GS1 DataBar Truncated and Expanded
//!
//! # Example
//!
//! ```
//! use glyphline::{Decode, DecodeOptions, decode};
//!
//! let scanline = [false, false, true, false, true, false, false];
//! assert_eq!(decode(&scanline, &DecodeOptions::default()), Decode::NotRecognized);
//! ```

// Re-export the engine's public API
pub use glyphline_decode::*;
