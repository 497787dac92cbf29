//! glyphline-test - Regression test framework for glyphline
//!
//! This crate provides:
//!
//! - **RegParams**: a numbered check ledger that reports every failure at
//!   the end of a regression test
//! - **Fixtures**: module-sequence builders for every supported symbology
//! - **Logging**: a once-per-process `tracing` subscriber for test runs
//!
//! # Usage
//!
//! ```ignore
//! use glyphline_test::{RegParams, fixtures};
//!
//! let mut rp = RegParams::new("linear");
//! let modules = fixtures::code39("CODE39", false).unwrap();
//! rp.compare_strings(Some("CODE39"), decoded.as_deref());
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"
//! - `RUST_LOG`: Filter for the test subscriber (default "warn")

mod error;
pub mod fixtures;
mod params;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

static LOGGING: Once = Once::new();

/// Install the test `tracing` subscriber
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
