//! Per-symbology decoders
//!
//! Every decoder takes a trimmed module sequence and returns the decoded
//! text, or `None` when the modules are not a valid symbol of its kind.
//! Decoders never return partial text.

mod codabar;
mod code11;
mod code128;
mod code32;
mod code39;
mod code93;
mod databar;
mod databar_expanded;
mod databar_truncated;
mod ean;
mod itf;
mod msi;
mod patch;
mod pharmacode;
mod plessey;
mod telepen;
mod two_of_five;
mod upc;

pub use codabar::decode_codabar;
pub use code11::decode_code11;
pub use code128::{Code128Symbol, decode_code128};
pub use code32::decode_code32;
pub use code39::decode_code39;
pub use code93::decode_code93;
pub use databar_expanded::decode_databar_expanded;
pub use databar_truncated::decode_databar_truncated;
pub use ean::{decode_ean8, decode_ean13};
pub use itf::{decode_itf, decode_itf14};
pub use msi::decode_msi;
pub use patch::decode_patch;
pub use pharmacode::decode_pharmacode;
pub use plessey::decode_plessey;
pub use telepen::decode_telepen;
pub use two_of_five::{decode_iata, decode_industrial, decode_matrix};
pub use upc::{decode_upca, decode_upce};
