//! Type definitions for linear barcode decoding
//!
//! This module contains the symbology tags, decode options, and result types
//! shared by the dispatcher and every format decoder.

use std::fmt;

/// Linear symbology tags
///
/// EAN-8 and EAN-13 share the [`Symbology::Ean`] tag. GS1-128 is Code 128
/// carrying a leading FNC1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    /// EAN-8 or EAN-13
    Ean = 0,
    /// UPC-A format
    UpcA = 1,
    /// UPC-E format (zero-suppressed UPC-A)
    UpcE = 2,
    /// Interleaved 2 of 5, any even digit count
    Itf = 3,
    /// ITF-14 shipping container code
    Itf14 = 4,
    /// Industrial (discrete) 2 of 5
    Industrial2of5 = 5,
    /// Matrix 2 of 5
    Matrix2of5 = 6,
    /// IATA 2 of 5
    Iata2of5 = 7,
    /// Code 128 format
    Code128 = 8,
    /// GS1-128 (Code 128 with FNC1)
    Gs1128 = 9,
    /// Code 32 (Italian pharmacode carried in Code 39)
    Code32 = 10,
    /// Code 39 format
    Code39 = 11,
    /// Code 93 format
    Code93 = 12,
    /// Codabar format
    Codabar = 13,
    /// MSI Plessey
    Msi = 14,
    /// Code 11 format
    Code11 = 15,
    /// Plessey (UK) format
    Plessey = 16,
    /// Kodak patch code
    PatchCode = 17,
    /// Telepen format
    Telepen = 18,
    /// Laetus one-track Pharmacode
    Pharmacode = 19,
    /// GS1 DataBar Truncated (DataBar-14 linear)
    Gs1DataBarTruncated = 20,
    /// GS1 DataBar Expanded (linear)
    Gs1DataBarExpanded = 21,
}

impl Symbology {
    /// Returns the name of this symbology
    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Ean => "EAN",
            Symbology::UpcA => "UPC-A",
            Symbology::UpcE => "UPC-E",
            Symbology::Itf => "ITF",
            Symbology::Itf14 => "ITF-14",
            Symbology::Industrial2of5 => "Industrial2of5",
            Symbology::Matrix2of5 => "Matrix2of5",
            Symbology::Iata2of5 => "IATA2of5",
            Symbology::Code128 => "Code128",
            Symbology::Gs1128 => "GS1-128",
            Symbology::Code32 => "Code32",
            Symbology::Code39 => "Code39",
            Symbology::Code93 => "Code93",
            Symbology::Codabar => "Codabar",
            Symbology::Msi => "MSI",
            Symbology::Code11 => "Code11",
            Symbology::Plessey => "Plessey",
            Symbology::PatchCode => "PatchCode",
            Symbology::Telepen => "Telepen",
            Symbology::Pharmacode => "Pharmacode",
            Symbology::Gs1DataBarTruncated => "GS1 DataBar Truncated",
            Symbology::Gs1DataBarExpanded => "GS1 DataBar Expanded",
        }
    }

    /// Returns whether [`DecodeOptions`] carries a checksum policy for this symbology
    pub fn has_checksum_policy(&self) -> bool {
        matches!(
            self,
            Symbology::Code39 | Symbology::Msi | Symbology::Code11 | Symbology::Plessey
        )
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every symbology tag, in declaration order
pub const ALL_SYMBOLOGIES: &[Symbology] = &[
    Symbology::Ean,
    Symbology::UpcA,
    Symbology::UpcE,
    Symbology::Itf,
    Symbology::Itf14,
    Symbology::Industrial2of5,
    Symbology::Matrix2of5,
    Symbology::Iata2of5,
    Symbology::Code128,
    Symbology::Gs1128,
    Symbology::Code32,
    Symbology::Code39,
    Symbology::Code93,
    Symbology::Codabar,
    Symbology::Msi,
    Symbology::Code11,
    Symbology::Plessey,
    Symbology::PatchCode,
    Symbology::Telepen,
    Symbology::Pharmacode,
    Symbology::Gs1DataBarTruncated,
    Symbology::Gs1DataBarExpanded,
];

/// How a decoder treats an optional trailing check character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumPolicy {
    /// Do not verify; the raw text (check characters included) is returned
    #[default]
    None,
    /// Strip the check characters when they verify, otherwise return raw text
    StripIfValid,
    /// Strip the check characters when they verify, otherwise reject
    RequireValid,
}

impl ChecksumPolicy {
    /// Returns whether a failed verification rejects the decode
    pub fn is_strict(&self) -> bool {
        *self == ChecksumPolicy::RequireValid
    }
}

/// Options for a decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Expected symbology (`None` tries every symbology in priority order)
    pub symbology: Option<Symbology>,
    /// Code 39 mod-43 check character policy
    pub code39_checksum: ChecksumPolicy,
    /// MSI mod-10 check digit policy
    pub msi_checksum: ChecksumPolicy,
    /// Code 11 C/K check digit policy
    pub code11_checksum: ChecksumPolicy,
    /// Plessey CRC policy
    pub plessey_checksum: ChecksumPolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            symbology: None,
            code39_checksum: ChecksumPolicy::None,
            msi_checksum: ChecksumPolicy::None,
            code11_checksum: ChecksumPolicy::None,
            plessey_checksum: ChecksumPolicy::RequireValid,
        }
    }
}

impl DecodeOptions {
    /// Creates options that decode only the given symbology
    pub fn with_symbology(symbology: Symbology) -> Self {
        Self {
            symbology: Some(symbology),
            ..Default::default()
        }
    }

    /// Sets the Code 39 checksum policy
    pub fn code39_checksum(mut self, policy: ChecksumPolicy) -> Self {
        self.code39_checksum = policy;
        self
    }

    /// Sets the MSI checksum policy
    pub fn msi_checksum(mut self, policy: ChecksumPolicy) -> Self {
        self.msi_checksum = policy;
        self
    }

    /// Sets the Code 11 checksum policy
    pub fn code11_checksum(mut self, policy: ChecksumPolicy) -> Self {
        self.code11_checksum = policy;
        self
    }

    /// Sets the Plessey checksum policy
    pub fn plessey_checksum(mut self, policy: ChecksumPolicy) -> Self {
        self.plessey_checksum = policy;
        self
    }
}

/// A successfully decoded symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedResult {
    /// Symbology that produced the text
    pub symbology: Symbology,
    /// Decoded text, check characters removed once verified
    pub text: String,
}

impl DecodedResult {
    /// Creates a new decoded result
    pub fn new(symbology: Symbology, text: impl Into<String>) -> Self {
        Self {
            symbology,
            text: text.into(),
        }
    }
}

/// Outcome of a decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decode {
    /// A symbol was recognized
    Found(DecodedResult),
    /// No symbology accepted the input
    NotRecognized,
}

impl Decode {
    /// Returns whether a symbol was recognized
    pub fn is_found(&self) -> bool {
        matches!(self, Decode::Found(_))
    }

    /// Returns the decoded result, if any
    pub fn found(&self) -> Option<&DecodedResult> {
        match self {
            Decode::Found(result) => Some(result),
            Decode::NotRecognized => None,
        }
    }

    /// Converts into an `Option`
    pub fn into_result(self) -> Option<DecodedResult> {
        match self {
            Decode::Found(result) => Some(result),
            Decode::NotRecognized => None,
        }
    }
}

impl From<Option<DecodedResult>> for Decode {
    fn from(value: Option<DecodedResult>) -> Self {
        match value {
            Some(result) => Decode::Found(result),
            None => Decode::NotRecognized,
        }
    }
}

/// What the transform driver tried during one decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeDiagnostics {
    /// Number of non-empty trimmed attempts handed to the dispatcher
    pub attempts: u32,
    /// Whether an inverted transform was tried
    pub inverted_tried: bool,
    /// Whether a reversed transform was tried
    pub reversed_tried: bool,
    /// Whether the stop token ended the call early
    pub cancelled: bool,
    /// Symbology that matched, if any
    pub matched: Option<Symbology>,
}
