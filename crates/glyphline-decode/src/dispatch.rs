//! Symbology dispatcher
//!
//! In open mode the decoders are tried in a fixed priority order and the
//! first success wins. Several symbologies can parse the same modules, so
//! the order is the tie-break: fixed-length symbologies come first, then
//! the pattern-table ones, then the GS1 DataBar family.
//!
//! With a symbology hint only the matching decoder(s) run.

use enough::Stop;
use tracing::trace;

use crate::formats::{
    decode_codabar, decode_code11, decode_code32, decode_code39, decode_code93, decode_code128,
    decode_databar_expanded, decode_databar_truncated, decode_ean8, decode_ean13, decode_iata,
    decode_industrial, decode_itf, decode_itf14, decode_matrix, decode_msi, decode_patch,
    decode_pharmacode, decode_plessey, decode_telepen, decode_upca, decode_upce,
};
use crate::types::{DecodeOptions, DecodedResult, Symbology};

/// One decoder invocation
///
/// EAN-8 and EAN-13 are separate attempts sharing the [`Symbology::Ean`]
/// tag, and Code 128 covers GS1-128.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Attempt {
    Ean8,
    UpcA,
    Ean13,
    UpcE,
    Itf14,
    Itf,
    Industrial2of5,
    Matrix2of5,
    Iata2of5,
    Code128,
    Code32,
    Code39,
    Code93,
    Codabar,
    Msi,
    Code11,
    Plessey,
    PatchCode,
    Telepen,
    Pharmacode,
    DataBarTruncated,
    DataBarExpanded,
}

/// Open-mode priority order
const OPEN_ORDER: [Attempt; 22] = [
    Attempt::Ean8,
    Attempt::UpcA,
    Attempt::Ean13,
    Attempt::UpcE,
    Attempt::Itf14,
    Attempt::Itf,
    Attempt::Industrial2of5,
    Attempt::Matrix2of5,
    Attempt::Iata2of5,
    Attempt::Code128,
    Attempt::Code32,
    Attempt::Code39,
    Attempt::Code93,
    Attempt::Codabar,
    Attempt::Msi,
    Attempt::Code11,
    Attempt::Plessey,
    Attempt::PatchCode,
    Attempt::Telepen,
    Attempt::Pharmacode,
    Attempt::DataBarTruncated,
    Attempt::DataBarExpanded,
];

impl Attempt {
    /// Runs the decoder and tags its text
    fn run(self, modules: &[bool], options: &DecodeOptions) -> Option<DecodedResult> {
        let (symbology, text) = match self {
            Attempt::Ean8 => (Symbology::Ean, decode_ean8(modules)?),
            Attempt::UpcA => (Symbology::UpcA, decode_upca(modules)?),
            Attempt::Ean13 => (Symbology::Ean, decode_ean13(modules)?),
            Attempt::UpcE => (Symbology::UpcE, decode_upce(modules)?),
            Attempt::Itf14 => (Symbology::Itf14, decode_itf14(modules)?),
            Attempt::Itf => (Symbology::Itf, decode_itf(modules)?),
            Attempt::Industrial2of5 => (Symbology::Industrial2of5, decode_industrial(modules)?),
            Attempt::Matrix2of5 => (Symbology::Matrix2of5, decode_matrix(modules)?),
            Attempt::Iata2of5 => (Symbology::Iata2of5, decode_iata(modules)?),
            Attempt::Code128 => {
                let symbol = decode_code128(modules)?;
                let tag = if symbol.gs1 {
                    Symbology::Gs1128
                } else {
                    Symbology::Code128
                };
                (tag, symbol.text)
            }
            Attempt::Code32 => (Symbology::Code32, decode_code32(modules)?),
            Attempt::Code39 => (
                Symbology::Code39,
                decode_code39(modules, options.code39_checksum)?,
            ),
            Attempt::Code93 => (Symbology::Code93, decode_code93(modules)?),
            Attempt::Codabar => (Symbology::Codabar, decode_codabar(modules)?),
            Attempt::Msi => (Symbology::Msi, decode_msi(modules, options.msi_checksum)?),
            Attempt::Code11 => (
                Symbology::Code11,
                decode_code11(modules, options.code11_checksum)?,
            ),
            Attempt::Plessey => (
                Symbology::Plessey,
                decode_plessey(modules, options.plessey_checksum)?,
            ),
            Attempt::PatchCode => (Symbology::PatchCode, decode_patch(modules)?),
            Attempt::Telepen => (Symbology::Telepen, decode_telepen(modules)?),
            Attempt::Pharmacode => (Symbology::Pharmacode, decode_pharmacode(modules)?),
            Attempt::DataBarTruncated => (
                Symbology::Gs1DataBarTruncated,
                decode_databar_truncated(modules)?,
            ),
            Attempt::DataBarExpanded => (
                Symbology::Gs1DataBarExpanded,
                decode_databar_expanded(modules)?,
            ),
        };
        Some(DecodedResult::new(symbology, text))
    }
}

/// Decoders to run for a symbology hint
fn targeted(symbology: Symbology) -> &'static [Attempt] {
    match symbology {
        Symbology::Ean => &[Attempt::Ean8, Attempt::Ean13],
        Symbology::UpcA => &[Attempt::UpcA],
        Symbology::UpcE => &[Attempt::UpcE],
        Symbology::Itf => &[Attempt::Itf],
        Symbology::Itf14 => &[Attempt::Itf14],
        Symbology::Industrial2of5 => &[Attempt::Industrial2of5],
        Symbology::Matrix2of5 => &[Attempt::Matrix2of5],
        Symbology::Iata2of5 => &[Attempt::Iata2of5],
        Symbology::Code128 | Symbology::Gs1128 => &[Attempt::Code128],
        Symbology::Code32 => &[Attempt::Code32],
        Symbology::Code39 => &[Attempt::Code39],
        Symbology::Code93 => &[Attempt::Code93],
        Symbology::Codabar => &[Attempt::Codabar],
        Symbology::Msi => &[Attempt::Msi],
        Symbology::Code11 => &[Attempt::Code11],
        Symbology::Plessey => &[Attempt::Plessey],
        Symbology::PatchCode => &[Attempt::PatchCode],
        Symbology::Telepen => &[Attempt::Telepen],
        Symbology::Pharmacode => &[Attempt::Pharmacode],
        Symbology::Gs1DataBarTruncated => &[Attempt::DataBarTruncated],
        Symbology::Gs1DataBarExpanded => &[Attempt::DataBarExpanded],
    }
}

/// Outcome of dispatching one trimmed module sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Matched(DecodedResult),
    NoMatch,
    Stopped,
}

/// Tries the decoders selected by `options` on trimmed, non-empty modules
///
/// The stop token is polled before each decoder, never inside one.
pub(crate) fn dispatch(modules: &[bool], options: &DecodeOptions, stop: &dyn Stop) -> Dispatch {
    let attempts: &[Attempt] = match options.symbology {
        Some(symbology) => targeted(symbology),
        None => &OPEN_ORDER,
    };

    for &attempt in attempts {
        if stop.check().is_err() {
            return Dispatch::Stopped;
        }
        let Some(result) = attempt.run(modules, options) else {
            continue;
        };
        // A GS1-128 hint needs the FNC1 marker
        if options.symbology == Some(Symbology::Gs1128) && result.symbology != Symbology::Gs1128 {
            continue;
        }
        trace!(
            symbology = %result.symbology,
            modules = modules.len(),
            "symbol matched"
        );
        return Dispatch::Matched(result);
    }
    Dispatch::NoMatch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ALL_SYMBOLOGIES;
    use enough::Unstoppable;
    use glyphline_test::fixtures;

    #[test]
    fn test_every_symbology_has_a_decoder() {
        for &symbology in ALL_SYMBOLOGIES {
            assert!(!targeted(symbology).is_empty(), "{symbology}");
        }
    }

    #[test]
    fn test_open_order_covers_all_attempts() {
        let mut seen = std::collections::HashSet::new();
        for &symbology in ALL_SYMBOLOGIES {
            for attempt in targeted(symbology) {
                seen.insert(*attempt);
            }
        }
        assert_eq!(seen.len(), OPEN_ORDER.len());
        assert!(OPEN_ORDER.iter().all(|a| seen.contains(a)));
    }

    #[test]
    fn test_open_mode() {
        let m = fixtures::ean13("400638133393").unwrap();
        let result = dispatch(&m, &DecodeOptions::default(), &Unstoppable);
        assert_eq!(
            result,
            Dispatch::Matched(DecodedResult::new(Symbology::Ean, "4006381333931"))
        );
    }

    #[test]
    fn test_targeted_mode() {
        let m = fixtures::code39("CODE39", false).unwrap();
        let opts = DecodeOptions::with_symbology(Symbology::Code39);
        assert!(matches!(
            dispatch(&m, &opts, &Unstoppable),
            Dispatch::Matched(r) if r.text == "CODE39"
        ));

        let opts = DecodeOptions::with_symbology(Symbology::Code93);
        assert_eq!(dispatch(&m, &opts, &Unstoppable), Dispatch::NoMatch);
    }

    #[test]
    fn test_gs1_hint_requires_fnc1() {
        let plain = fixtures::code128("ABC").unwrap();
        let gs1 = fixtures::gs1_128(&["10ABC"]).unwrap();
        let hint = DecodeOptions::with_symbology(Symbology::Gs1128);
        assert_eq!(dispatch(&plain, &hint, &Unstoppable), Dispatch::NoMatch);
        assert!(matches!(
            dispatch(&gs1, &hint, &Unstoppable),
            Dispatch::Matched(r) if r.symbology == Symbology::Gs1128
        ));

        // A Code 128 hint still reports GS1-128 when FNC1 is present
        let hint = DecodeOptions::with_symbology(Symbology::Code128);
        assert!(matches!(
            dispatch(&gs1, &hint, &Unstoppable),
            Dispatch::Matched(r) if r.symbology == Symbology::Gs1128
        ));
    }
}
