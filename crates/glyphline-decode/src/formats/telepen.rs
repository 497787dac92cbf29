//! Telepen decoder (ASCII mode)
//!
//! Reference: <http://en.wikipedia.org/wiki/Telepen>
//!
//! Telepen encodes a bit stream in bar/space pairs. A narrow/narrow pair is
//! a single one bit; the other pair shapes encode runs that begin and end
//! with a zero. Bytes are sent least significant bit first with even
//! parity in bit 7. The symbol starts with `_`, ends with `z`, and carries
//! a mod-127 check byte before the stop.

use crate::modules::{Threshold, runs};

const START: u8 = b'_';
const STOP: u8 = b'z';

/// Width class of a bar/space pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairKind {
    NarrowNarrow,
    WideNarrow,
    WideWide,
    NarrowWide,
}

impl PairKind {
    fn classify(bar: u32, space: u32, threshold: &Threshold) -> Self {
        match (threshold.is_wide(bar), threshold.is_wide(space)) {
            (false, false) => PairKind::NarrowNarrow,
            (true, false) => PairKind::WideNarrow,
            (true, true) => PairKind::WideWide,
            (false, true) => PairKind::NarrowWide,
        }
    }
}

/// Expands pair kinds into the bit stream
fn pairs_to_bits(kinds: &[PairKind]) -> Option<Vec<bool>> {
    let mut bits = Vec::with_capacity(kinds.len() * 2);
    let mut i = 0;
    while i < kinds.len() {
        match kinds[i] {
            PairKind::NarrowNarrow => bits.push(true),
            PairKind::WideNarrow => bits.extend([false, false]),
            PairKind::WideWide => bits.extend([false, true, false]),
            PairKind::NarrowWide => {
                // 0, then ones through the closing narrow/wide pair, then 0
                let ones = kinds[i + 1..]
                    .iter()
                    .take_while(|&&k| k == PairKind::NarrowNarrow)
                    .count();
                let close = i + 1 + ones;
                if kinds.get(close) != Some(&PairKind::NarrowWide) {
                    return None;
                }
                bits.push(false);
                bits.extend(std::iter::repeat_n(true, ones + 2));
                bits.push(false);
                i = close;
            }
        }
        i += 1;
    }
    Some(bits)
}

/// Packs bits into even-parity bytes and strips the parity bit
fn bits_to_values(bits: &[bool]) -> Option<Vec<u8>> {
    if bits.len() % 8 != 0 || bits.len() / 8 < 3 {
        return None;
    }
    bits.chunks_exact(8)
        .map(|chunk| {
            let byte = chunk
                .iter()
                .enumerate()
                .fold(0u8, |v, (i, &b)| v | (u8::from(b) << i));
            (byte.count_ones() % 2 == 0).then_some(byte & 0x7f)
        })
        .collect()
}

/// Computes the mod-127 check byte
pub(crate) fn check_value(data: &[u8]) -> u8 {
    let sum: u32 = data.iter().map(|&b| u32::from(b)).sum();
    ((127 - sum % 127) % 127) as u8
}

/// Decodes a Telepen symbol
pub fn decode_telepen(modules: &[bool]) -> Option<String> {
    if modules.len() < 8 || !modules[0] {
        return None;
    }
    let mut runs = runs(modules);
    // The trailing narrow space is lost to trimming
    if runs.len() % 2 == 1 {
        let min = *runs.iter().min()?;
        runs.push(min);
    }
    let threshold = Threshold::global(&runs, 0, 1)?;

    let kinds: Vec<PairKind> = runs
        .chunks_exact(2)
        .map(|pair| PairKind::classify(pair[0], pair[1], &threshold))
        .collect();
    let values = bits_to_values(&pairs_to_bits(&kinds)?)?;

    if values[0] != START || values[values.len() - 1] != STOP {
        return None;
    }
    let check_index = values.len() - 2;
    if check_index == 0 {
        return None;
    }
    let data = &values[1..check_index];
    if check_value(data) != values[check_index] {
        return None;
    }
    Some(data.iter().map(|&b| char::from(b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_pairs_to_bits() {
        use PairKind::*;
        assert_eq!(pairs_to_bits(&[NarrowNarrow]), Some(vec![true]));
        assert_eq!(
            pairs_to_bits(&[WideWide, WideNarrow]),
            Some(vec![false, true, false, false, false])
        );
        assert_eq!(
            pairs_to_bits(&[NarrowWide, NarrowNarrow, NarrowWide]),
            Some(vec![false, true, true, true, false])
        );
        assert_eq!(pairs_to_bits(&[NarrowWide, NarrowNarrow]), None);
    }

    #[test]
    fn test_check_value() {
        // 65 + 66 = 131 -> 127 - 4
        assert_eq!(check_value(b"AB"), 123);
        assert_eq!(check_value(&[127]), 0);
    }

    #[test]
    fn test_decode_telepen() {
        let m = fixtures::telepen("Telepen 1").unwrap();
        assert_eq!(decode_telepen(&m).as_deref(), Some("Telepen 1"));
    }

    #[test]
    fn test_empty_payload() {
        let m = fixtures::telepen("").unwrap();
        assert_eq!(decode_telepen(&m).as_deref(), Some(""));
    }
}
