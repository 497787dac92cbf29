//! Plessey (UK) decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Plessey_Code>
//!
//! Every bit is a bar/space pair: a bar wider than its space is a one, a
//! space wider than its bar is a zero. Data is hex, four bits per
//! character least significant first, followed by an 8-bit CRC. After the
//! data comes a termination bar and then the stop bits, drawn space first.

use crate::ChecksumPolicy;
use crate::modules::{reverse, runs};

const START_BITS: [bool; 4] = [true, true, false, true];
const STOP_BITS: [bool; 4] = [false, false, true, true];

/// CRC generator polynomial (x^8 + x^7 + x^6 + x^5 + x^3 + 1)
const CRC_POLY: u32 = 0x1E9;

const CRC_BITS: usize = 8;

/// Reads a bit from a bar/space pair; equal widths are not a bit
fn pair_bit(bar: u32, space: u32) -> Option<bool> {
    (bar != space).then_some(bar > space)
}

/// Computes the Plessey CRC over payload bits
pub(crate) fn crc(bits: &[bool]) -> u8 {
    let mut crc = 0u32;
    let feed = bits.iter().copied().chain(std::iter::repeat_n(false, CRC_BITS));
    for bit in feed {
        crc = (crc << 1) | u32::from(bit);
        if crc & 0x100 != 0 {
            crc ^= CRC_POLY;
        }
    }
    (crc & 0xff) as u8
}

fn decode_forward(modules: &[bool], policy: ChecksumPolicy) -> Option<String> {
    if modules.len() < 24 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    let start_runs = START_BITS.len() * 2;
    if runs.len() < 13 || runs.len() % 2 == 0 || runs.len() < start_runs + 9 {
        return None;
    }

    for (i, &expected) in START_BITS.iter().enumerate() {
        if pair_bit(runs[i * 2], runs[i * 2 + 1])? != expected {
            return None;
        }
    }
    let pos = start_runs;

    let stop_start = runs.len() - STOP_BITS.len() * 2;
    if stop_start % 2 == 0 {
        return None;
    }
    let termination = stop_start - 1;
    if termination < pos {
        return None;
    }
    for (i, &expected) in STOP_BITS.iter().enumerate() {
        let space = stop_start + i * 2;
        if pair_bit(runs[space + 1], runs[space])? != expected {
            return None;
        }
    }

    let bit_runs = termination - pos;
    if bit_runs % 2 != 0 {
        return None;
    }
    let data_bits = bit_runs / 2;
    if data_bits <= CRC_BITS || (data_bits - CRC_BITS) % 4 != 0 {
        return None;
    }

    let bits = runs[pos..termination]
        .chunks_exact(2)
        .map(|pair| pair_bit(pair[0], pair[1]))
        .collect::<Option<Vec<bool>>>()?;
    let (payload, crc_bits) = bits.split_at(data_bits - CRC_BITS);

    if policy != ChecksumPolicy::None {
        let actual = crc_bits
            .iter()
            .enumerate()
            .fold(0u8, |v, (i, &b)| v | (u8::from(b) << i));
        if crc(payload) != actual && policy.is_strict() {
            return None;
        }
    }

    let text = payload
        .chunks_exact(4)
        .map(|nibble| {
            let value = nibble
                .iter()
                .enumerate()
                .fold(0u32, |v, (i, &b)| v | (u32::from(b) << i));
            char::from_digit(value, 16).map(|c| c.to_ascii_uppercase())
        })
        .collect::<Option<String>>()?;
    Some(text)
}

/// Decodes a Plessey symbol, reading it forward and then reversed
pub fn decode_plessey(modules: &[bool], policy: ChecksumPolicy) -> Option<String> {
    decode_forward(modules, policy).or_else(|| decode_forward(&reverse(modules), policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_pair_bit() {
        assert_eq!(pair_bit(2, 1), Some(true));
        assert_eq!(pair_bit(1, 2), Some(false));
        assert_eq!(pair_bit(2, 2), None);
    }

    #[test]
    fn test_decode_plessey() {
        let m = fixtures::plessey("01AF").unwrap();
        assert_eq!(
            decode_plessey(&m, ChecksumPolicy::RequireValid).as_deref(),
            Some("01AF")
        );

        let reversed = reverse(&m);
        assert_eq!(
            decode_plessey(&reversed, ChecksumPolicy::RequireValid).as_deref(),
            Some("01AF")
        );
    }

    #[test]
    fn test_crc_gate() {
        let m = fixtures::plessey_with_crc("12", 0x00).unwrap();
        assert_eq!(decode_plessey(&m, ChecksumPolicy::RequireValid), None);
        assert_eq!(
            decode_plessey(&m, ChecksumPolicy::StripIfValid).as_deref(),
            Some("12")
        );
        assert_eq!(
            decode_plessey(&m, ChecksumPolicy::None).as_deref(),
            Some("12")
        );
    }

    #[test]
    fn test_crc_nonzero_for_data() {
        let bits = [true, false, false, false];
        assert_ne!(crc(&bits), 0);
        assert_eq!(crc(&[]), 0);
    }
}
