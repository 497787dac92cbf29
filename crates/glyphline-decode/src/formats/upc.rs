//! UPC-A and UPC-E decoders
//!
//! Reference: <http://en.wikipedia.org/wiki/Universal_Product_Code>
//!
//! UPC-A shares the EAN-13 layout with all left digits in the L set.
//! UPC-E carries six digits whose L/G parity pattern encodes both the
//! number system (0 or 1) and the check digit; validity is checked on the
//! 12-digit UPC-A expansion.

use super::ean::{
    DigitSet, EAN13_MODULES, GUARD_CENTER, GUARD_START, GUARD_UPCE_END, digits_to_string,
    match_digit, match_left_digit, prepare_symbol, with_addon,
};
use crate::modules::matches_at;

/// Canonical UPC-E width in modules
const UPCE_MODULES: usize = 51;

/// UPC-E parity for number system 0, by check digit (bit set = G/even)
///
/// Number system 1 uses the complement.
const UPCE_PARITY: [u32; 10] = [
    0b111000, 0b110100, 0b110010, 0b110001, 0b101100, // 0-4
    0b100110, 0b100011, 0b101010, 0b101001, 0b100101, // 5-9
];

/// Computes the UPC-A check digit over 11 content digits
pub(crate) fn upca_check_digit(content: &[u8]) -> u8 {
    let sum: u32 = content
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn is_valid_upca(digits: &[u8]) -> bool {
    digits.len() == 12 && upca_check_digit(&digits[..11]) == digits[11]
}

/// Expands an 8-digit UPC-E (number system, six digits, check) to UPC-A
pub(crate) fn expand_upce(upce: &[u8; 8]) -> [u8; 12] {
    let ns = upce[0];
    let d = &upce[1..7];
    let check = upce[7];
    let body: [u8; 10] = match d[5] {
        0..=2 => [d[0], d[1], d[5], 0, 0, 0, 0, d[2], d[3], d[4]],
        3 => [d[0], d[1], d[2], 0, 0, 0, 0, 0, d[3], d[4]],
        4 => [d[0], d[1], d[2], d[3], 0, 0, 0, 0, 0, d[4]],
        _ => [d[0], d[1], d[2], d[3], d[4], 0, 0, 0, 0, d[5]],
    };

    let mut out = [0u8; 12];
    out[0] = ns;
    out[1..11].copy_from_slice(&body);
    out[11] = check;
    out
}

/// Decodes a UPC-A symbol
pub fn decode_upca(modules: &[bool]) -> Option<String> {
    let symbol = prepare_symbol(modules, EAN13_MODULES, &GUARD_START)?;
    if !matches_at(&symbol, 0, &GUARD_START)
        || !matches_at(&symbol, 92, &GUARD_START)
        || !matches_at(&symbol, 45, &GUARD_CENTER)
    {
        return None;
    }

    let mut digits = Vec::with_capacity(12);
    for i in 0..6 {
        digits.push(match_digit(&symbol, 3 + i * 7, DigitSet::LeftOdd)?);
    }
    for i in 0..6 {
        digits.push(match_digit(&symbol, 50 + i * 7, DigitSet::Right)?);
    }
    if !is_valid_upca(&digits) {
        return None;
    }

    Some(with_addon(
        digits_to_string(&digits),
        modules,
        EAN13_MODULES,
        &GUARD_START,
    ))
}

/// Decodes a UPC-E symbol
///
/// # Returns
/// * The 8-digit compressed form: number system, six digits, check digit
pub fn decode_upce(modules: &[bool]) -> Option<String> {
    let symbol = prepare_symbol(modules, UPCE_MODULES, &GUARD_UPCE_END)?;
    if !matches_at(&symbol, 0, &GUARD_START) || !matches_at(&symbol, 45, &GUARD_UPCE_END) {
        return None;
    }

    let mut body = [0u8; 6];
    let mut parity = 0u32;
    for (i, slot) in body.iter_mut().enumerate() {
        let (digit, even) = match_left_digit(&symbol, 3 + i * 7)?;
        *slot = digit;
        parity = (parity << 1) | u32::from(even);
    }

    for (check, &ns0) in UPCE_PARITY.iter().enumerate() {
        for (ns, pattern) in [(0u8, ns0), (1u8, !ns0 & 0x3f)] {
            if pattern != parity {
                continue;
            }
            let mut candidate = [0u8; 8];
            candidate[0] = ns;
            candidate[1..7].copy_from_slice(&body);
            candidate[7] = check as u8;
            if is_valid_upca(&expand_upce(&candidate)) {
                return Some(with_addon(
                    digits_to_string(&candidate),
                    modules,
                    UPCE_MODULES,
                    &GUARD_UPCE_END,
                ));
            }
        }
    }
    None
}
