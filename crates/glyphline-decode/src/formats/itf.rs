//! Interleaved 2 of 5 and ITF-14 decoders
//!
//! Reference: <http://en.wikipedia.org/wiki/Interleaved_2_of_5>
//!
//! Digits are encoded in pairs: five bars carry the first digit and the five
//! interleaved spaces carry the second. Each digit has exactly two wide
//! elements. The start is four narrow elements and the stop is wide bar,
//! narrow space, narrow bar.

use super::ean::digits_to_string;
use crate::modules::{Threshold, runs};

/// Digit wide-flag patterns (5 elements, first element in MSB)
const DIGIT_KEYS: [u32; 10] = [
    0b00110, 0b10001, 0b01001, 0b11000, 0b00101, // 0-4
    0b10100, 0b01100, 0b00011, 0b10010, 0b01010, // 5-9
];

/// Number of runs in the start pattern
const START_RUNS: usize = 4;

/// Looks up a digit by its 5-element wide-flag key
pub(crate) fn digit_for_key(key: u32) -> Option<u8> {
    DIGIT_KEYS.iter().position(|&k| k == key).map(|d| d as u8)
}

/// Packs every other run from `start` (five runs) as wide flags
fn interleaved_key(runs: &[u32], start: usize, threshold: &Threshold) -> Option<u32> {
    (0..5).try_fold(0u32, |key, i| {
        let run = *runs.get(start + i * 2)?;
        Some((key << 1) | u32::from(threshold.is_wide(run)))
    })
}

/// Decodes the symbol into digits, checking start and stop patterns
fn decode_digits(modules: &[bool]) -> Option<Vec<u8>> {
    if modules.len() < 15 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    if runs.len() < 7 {
        return None;
    }
    let threshold = Threshold::global(&runs, 0, 1)?;
    if runs[..START_RUNS].iter().any(|&r| threshold.is_wide(r)) {
        return None;
    }

    let remaining = runs.len() - START_RUNS;
    if remaining < 3 || (remaining - 3) % 10 != 0 {
        return None;
    }
    let pairs = (remaining - 3) / 10;
    if pairs == 0 {
        return None;
    }

    let mut digits = Vec::with_capacity(pairs * 2);
    let mut pos = START_RUNS;
    for _ in 0..pairs {
        digits.push(digit_for_key(interleaved_key(&runs, pos, &threshold)?)?);
        digits.push(digit_for_key(interleaved_key(&runs, pos + 1, &threshold)?)?);
        pos += 10;
    }

    let stop_ok = threshold.is_wide(runs[pos])
        && !threshold.is_wide(runs[pos + 1])
        && !threshold.is_wide(runs[pos + 2]);
    stop_ok.then_some(digits)
}

/// Computes the ITF-14 check digit over 13 content digits
///
/// Weights alternate 3/1 starting with 3 at the rightmost content digit.
pub(crate) fn itf14_check_digit(content: &[u8]) -> u8 {
    let sum: u32 = content
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Decodes an Interleaved 2 of 5 symbol (no check digit)
pub fn decode_itf(modules: &[bool]) -> Option<String> {
    decode_digits(modules).map(|digits| digits_to_string(&digits))
}

/// Decodes an ITF-14 symbol
///
/// Requires exactly 14 digits with a valid check digit, which is kept in
/// the output.
pub fn decode_itf14(modules: &[bool]) -> Option<String> {
    let digits = decode_digits(modules)?;
    if digits.len() != 14 || itf14_check_digit(&digits[..13]) != digits[13] {
        return None;
    }
    Some(digits_to_string(&digits))
}
