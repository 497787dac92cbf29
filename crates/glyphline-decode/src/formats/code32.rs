//! Code 32 (Italian Pharmacode) decoder
//!
//! A Code 32 symbol is a Code 39 symbol carrying six base-32 characters.
//! The base-32 value is a nine-digit pharmaceutical code whose last digit
//! is a weighted mod-10 check.

use super::code39::decode_code39;
use crate::ChecksumPolicy;

/// Base-32 digit alphabet (no vowels)
const ALPHABET: &str = "0123456789BCDFGHJKLMNPQRSTUVWXYZ";

fn from_base32(text: &str) -> Option<u32> {
    if text.chars().count() != 6 {
        return None;
    }
    text.chars().try_fold(0u32, |value, c| {
        let digit = ALPHABET.find(c.to_ascii_uppercase())? as u32;
        Some(value * 32 + digit)
    })
}

/// Computes the check digit over the first eight digits
///
/// Odd positions weigh 1 and even positions 2; two-digit products
/// contribute the sum of their digits.
pub(crate) fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .take(8)
        .enumerate()
        .map(|(i, &d)| {
            let value = u32::from(d) * if i % 2 == 0 { 1 } else { 2 };
            value / 10 + value % 10
        })
        .sum();
    (sum % 10) as u8
}

/// Decodes a Code 32 symbol into its nine-digit code
///
/// The Code 39 layer never verifies a check character here; the check
/// lives in the nine-digit code itself.
pub fn decode_code32(modules: &[bool]) -> Option<String> {
    let raw = decode_code39(modules, ChecksumPolicy::None)?;
    let value = from_base32(&raw)?;

    let text = format!("{value:09}");
    let digits: Vec<u8> = text.bytes().map(|b| b - b'0').collect();
    if digits.len() != 9 || check_digit(&digits) != digits[8] {
        return None;
    }
    Some(text)
}
