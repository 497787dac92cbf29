//! MSI (Modified Plessey) decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/MSI_Barcode>
//!
//! Each digit is four BCD bits, most significant first. A one bit is drawn
//! as `110` and a zero bit as `100`, so every digit spans 12 modules. The
//! start pattern is `110` and the stop pattern is `1001`.

use crate::ChecksumPolicy;
use crate::formats::ean::digits_to_string;
use crate::modules::{bit_key, matches_at};

const START: [bool; 3] = [true, true, false];
const STOP: [bool; 4] = [true, false, false, true];
const DIGIT_MODULES: usize = 12;

/// Module key for a digit
fn digit_key(digit: u8) -> u32 {
    (0..4).rev().fold(0u32, |key, bit| {
        let cell = if (digit >> bit) & 1 == 1 { 0b110 } else { 0b100 };
        (key << 3) | cell
    })
}

fn digit_for_key(key: u32) -> Option<u8> {
    (0..10).find(|&d| digit_key(d) == key)
}

/// Computes the MSI mod-10 check digit
///
/// Starting from the rightmost digit, every other digit is doubled and
/// two-digit results are reduced by 9.
pub(crate) fn mod10(content: &[u8]) -> u8 {
    let sum: u32 = content
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let d = u32::from(d);
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Strips one or two trailing check digits, trying two first
fn strip_check(raw: &[u8]) -> Option<&[u8]> {
    if raw.len() >= 2 {
        let (data, checks) = raw.split_at(raw.len() - 2);
        let c1 = mod10(data);
        if c1 == checks[0] {
            let mut with_c1 = data.to_vec();
            with_c1.push(c1);
            if mod10(&with_c1) == checks[1] {
                return Some(data);
            }
        }
    }
    let (data, check) = raw.split_last().map(|(c, d)| (d, *c))?;
    (mod10(data) == check).then_some(data)
}

/// Decodes an MSI symbol
pub fn decode_msi(modules: &[bool], policy: ChecksumPolicy) -> Option<String> {
    let len = modules.len();
    if len < START.len() + STOP.len() + DIGIT_MODULES {
        return None;
    }
    if !matches_at(modules, 0, &START) || !matches_at(modules, len - STOP.len(), &STOP) {
        return None;
    }

    let data_len = len - START.len() - STOP.len();
    if data_len == 0 || data_len % DIGIT_MODULES != 0 {
        return None;
    }

    let raw = (0..data_len / DIGIT_MODULES)
        .map(|i| digit_for_key(bit_key(modules, START.len() + i * DIGIT_MODULES, DIGIT_MODULES)))
        .collect::<Option<Vec<u8>>>()?;

    if policy != ChecksumPolicy::None {
        if let Some(data) = strip_check(&raw) {
            return Some(digits_to_string(data));
        }
        if policy.is_strict() {
            return None;
        }
    }
    Some(digits_to_string(&raw))
}
