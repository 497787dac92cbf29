//! Code 93 decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Code_93>
//!
//! Each character is 9 modules (3 bars, 3 spaces) with no gap between
//! characters. The symbol is framed by `*` and closed by a single
//! termination bar. The last two data characters are the C and K check
//! characters.
//!
//! Four shift characters extend the alphabet to full ASCII, using the same
//! pair assignments as Code 39 full ASCII.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::code39::{expand_pairs, extended_reverse_map};
use crate::modules::bit_key;

/// Shift characters in `($) (%) (/) (+)` order
const SHIFTS: [char; 4] = ['\u{f1}', '\u{f2}', '\u{f3}', '\u{f4}'];

/// Characters in check-value order (value = index)
const CHARS: [char; 48] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '-', '.',
    ' ', '$', '/', '+', '%', SHIFTS[0], SHIFTS[1], SHIFTS[2], SHIFTS[3], '*',
];

/// 9-module patterns, indexed like [`CHARS`]
const PATTERNS: [u32; 48] = [
    276, 328, 324, 322, 296, 292, 290, 336, 274, 266, // 0-9
    424, 420, 418, 404, 402, 394, 360, 356, 354, 308, // A-J
    282, 344, 332, 326, 300, 278, 436, 434, 428, 422, // K-T
    406, 410, 364, 358, 310, 314, // U-Z
    302, 468, 466, 458, 366, 374, 430, // - . SP $ / + %
    294, 474, 470, 306, // shifts
    350, // *
];

const CHAR_MODULES: usize = 9;

static PATTERN_MAP: LazyLock<HashMap<u32, char>> =
    LazyLock::new(|| PATTERNS.into_iter().zip(CHARS).collect());

static EXTENDED_MAP: LazyLock<HashMap<(char, char), char>> =
    LazyLock::new(|| extended_reverse_map(SHIFTS));

fn value_of(c: char) -> Option<usize> {
    CHARS.iter().position(|&x| x == c)
}

/// Computes a mod-47 check character
///
/// Weights run 1, 2, ... from the rightmost character and wrap back to 1
/// after `max_weight`.
pub(crate) fn check_char(content: &[char], max_weight: usize) -> Option<char> {
    let mut sum = 0usize;
    for (i, &c) in content.iter().rev().enumerate() {
        sum += value_of(c)? * (i % max_weight + 1);
    }
    Some(CHARS[sum % 47])
}

/// Decodes a Code 93 symbol
///
/// The C and K characters are removed only when both verify; otherwise the
/// raw text is returned with them in place.
pub fn decode_code93(modules: &[bool]) -> Option<String> {
    let len = modules.len();
    if len < 10 || !modules[len - 1] {
        return None;
    }
    let data_len = len - 1;
    if data_len % CHAR_MODULES != 0 {
        return None;
    }
    let count = data_len / CHAR_MODULES;
    if count < 2 {
        return None;
    }

    let chars = (0..count)
        .map(|i| PATTERN_MAP.get(&bit_key(modules, i * CHAR_MODULES, CHAR_MODULES)).copied())
        .collect::<Option<Vec<char>>>()?;
    if chars[0] != '*' || chars[count - 1] != '*' {
        return None;
    }

    let mut raw = &chars[1..count - 1];
    if raw.len() >= 2 {
        let n = raw.len();
        let c = check_char(&raw[..n - 2], 20);
        let k = check_char(&raw[..n - 1], 15);
        if c == Some(raw[n - 2]) && k == Some(raw[n - 1]) {
            raw = &raw[..n - 2];
        }
    }

    if raw.iter().any(|c| SHIFTS.contains(c)) {
        Some(expand_pairs(raw, &EXTENDED_MAP))
    } else {
        Some(raw.iter().collect())
    }
}
