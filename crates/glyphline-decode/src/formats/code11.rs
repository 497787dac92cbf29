//! Code 11 decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Code_11>
//!
//! Each character is 5 elements (3 bars, 2 spaces) followed by a narrow
//! gap, framed by the `*` start/stop character. The alphabet is the ten
//! digits and `-`. One or two weighted mod-11 check characters (C, then K)
//! may follow the data.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ChecksumPolicy;
use crate::modules::{run_key, runs};
use crate::pool::scratch;

const CHARS: [char; 12] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '*'];

/// Wide-flag keys (5 elements, first element in MSB), indexed like [`CHARS`]
const KEYS: [u32; 12] = [
    0b00001, 0b10001, 0b01001, 0b11000, 0b00101, 0b10100, // 0-5
    0b01100, 0b00011, 0b10010, 0b10000, 0b00100, 0b00110, // 6-9 - *
];

const CHAR_RUNS: usize = 5;

static KEY_MAP: LazyLock<HashMap<u32, char>> =
    LazyLock::new(|| KEYS.into_iter().zip(CHARS).collect());

fn value_of(c: char) -> Option<usize> {
    CHARS[..11].iter().position(|&x| x == c)
}

/// Computes a mod-11 check character
///
/// Weights run 1, 2, ... from the rightmost character and wrap after
/// `max_weight`. A result of 10 is `-`.
pub(crate) fn check_char(content: &[char], max_weight: usize) -> char {
    let mut sum = 0usize;
    for (i, &c) in content.iter().rev().enumerate() {
        let Some(value) = value_of(c) else {
            return '-';
        };
        sum += value * (i % max_weight + 1);
    }
    CHARS[sum % 11]
}

/// Strips C and K (or just C) when they verify, trying both first
fn strip_check(raw: &[char]) -> Option<&[char]> {
    if raw.len() >= 2 {
        let n = raw.len();
        let data = &raw[..n - 2];
        if check_char(data, 10) == raw[n - 2] && check_char(&raw[..n - 1], 9) == raw[n - 1] {
            return Some(data);
        }
    }
    let (&c, data) = raw.split_last()?;
    (check_char(data, 10) == c).then_some(data)
}

/// Decodes a Code 11 symbol
pub fn decode_code11(modules: &[bool], policy: ChecksumPolicy) -> Option<String> {
    if modules.len() < 7 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    if runs.len() < CHAR_RUNS {
        return None;
    }

    let capacity = (runs.len() + 1) / (CHAR_RUNS + 1);
    let mut chars = scratch(capacity);
    let mut pos = 0;
    while pos + CHAR_RUNS <= runs.len() {
        let c = *KEY_MAP.get(&run_key(&runs, pos, CHAR_RUNS)?)?;
        if chars.len() >= capacity {
            return None;
        }
        chars.push(c);
        pos += CHAR_RUNS;

        if pos < runs.len() {
            if pos % 2 == 0 {
                return None;
            }
            pos += 1;
        }
    }

    let count = chars.len();
    if pos != runs.len() || count < 2 || chars[0] != '*' || chars[count - 1] != '*' {
        return None;
    }
    let raw = &chars[1..count - 1];

    if policy != ChecksumPolicy::None {
        if let Some(data) = strip_check(raw) {
            return Some(data.iter().collect());
        }
        if policy.is_strict() {
            return None;
        }
    }
    Some(raw.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_check_char() {
        // 123-45: 5*1 + 4*2 + 10*3 + 3*4 + 2*5 + 1*6 = 71 -> 5
        assert_eq!(check_char(&chars("123-45"), 10), '5');
        // 123-455: 5 + 10 + 12 + 40 + 15 + 12 + 7 = 101 -> 2
        assert_eq!(check_char(&chars("123-455"), 9), '2');
    }

    #[test]
    fn test_decode_code11() {
        let m = fixtures::code11("123-45").unwrap();
        assert_eq!(
            decode_code11(&m, ChecksumPolicy::None).as_deref(),
            Some("123-45")
        );
    }

    #[test]
    fn test_check_policies() {
        let m = fixtures::code11("123-4552").unwrap();
        assert_eq!(
            decode_code11(&m, ChecksumPolicy::RequireValid).as_deref(),
            Some("123-45")
        );

        let m = fixtures::code11("123-455").unwrap();
        assert_eq!(
            decode_code11(&m, ChecksumPolicy::RequireValid).as_deref(),
            Some("123-45")
        );

        let m = fixtures::code11("123-459").unwrap();
        assert_eq!(decode_code11(&m, ChecksumPolicy::RequireValid), None);
        assert_eq!(
            decode_code11(&m, ChecksumPolicy::StripIfValid).as_deref(),
            Some("123-459")
        );
    }
}
