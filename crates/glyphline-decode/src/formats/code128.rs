//! Code 128 and GS1-128 decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Code_128>
//!
//! Every symbol character is three bars and three spaces spanning 11
//! modules; the stop character adds a final 2-module bar. Characters are
//! keyed by their six run widths written as a decimal number, e.g. `212222`.
//! A weighted mod-103 check character precedes the stop.
//!
//! An FNC1 anywhere marks the symbol as GS1-128. The leading FNC1 is
//! dropped; later ones become the group separator (U+001D).

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::modules::{decimal_key, runs};

pub(crate) const GROUP_SEPARATOR: char = '\u{1D}';

/// Run widths for symbol values 0..=105, indexed by value
pub(crate) const PATTERNS: [u32; 106] = [
    212222, 222122, 222221, 121223, 121322, 131222, 122213, 122312, 132212, 221213, // 0
    221312, 231212, 112232, 122132, 122231, 113222, 123122, 123221, 223211, 221132, // 10
    221231, 213212, 223112, 312131, 311222, 321122, 321221, 312212, 322112, 322211, // 20
    212123, 212321, 232121, 111323, 131123, 131321, 112313, 132113, 132311, 211313, // 30
    231113, 231311, 112133, 112331, 132131, 113123, 113321, 133121, 313121, 211331, // 40
    231131, 213113, 213311, 213131, 311123, 311321, 331121, 312113, 312311, 332111, // 50
    314111, 221411, 431111, 111224, 111422, 121124, 121421, 141122, 141221, 112214, // 60
    112412, 122114, 122411, 142112, 142211, 241211, 221114, 413111, 241112, 134111, // 70
    111242, 121142, 121241, 114212, 124112, 124211, 411212, 421112, 421211, 212141, // 80
    214121, 412121, 111143, 111341, 131141, 114113, 114311, 411113, 411311, 113141, // 90
    114131, 311141, 411131, 211412, 211214, 211232, // 100
];

/// Stop pattern including its termination bar
pub(crate) const STOP_PATTERN: u32 = 2331112;

pub(crate) const FNC3: u32 = 96;
pub(crate) const FNC2: u32 = 97;
pub(crate) const SHIFT: u32 = 98;
pub(crate) const CODE_C: u32 = 99;
pub(crate) const CODE_B: u32 = 100;
pub(crate) const CODE_A: u32 = 101;
pub(crate) const FNC1: u32 = 102;
pub(crate) const START_A: u32 = 103;
pub(crate) const START_B: u32 = 104;
pub(crate) const START_C: u32 = 105;

static PATTERN_MAP: LazyLock<HashMap<u32, u32>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .enumerate()
        .map(|(value, &key)| (key, value as u32))
        .collect()
});

/// Active code set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn from_start(code: u32) -> Option<Self> {
        match code {
            START_A => Some(CodeSet::A),
            START_B => Some(CodeSet::B),
            START_C => Some(CodeSet::C),
            _ => None,
        }
    }

    /// Character for a data value in set A or B
    fn char_for(self, code: u32) -> Option<char> {
        let ascii = match (self, code) {
            (CodeSet::A, 0..=63) | (CodeSet::B, 0..=95) => code + 32,
            (CodeSet::A, 64..=95) => code - 64,
            _ => return None,
        };
        char::from_u32(ascii)
    }
}

/// Text and GS1 flag of a decoded Code 128 symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128Symbol {
    pub text: String,
    /// True when an FNC1 was present
    pub gs1: bool,
}

/// Computes the mod-103 check value over the start and data values
pub(crate) fn checksum(values: &[u32]) -> u32 {
    let Some((&start, data)) = values.split_first() else {
        return 0;
    };
    data.iter()
        .zip(1u32..)
        .fold(start, |sum, (&v, weight)| (sum + v * weight) % 103)
}

/// Reads symbol values up to and including the check value
fn read_values(runs: &[u32]) -> Option<Vec<u32>> {
    let mut values = Vec::with_capacity(runs.len() / 6);
    let mut pos = 0;
    while pos < runs.len() {
        if runs.len() - pos >= 7 && decimal_key(runs, pos, 7) == Some(STOP_PATTERN) {
            break;
        }
        if runs.len() - pos < 6 {
            return None;
        }
        values.push(*PATTERN_MAP.get(&decimal_key(runs, pos, 6)?)?);
        pos += 6;
    }
    Some(values)
}

/// Decodes a Code 128 symbol, reporting whether it carries FNC1
pub fn decode_code128(modules: &[bool]) -> Option<Code128Symbol> {
    if modules.len() < 24 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    if runs.len() < 6 {
        return None;
    }

    let values = read_values(&runs)?;
    let (&check, values) = values.split_last()?;
    if values.len() < 2 || checksum(values) != check {
        return None;
    }

    let mut set = CodeSet::from_start(values[0])?;
    let mut text = String::with_capacity(values.len() * 2);
    let mut gs1 = false;
    let mut shifted = false;
    for &code in &values[1..] {
        if code == FNC1 {
            if gs1 {
                text.push(GROUP_SEPARATOR);
            }
            gs1 = true;
            continue;
        }

        if set == CodeSet::C {
            match code {
                0..=99 => {
                    text.push(char::from(b'0' + (code / 10) as u8));
                    text.push(char::from(b'0' + (code % 10) as u8));
                }
                CODE_B => set = CodeSet::B,
                CODE_A => set = CodeSet::A,
                _ => return None,
            }
            continue;
        }

        let active = match (shifted, set) {
            (true, CodeSet::A) => CodeSet::B,
            (true, _) => CodeSet::A,
            (false, s) => s,
        };
        shifted = false;
        match code {
            0..=95 => text.push(active.char_for(code)?),
            FNC3 | FNC2 => {}
            SHIFT => shifted = true,
            CODE_C => set = CodeSet::C,
            // The other set's switch, or FNC4 in the current set
            CODE_B | CODE_A => {
                if code == CODE_B && set == CodeSet::A {
                    set = CodeSet::B;
                } else if code == CODE_A && set == CodeSet::B {
                    set = CodeSet::A;
                }
            }
            _ => return None,
        }
    }

    Some(Code128Symbol { text, gs1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_pattern_table() {
        assert_eq!(PATTERN_MAP.len(), 106);
        assert!(PATTERNS.iter().all(|&p| {
            let digits: Vec<u32> = p.to_string().chars().filter_map(|c| c.to_digit(10)).collect();
            digits.iter().sum::<u32>() == 11
        }));
    }

    #[test]
    fn test_checksum() {
        // Start B, "PJJ123C": 879 mod 103
        let values = [104, 48, 42, 42, 17, 18, 19, 35];
        assert_eq!(checksum(&values), 55);
    }

    #[test]
    fn test_decode_code128() {
        let m = fixtures::code128("Hello-128").unwrap();
        let symbol = decode_code128(&m).unwrap();
        assert_eq!(symbol.text, "Hello-128");
        assert!(!symbol.gs1);
    }

    #[test]
    fn test_code_set_c() {
        let m = fixtures::code128("123456").unwrap();
        assert_eq!(decode_code128(&m).map(|s| s.text).as_deref(), Some("123456"));
    }

    #[test]
    fn test_gs1_128() {
        let m = fixtures::gs1_128(&["0101234567890128", "10ABC"]).unwrap();
        let symbol = decode_code128(&m).unwrap();
        assert!(symbol.gs1);
        assert_eq!(symbol.text, "0101234567890128\u{1D}10ABC");
    }

    #[test]
    fn test_bad_checksum() {
        let mut values = fixtures::code128_values("ABC").unwrap();
        let n = values.len();
        values[n - 1] = (values[n - 1] + 1) % 103;
        let m = fixtures::code128_from_values(&values).unwrap();
        assert_eq!(decode_code128(&m), None);
    }
}
