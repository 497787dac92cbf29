//! Code 39 decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Code_39>
//!
//! Each character is 9 elements (5 bars, 4 spaces), three of them wide.
//! With narrow = 1 module and wide = 2 modules a character spans 12 modules,
//! and characters are separated by one narrow space. The symbol is framed
//! by `*`.
//!
//! Full ASCII mode encodes characters outside the native alphabet as a
//! shift character (`$`, `%`, `/`, `+`) followed by a letter.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ChecksumPolicy;
use crate::modules::bit_key;
use crate::pool::scratch;

/// Native alphabet in check-value order
const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Element widths (bar first) for each character of [`ALPHABET`], then `*`
const PATTERNS: [&str; 44] = [
    "111221211", "211211112", "112211112", "212211111", "111221112", // 0-4
    "211221111", "112221111", "111211212", "211211211", "112211211", // 5-9
    "211112112", "112112112", "212112111", "111122112", "211122111", // A-E
    "112122111", "111112212", "211112211", "112112211", "111122211", // F-J
    "211111122", "112111122", "212111121", "111121122", "211121121", // K-O
    "112121121", "111111222", "211111221", "112111221", "111121221", // P-T
    "221111112", "122111112", "222111111", "121121112", "221121111", // U-Y
    "122121111", "121111212", "221111211", "122111211", "121212111", // Z - . SP $
    "121211121", "121112121", "111212121", "121121211", // / + % *
];

/// Modules per character
const CHAR_MODULES: usize = 12;

/// 12-module key to character
static PATTERN_MAP: LazyLock<HashMap<u32, char>> = LazyLock::new(|| {
    ALPHABET
        .chars()
        .chain(std::iter::once('*'))
        .zip(PATTERNS)
        .map(|(c, widths)| (pattern_key(widths), c))
        .collect()
});

/// Shift pair to ASCII character
static EXTENDED_MAP: LazyLock<HashMap<(char, char), char>> =
    LazyLock::new(|| extended_reverse_map(['$', '%', '/', '+']));

/// Renders element widths as a module bit key, bar first
fn pattern_key(widths: &str) -> u32 {
    let mut key = 0u32;
    for (i, w) in widths.bytes().enumerate() {
        let dark = u32::from(i % 2 == 0);
        for _ in 0..(w - b'0') {
            key = (key << 1) | dark;
        }
    }
    key
}

/// Returns the shift pair for an ASCII character in full ASCII mode
///
/// `shifts` names the four shift characters in the order `$ % / +`.
/// Characters in the native alphabet return `None`.
pub(crate) fn full_ascii_escape(ascii: u8, shifts: [char; 4]) -> Option<(char, char)> {
    let [dollar, percent, slash, plus] = shifts;
    let letter = |base: u8, offset: u8| char::from(base + offset);
    let pair = match ascii {
        0 => (percent, 'U'),
        1..=26 => (dollar, letter(b'A', ascii - 1)),
        27..=31 => (percent, letter(b'A', ascii - 27)),
        b'!'..=b',' => (slash, letter(b'A', ascii - b'!')),
        b'/' => (slash, 'O'),
        b':' => (slash, 'Z'),
        b';'..=b'?' => (percent, letter(b'F', ascii - b';')),
        b'@' => (percent, 'V'),
        b'['..=b'_' => (percent, letter(b'K', ascii - b'[')),
        b'`' => (percent, 'W'),
        b'a'..=b'z' => (plus, letter(b'A', ascii - b'a')),
        b'{'..=127 => (percent, letter(b'P', ascii - b'{')),
        _ => return None,
    };
    Some(pair)
}

/// Builds the shift-pair to ASCII map for a set of shift characters
pub(crate) fn extended_reverse_map(shifts: [char; 4]) -> HashMap<(char, char), char> {
    let mut map = HashMap::new();
    for ascii in 0u8..128 {
        if let Some(pair) = full_ascii_escape(ascii, shifts) {
            map.entry(pair).or_insert(char::from(ascii));
        }
    }
    map
}

/// Replaces every known shift pair with the character it encodes
pub(crate) fn expand_pairs(raw: &[char], map: &HashMap<(char, char), char>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if let Some(&next) = raw.get(i + 1)
            && let Some(&mapped) = map.get(&(raw[i], next))
        {
            out.push(mapped);
            i += 2;
            continue;
        }
        out.push(raw[i]);
        i += 1;
    }
    out
}

/// Computes the mod-43 check character
///
/// Returns `None` if `content` holds a character outside the native alphabet.
pub(crate) fn check_char(content: &[char]) -> Option<char> {
    let mut sum = 0usize;
    for &c in content {
        sum += ALPHABET.chars().position(|a| a == c)?;
    }
    ALPHABET.chars().nth(sum % 43)
}

/// Decodes a Code 39 symbol
///
/// # Arguments
/// * `modules` - Trimmed module sequence
/// * `policy` - Treatment of the optional mod-43 check character
///
/// # Returns
/// * Text between the `*` delimiters, with full ASCII pairs expanded when
///   a shift character is present
pub fn decode_code39(modules: &[bool], policy: ChecksumPolicy) -> Option<String> {
    let len = modules.len();
    let capacity = (len + 1) / (CHAR_MODULES + 1);
    if capacity == 0 {
        return None;
    }

    let mut chars = scratch(capacity);
    let mut index = 0;
    while index + CHAR_MODULES <= len {
        let c = *PATTERN_MAP.get(&bit_key(modules, index, CHAR_MODULES))?;
        if chars.len() >= capacity {
            return None;
        }
        chars.push(c);
        index += CHAR_MODULES;
        // Inter-character gap
        if index < len && !modules[index] {
            index += 1;
        }
    }

    if chars.len() < 2 || chars[0] != '*' || chars[chars.len() - 1] != '*' {
        return None;
    }
    let mut raw = &chars[1..chars.len() - 1];

    if policy != ChecksumPolicy::None && raw.len() >= 2 {
        let (content, last) = raw.split_at(raw.len() - 1);
        if check_char(content) == Some(last[0]) {
            raw = content;
        } else if policy.is_strict() {
            return None;
        }
    }

    if raw.iter().any(|c| matches!(c, '$' | '%' | '/' | '+')) {
        Some(expand_pairs(raw, &EXTENDED_MAP))
    } else {
        Some(raw.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_patterns_have_three_wide() {
        for widths in PATTERNS {
            assert_eq!(widths.bytes().filter(|&b| b == b'2').count(), 3);
            assert_eq!(widths.bytes().map(|b| (b - b'0') as usize).sum::<usize>(), 12);
        }
        assert_eq!(PATTERN_MAP.len(), 44);
    }

    #[test]
    fn test_check_char() {
        // C=12 O=24 D=13 E=14 3=3 9=9 -> 75 % 43 = 32 -> W
        let content: Vec<char> = "CODE39".chars().collect();
        assert_eq!(check_char(&content), Some('W'));
        assert_eq!(check_char(&['*']), None);
    }

    #[test]
    fn test_full_ascii_escape() {
        let shifts = ['$', '%', '/', '+'];
        assert_eq!(full_ascii_escape(b'a', shifts), Some(('+', 'A')));
        assert_eq!(full_ascii_escape(0, shifts), Some(('%', 'U')));
        assert_eq!(full_ascii_escape(127, shifts), Some(('%', 'T')));
        assert_eq!(full_ascii_escape(b'/', shifts), Some(('/', 'O')));
        assert_eq!(full_ascii_escape(b'A', shifts), None);
        assert_eq!(EXTENDED_MAP.get(&('/', 'Z')), Some(&':'));
    }

    #[test]
    fn test_decode_code39() {
        let m = fixtures::code39("CODE39", false).unwrap();
        assert_eq!(
            decode_code39(&m, ChecksumPolicy::None).as_deref(),
            Some("CODE39")
        );
    }

    #[test]
    fn test_checksum_policies() {
        let m = fixtures::code39("CODE39", true).unwrap();
        assert_eq!(
            decode_code39(&m, ChecksumPolicy::None).as_deref(),
            Some("CODE39W")
        );
        assert_eq!(
            decode_code39(&m, ChecksumPolicy::RequireValid).as_deref(),
            Some("CODE39")
        );

        let plain = fixtures::code39("CODE39", false).unwrap();
        assert_eq!(decode_code39(&plain, ChecksumPolicy::RequireValid), None);
        assert_eq!(
            decode_code39(&plain, ChecksumPolicy::StripIfValid).as_deref(),
            Some("CODE39")
        );
    }

    #[test]
    fn test_full_ascii() {
        let m = fixtures::code39_full_ascii("Hi!").unwrap();
        assert_eq!(decode_code39(&m, ChecksumPolicy::None).as_deref(), Some("Hi!"));
    }

    #[test]
    fn test_missing_delimiter() {
        let m = fixtures::code39_raw("ABC").unwrap();
        assert_eq!(decode_code39(&m, ChecksumPolicy::None), None);
    }
}
