//! EAN-8 / EAN-13 decoder and the guard, digit, and add-on machinery
//! shared with UPC
//!
//! Reference: <http://en.wikipedia.org/wiki/International_Article_Number>
//!
//! Digits are 7 modules wide and drawn from three sets: L (odd parity),
//! G (even parity) and R (right half, the complement of L). In EAN-13 the
//! L/G pattern of the six left digits encodes the omitted first digit.
//!
//! Scanned symbols whose width has drifted from the canonical module count
//! are resampled onto the canonical grid before the guards are checked.

use std::borrow::Cow;

use crate::modules::{bit_key, matches_at};

/// Start and end guard `101`
pub(crate) const GUARD_START: [bool; 3] = [true, false, true];
/// Center guard `01010`
pub(crate) const GUARD_CENTER: [bool; 5] = [false, true, false, true, false];
/// UPC-E end guard `010101`
pub(crate) const GUARD_UPCE_END: [bool; 6] = [false, true, false, true, false, true];

const ADDON_START: [bool; 4] = [true, false, true, true];
const ADDON_SEPARATOR: [bool; 2] = [false, true];

/// Canonical EAN-8 width in modules
pub(crate) const EAN8_MODULES: usize = 67;
/// Canonical EAN-13 / UPC-A width in modules
pub(crate) const EAN13_MODULES: usize = 95;

/// Search slack around the expected end guard position
const GUARD_SLACK: usize = 10;

/// L-set digit patterns (7 modules, MSB first)
const L_PATTERNS: [u32; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, // 0-4
    0b0110001, 0b0101111, 0b0111011, 0b0110111, 0b0001011, // 5-9
];

/// G-set digit patterns
const G_PATTERNS: [u32; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101, // 0-4
    0b0111001, 0b0000101, 0b0010001, 0b0001001, 0b0010111, // 5-9
];

/// EAN-13 first digit by left-half parity (bit set = G, first digit in MSB)
const FIRST_DIGIT_PARITY: [u32; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, // 0-4
    0b011001, 0b011100, 0b010101, 0b010110, 0b011010, // 5-9
];

/// Two-digit add-on parity by value mod 4
const ADDON2_PARITY: [u32; 4] = [0b00, 0b01, 0b10, 0b11];

/// Five-digit add-on parity by add-on checksum
const ADDON5_PARITY: [u32; 10] = [
    0b11000, 0b10100, 0b10010, 0b10001, 0b01100, // 0-4
    0b00110, 0b00011, 0b01010, 0b01001, 0b00101, // 5-9
];

/// Digit pattern set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DigitSet {
    /// L (odd parity)
    LeftOdd,
    /// G (even parity)
    LeftEven,
    /// R (right half)
    Right,
}

impl DigitSet {
    fn pattern(self, digit: usize) -> u32 {
        match self {
            DigitSet::LeftOdd => L_PATTERNS[digit],
            DigitSet::LeftEven => G_PATTERNS[digit],
            DigitSet::Right => !L_PATTERNS[digit] & 0x7f,
        }
    }
}

/// Matches the 7-module window at `offset` against one digit set
pub(crate) fn match_digit(modules: &[bool], offset: usize, set: DigitSet) -> Option<u8> {
    if offset + 7 > modules.len() {
        return None;
    }
    let key = bit_key(modules, offset, 7);
    (0..10).find(|&d| set.pattern(d) == key).map(|d| d as u8)
}

/// Matches a left-half digit, trying L before G
///
/// Returns the digit and whether it used the G (even) set.
pub(crate) fn match_left_digit(modules: &[bool], offset: usize) -> Option<(u8, bool)> {
    if let Some(d) = match_digit(modules, offset, DigitSet::LeftOdd) {
        return Some((d, false));
    }
    match_digit(modules, offset, DigitSet::LeftEven).map(|d| (d, true))
}

/// Renders digit values as ASCII
pub(crate) fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|&d| char::from(b'0' + d)).collect()
}

/// Computes the EAN check digit for the given content digits
///
/// Weights alternate 3/1 from the right, so the leftmost weight depends on
/// the content length.
pub(crate) fn ean_check_digit(content: &[u8]) -> u8 {
    let mut triple = content.len() == 7;
    let mut sum = 0u32;
    for &d in content {
        sum += u32::from(d) * if triple { 3 } else { 1 };
        triple = !triple;
    }
    ((10 - sum % 10) % 10) as u8
}

fn is_valid_ean(digits: &[u8]) -> bool {
    match digits.split_last() {
        Some((&check, content)) if digits.len() == 8 || digits.len() == 13 => {
            ean_check_digit(content) == check
        }
        _ => false,
    }
}

/// Finds the end guard nearest its expected position
///
/// Returns the index just past the guard.
fn find_end_guard(modules: &[bool], width: usize, guard: &[bool]) -> Option<usize> {
    if modules.len() < guard.len() {
        return None;
    }
    let expected = width.saturating_sub(guard.len());
    let lo = expected.saturating_sub(GUARD_SLACK);
    let hi = (modules.len() - guard.len()).min(expected + GUARD_SLACK);

    (lo..=hi)
        .filter(|&i| matches_at(modules, i, guard))
        .min_by_key(|&i| i.abs_diff(expected))
        .map(|i| i + guard.len())
}

/// Cuts trailing add-on modules off a main symbol
///
/// Applies only when the input is longer than the canonical width and dark
/// modules follow the end guard.
fn extract_base<'a>(modules: &'a [bool], width: usize, guard: &[bool]) -> Option<&'a [bool]> {
    if modules.len() <= width + 2 {
        return None;
    }
    let end = find_end_guard(modules, width, guard)?;
    if end >= modules.len() || !modules[end..].contains(&true) {
        return None;
    }
    Some(&modules[..end])
}

/// Resamples a module sequence onto a grid of `width` modules
///
/// Each output module takes the majority of the input modules that fall in
/// its interval (ties go dark). Inputs more than 2x narrower or 3x wider than
/// the target are rejected.
pub(crate) fn resample(modules: &[bool], width: usize) -> Option<Cow<'_, [bool]>> {
    let len = modules.len();
    if len == width {
        return Some(Cow::Borrowed(modules));
    }
    if len == 0 || len * 2 < width || len > width * 3 {
        return None;
    }

    let out = (0..width)
        .map(|i| {
            let start = i * len / width;
            let end = (i + 1) * len / width;
            if end <= start {
                return modules[start.min(len - 1)];
            }
            let dark = modules[start..end.min(len)].iter().filter(|&&m| m).count();
            dark * 2 >= end - start
        })
        .collect();
    Some(Cow::Owned(out))
}

/// Extracts the main symbol and resamples it to its canonical width
pub(crate) fn prepare_symbol<'a>(
    modules: &'a [bool],
    width: usize,
    end_guard: &[bool],
) -> Option<Cow<'a, [bool]>> {
    let base = extract_base(modules, width, end_guard).unwrap_or(modules);
    resample(base, width)
}

fn addon_parity(digits: &[u8]) -> Option<u32> {
    match digits {
        [a, b] => Some(ADDON2_PARITY[usize::from(a * 10 + b) % 4]),
        [_, _, _, _, _] => {
            let sum: u32 = digits
                .iter()
                .enumerate()
                .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 9 })
                .sum();
            Some(ADDON5_PARITY[(sum % 10) as usize])
        }
        _ => None,
    }
}

fn decode_addon_digits(modules: &[bool], offset: usize, count: usize) -> Option<Vec<u8>> {
    let required = count * 7 + (count - 1) * 2;
    if offset + required > modules.len() {
        return None;
    }

    let mut digits = Vec::with_capacity(count);
    let mut parity = 0u32;
    let mut pos = offset;
    for i in 0..count {
        let (digit, even) = match_left_digit(modules, pos)?;
        digits.push(digit);
        parity = (parity << 1) | u32::from(even);
        pos += 7;
        if i + 1 < count {
            if !matches_at(modules, pos, &ADDON_SEPARATOR) {
                return None;
            }
            pos += ADDON_SEPARATOR.len();
        }
    }

    (addon_parity(&digits)? == parity).then_some(digits)
}

/// Decodes a 2- or 5-digit add-on following the main symbol
///
/// `modules` is the full trimmed input, before extraction or resampling.
pub(crate) fn decode_addon(modules: &[bool], width: usize, end_guard: &[bool]) -> Option<String> {
    if modules.len() < width + 8 {
        return None;
    }
    let end = find_end_guard(modules, width, end_guard)?;
    let start = (end..modules.len())
        .find(|&i| modules[i] && matches_at(modules, i, &ADDON_START))?;
    let pos = start + ADDON_START.len();

    [5, 2]
        .into_iter()
        .find_map(|count| decode_addon_digits(modules, pos, count))
        .map(|digits| digits_to_string(&digits))
}

/// Appends `+addon` to a validated main symbol when an add-on is present
pub(crate) fn with_addon(main: String, modules: &[bool], width: usize, end_guard: &[bool]) -> String {
    match decode_addon(modules, width, end_guard) {
        Some(addon) => format!("{main}+{addon}"),
        None => main,
    }
}

/// Decodes an EAN-8 symbol
pub fn decode_ean8(modules: &[bool]) -> Option<String> {
    let symbol = prepare_symbol(modules, EAN8_MODULES, &GUARD_START)?;
    if !matches_at(&symbol, 0, &GUARD_START)
        || !matches_at(&symbol, 64, &GUARD_START)
        || !matches_at(&symbol, 31, &GUARD_CENTER)
    {
        return None;
    }

    let mut digits = Vec::with_capacity(8);
    for i in 0..4 {
        digits.push(match_digit(&symbol, 3 + i * 7, DigitSet::LeftOdd)?);
    }
    for i in 0..4 {
        digits.push(match_digit(&symbol, 36 + i * 7, DigitSet::Right)?);
    }
    if !is_valid_ean(&digits) {
        return None;
    }

    Some(with_addon(
        digits_to_string(&digits),
        modules,
        EAN8_MODULES,
        &GUARD_START,
    ))
}

/// Decodes an EAN-13 symbol
///
/// # Returns
/// * 13 digits including the check digit, followed by `+addon` when a
///   supplemental symbol is present
pub fn decode_ean13(modules: &[bool]) -> Option<String> {
    let symbol = prepare_symbol(modules, EAN13_MODULES, &GUARD_START)?;
    if !matches_at(&symbol, 0, &GUARD_START)
        || !matches_at(&symbol, 92, &GUARD_START)
        || !matches_at(&symbol, 45, &GUARD_CENTER)
    {
        return None;
    }

    let mut digits = vec![0u8];
    let mut parity = 0u32;
    for i in 0..6 {
        let (digit, even) = match_left_digit(&symbol, 3 + i * 7)?;
        digits.push(digit);
        parity = (parity << 1) | u32::from(even);
    }
    for i in 0..6 {
        digits.push(match_digit(&symbol, 50 + i * 7, DigitSet::Right)?);
    }

    digits[0] = FIRST_DIGIT_PARITY.iter().position(|&p| p == parity)? as u8;
    if !is_valid_ean(&digits) {
        return None;
    }

    Some(with_addon(
        digits_to_string(&digits),
        modules,
        EAN13_MODULES,
        &GUARD_START,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_right_set_is_complement() {
        assert_eq!(DigitSet::Right.pattern(0), 0b1110010);
        assert_eq!(DigitSet::Right.pattern(9), 0b1110100);
    }

    #[test]
    fn test_ean_check_digit() {
        // 400638133393 -> 1
        assert_eq!(ean_check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        // 9638507 -> 4
        assert_eq!(ean_check_digit(&[9, 6, 3, 8, 5, 0, 7]), 4);
    }

    #[test]
    fn test_decode_ean13() {
        let m = fixtures::ean13("400638133393").unwrap();
        assert_eq!(m.len(), EAN13_MODULES);
        assert_eq!(decode_ean13(&m).as_deref(), Some("4006381333931"));
    }

    #[test]
    fn test_decode_ean8() {
        let m = fixtures::ean8("9638507").unwrap();
        assert_eq!(m.len(), EAN8_MODULES);
        assert_eq!(decode_ean8(&m).as_deref(), Some("96385074"));
        assert_eq!(decode_ean13(&m), None);
    }

    #[test]
    fn test_corrupted_check_digit() {
        let mut m = fixtures::ean13("400638133393").unwrap();
        // Swap the check digit (last right-half digit) from 1 to 2
        let r2 = !L_PATTERNS[2] & 0x7f;
        for k in 0..7 {
            m[85 + k] = (r2 >> (6 - k)) & 1 == 1;
        }
        assert_eq!(decode_ean13(&m), None);
    }

    #[test]
    fn test_resample_stretched() {
        let m = fixtures::ean13("400638133393").unwrap();
        let doubled: Vec<bool> = m.iter().flat_map(|&b| [b, b]).collect();
        assert_eq!(decode_ean13(&doubled).as_deref(), Some("4006381333931"));

        let too_wide: Vec<bool> = m.iter().flat_map(|&b| [b, b, b, b]).collect();
        assert!(resample(&too_wide, EAN13_MODULES).is_none());
    }

    #[test]
    fn test_addon() {
        let m = fixtures::ean13_with_addon("400638133393", "12").unwrap();
        assert_eq!(decode_ean13(&m).as_deref(), Some("4006381333931+12"));

        let m = fixtures::ean13_with_addon("400638133393", "52495").unwrap();
        assert_eq!(decode_ean13(&m).as_deref(), Some("4006381333931+52495"));
    }

    #[test]
    fn test_addon_parity() {
        assert_eq!(addon_parity(&[1, 2]), Some(0b00));
        assert_eq!(addon_parity(&[1, 3]), Some(0b01));
        // 5,2,4,9,5: 3*(5+4+5) + 9*(2+9) = 141 -> 1
        assert_eq!(addon_parity(&[5, 2, 4, 9, 5]), Some(ADDON5_PARITY[1]));
        assert_eq!(addon_parity(&[1, 2, 3]), None);
    }
}
