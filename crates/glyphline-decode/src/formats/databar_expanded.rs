//! GS1 DataBar Expanded decoder (linear form)
//!
//! Element widths are grouped into pairs of 8-element data characters
//! around 5-element finders. The first character is a mod-211 check over
//! the others. Each data character carries 12 bits; the bit stream opens
//! with a linkage flag and an encoding method header, then holds the
//! compressed element string.
//!
//! Encoding methods:
//!
//! | Header      | Method | Content                                   |
//! |-------------|--------|-------------------------------------------|
//! | `1`         | 1      | (01) GTIN, general field                  |
//! | `00`        | 2      | general field only                        |
//! | `0100`      | 3      | (01) GTIN, (3103) weight                  |
//! | `0101`      | 4      | (01) GTIN, (3202)/(3203) weight           |
//! | `01100`     | 5      | (01) GTIN, (392x) price, general field    |
//! | `01101`     | 6      | (01) GTIN, (393x) price, general field    |
//! | `0111000`.. | 7-14   | (01) GTIN, (310x)/(320x) weight, date     |

use std::sync::LazyLock;

use super::code128::GROUP_SEPARATOR;
use super::databar::{ElementSet, element_widths, split_odd_even};
use super::itf::itf14_check_digit;

const G_SUM: [u32; 5] = [0, 348, 1388, 2948, 3988];
const GROUP_MAX: [u32; 5] = [347, 1387, 2947, 3987, 4191];
const T_EVEN: [u32; 5] = [4, 20, 52, 104, 204];
const MODULES_ODD: [u32; 5] = [12, 10, 8, 6, 4];
const MODULES_EVEN: [u32; 5] = [5, 7, 9, 11, 13];
const WIDEST_ODD: [u32; 5] = [7, 5, 4, 3, 1];
const WIDEST_EVEN: [u32; 5] = [2, 4, 5, 6, 8];

/// Finder sequences by symbol size; finder codes run A1 = 1 .. F2 = 12
const FINDER_SEQUENCES: [&[u32]; 10] = [
    &[1, 2],
    &[1, 4, 3],
    &[1, 6, 3, 8],
    &[1, 10, 3, 8, 5],
    &[1, 10, 3, 8, 7, 12],
    &[1, 10, 3, 8, 9, 12, 11],
    &[1, 2, 3, 4, 5, 6, 7, 8],
    &[1, 2, 3, 4, 5, 6, 7, 10, 9],
    &[1, 2, 3, 4, 5, 6, 7, 10, 11, 12],
    &[1, 2, 3, 4, 5, 8, 7, 10, 9, 12, 11],
];

/// Checksum weights, 3^k mod 211
static CHECKSUM_WEIGHTS: LazyLock<[u32; 184]> = LazyLock::new(|| {
    let mut weights = [1u32; 184];
    for k in 1..184 {
        weights[k] = weights[k - 1] * 3 % 211;
    }
    weights
});

const CHAR_ELEMENTS: usize = 8;
const DATE_NONE: u32 = 38400;

/// Weight row for data character `index` of a symbol with `data_chars`
/// characters, following the finder each character sits next to
fn weight_row(data_chars: usize, index: usize) -> Option<usize> {
    if index == 0 {
        return Some(0);
    }
    let sequence = FINDER_SEQUENCES.get((data_chars - 2) / 2)?;
    let finder = *sequence.get(index.div_ceil(2))? as usize;
    Some(if index % 2 == 1 {
        2 * finder - 3
    } else {
        2 * finder - 2
    })
}

fn data_character(widths: &[u32; CHAR_ELEMENTS]) -> Option<u32> {
    let (odd, even) = split_odd_even(widths);
    (0..5).find_map(|g| {
        let v_odd = ElementSet::new(MODULES_ODD[g], WIDEST_ODD[g], false).value(&odd)?;
        let v_even = ElementSet::new(MODULES_EVEN[g], WIDEST_EVEN[g], true).value(&even)?;
        let value = v_odd * T_EVEN[g] + v_even + G_SUM[g];
        (G_SUM[g]..=GROUP_MAX[g]).contains(&value).then_some(value)
    })
}

/// Symbol character counts whose layout spans exactly `elements` widths
fn total_char_candidates(elements: usize) -> impl Iterator<Item = usize> {
    (2..=21).filter(move |&t: &usize| t.div_ceil(2) * 5 + t * CHAR_ELEMENTS + 4 == elements)
}

/// Pulls the data character widths out of the element layout
///
/// Odd characters read forward after a finder; even characters sit
/// mirrored before one.
fn data_widths(elements: &[u32], data_chars: usize) -> Option<Vec<[u32; CHAR_ELEMENTS]>> {
    (0..data_chars)
        .map(|i| {
            let mut widths = [0u32; CHAR_ELEMENTS];
            if i % 2 == 1 {
                let base = ((i - 1) / 2) * 21 + 23;
                widths.copy_from_slice(elements.get(base..base + CHAR_ELEMENTS)?);
            } else {
                let base = (i / 2) * 21 + 15;
                let window = elements.get(base..base + CHAR_ELEMENTS)?;
                for (w, &e) in widths.iter_mut().zip(window.iter().rev()) {
                    *w = e;
                }
            }
            Some(widths)
        })
        .collect()
}

fn valid_checksum(chars: &[[u32; CHAR_ELEMENTS]], check: u32) -> bool {
    let weights = &*CHECKSUM_WEIGHTS;
    let data_chars = chars.len();
    let mut sum = 0u32;
    for (i, widths) in chars.iter().enumerate() {
        let Some(row) = weight_row(data_chars, i) else {
            return false;
        };
        for (j, &w) in widths.iter().enumerate() {
            sum += w * weights[row * CHAR_ELEMENTS + j];
        }
    }
    // Symbols shorter than four characters have no valid check value
    let Some(size_term) = (data_chars + 1).checked_sub(4) else {
        return false;
    };
    check == 211 * size_term as u32 + sum % 211
}

fn try_decode(elements: &[u32], total_chars: usize) -> Option<String> {
    let data_chars = total_chars - 1;
    let n = elements.len();
    if n < 10 || elements[0] != 1 || elements[1] != 1 || elements[n - 1] != 1 || elements[n - 2] != 1 {
        return None;
    }

    let chars = data_widths(elements, data_chars)?;
    let values = chars
        .iter()
        .map(data_character)
        .collect::<Option<Vec<u32>>>()?;
    let mut check_widths = [0u32; CHAR_ELEMENTS];
    check_widths.copy_from_slice(&elements[2..2 + CHAR_ELEMENTS]);
    let check = data_character(&check_widths)?;
    if !valid_checksum(&chars, check) {
        return None;
    }

    let bits: Vec<bool> = values
        .iter()
        .flat_map(|&v| (0..12).rev().map(move |b| (v >> b) & 1 == 1))
        .collect();
    decode_payload(&BitStream::new(&bits))
}

/// Decodes a GS1 DataBar Expanded symbol to its GS1 element string
///
/// AIs are not bracketed; variable-length fields end with U+001D.
pub fn decode_databar_expanded(modules: &[bool]) -> Option<String> {
    let mut elements = element_widths(modules);
    if elements.len() < 20 {
        return None;
    }
    // The trailing guard space is lost to trimming when the layout ends light
    if total_char_candidates(elements.len()).next().is_none() && modules.last() == Some(&true) {
        elements.push(1);
    }
    total_char_candidates(elements.len()).find_map(|t| try_decode(&elements, t))
}

/// MSB-first reader over the payload bits; reads past the end yield zeros
struct BitStream<'a> {
    bits: &'a [bool],
}

impl<'a> BitStream<'a> {
    fn new(bits: &'a [bool]) -> Self {
        Self { bits }
    }

    fn len(&self) -> usize {
        self.bits.len()
    }

    fn read(&self, pos: usize, count: usize) -> u32 {
        (pos..pos + count).fold(0u32, |v, i| {
            (v << 1) | u32::from(self.bits.get(i).copied().unwrap_or(false))
        })
    }

    fn bit(&self, pos: usize) -> Option<bool> {
        self.bits.get(pos).copied()
    }

    /// Returns whether the bits at `pos` spell `pattern` (a string of 0/1)
    fn matches(&self, pos: usize, pattern: &str) -> bool {
        self.bits
            .get(pos..pos + pattern.len())
            .is_some_and(|window| window.iter().zip(pattern.bytes()).all(|(&b, p)| b == (p == b'1')))
    }
}

fn encoding_method(bits: &BitStream<'_>) -> Option<(u32, usize)> {
    if bits.bit(1)? {
        return Some((1, 4));
    }
    if !bits.bit(2)? {
        return Some((2, 5));
    }
    if !bits.bit(3)? {
        let method = if bits.read(1, 4) == 4 { 3 } else { 4 };
        return Some((method, 5));
    }
    match bits.read(1, 5) {
        12 => return Some((5, 8)),
        13 => return Some((6, 8)),
        _ => {}
    }
    let seven = bits.read(1, 7);
    (56..=63).contains(&seven).then_some((7 + seven - 56, 8))
}

fn push_fixed(out: &mut String, value: u32, width: usize) {
    out.push_str(&format!("{value:0width$}"));
}

/// Reads a compressed GTIN: an optional 4-bit first digit and four 10-bit
/// groups, then appends (01), the 13 digits, and the computed check digit
fn read_gtin(bits: &BitStream<'_>, pos: &mut usize, first_digit: Option<u8>, out: &mut String) -> Option<()> {
    let first = match first_digit {
        Some(d) => d,
        None => {
            let d = bits.read(*pos, 4);
            if *pos + 44 > bits.len() || d > 9 {
                return None;
            }
            *pos += 4;
            d as u8
        }
    };
    if *pos + 40 > bits.len() {
        return None;
    }

    let mut digits = Vec::with_capacity(13);
    digits.push(first);
    for _ in 0..4 {
        let group = bits.read(*pos, 10);
        if group > 999 {
            return None;
        }
        *pos += 10;
        digits.extend([(group / 100) as u8, (group / 10 % 10) as u8, (group % 10) as u8]);
    }

    out.push_str("01");
    out.extend(digits.iter().map(|&d| char::from(b'0' + d)));
    out.push(char::from(b'0' + itf14_check_digit(&digits)));
    Some(())
}

fn read_weight_and_date(bits: &BitStream<'_>, pos: &mut usize, method: u32, out: &mut String) -> Option<()> {
    if *pos + 36 > bits.len() {
        return None;
    }
    let weight_ai = if method % 2 == 1 { "310" } else { "320" };
    let date_ai = match method {
        7 | 8 => "11",
        9 | 10 => "13",
        11 | 12 => "15",
        13 | 14 => "17",
        _ => return None,
    };

    let weight = bits.read(*pos, 20);
    *pos += 20;
    out.push_str(weight_ai);
    push_fixed(out, weight / 100_000, 1);
    push_fixed(out, weight % 100_000, 6);

    let mut date = bits.read(*pos, 16);
    *pos += 16;
    if date != DATE_NONE {
        let day = date % 32;
        date /= 32;
        let month = date % 12 + 1;
        let year = date / 12;
        out.push_str(date_ai);
        push_fixed(out, year, 2);
        push_fixed(out, month, 2);
        push_fixed(out, day, 2);
    }
    Some(())
}

fn decode_payload(bits: &BitStream<'_>) -> Option<String> {
    if bits.len() < 4 {
        return None;
    }
    let (method, mut pos) = encoding_method(bits)?;
    let mut out = String::new();

    match method {
        1 => {
            read_gtin(bits, &mut pos, None, &mut out)?;
            general_field(bits, pos, &mut out);
        }
        2 => general_field(bits, pos, &mut out),
        3 | 4 => {
            read_gtin(bits, &mut pos, Some(9), &mut out)?;
            if pos + 15 > bits.len() {
                return None;
            }
            let weight = bits.read(pos, 15);
            if method == 3 {
                out.push_str("3103");
                push_fixed(&mut out, weight, 6);
            } else if weight < 10_000 {
                out.push_str("3202");
                push_fixed(&mut out, weight, 6);
            } else {
                out.push_str("3203");
                push_fixed(&mut out, weight - 10_000, 6);
            }
        }
        5 | 6 => {
            read_gtin(bits, &mut pos, Some(9), &mut out)?;
            let field = if method == 5 { 2 } else { 12 };
            if pos + field > bits.len() {
                return None;
            }
            out.push_str(if method == 5 { "392" } else { "393" });
            push_fixed(&mut out, bits.read(pos, 2), 1);
            pos += 2;
            if method == 6 {
                push_fixed(&mut out, bits.read(pos, 10), 3);
                pos += 10;
            }
            general_field(bits, pos, &mut out);
        }
        _ => {
            read_gtin(bits, &mut pos, Some(9), &mut out)?;
            read_weight_and_date(bits, &mut pos, method, &mut out)?;
        }
    }
    Some(out)
}

/// General-purpose field encodation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldMode {
    Numeric,
    Alpha,
    Iso,
}

/// Decodes the general-purpose field from `pos` to the end of the stream
///
/// An unrecognised code ends the field; what was decoded so far is kept.
fn general_field(bits: &BitStream<'_>, mut pos: usize, out: &mut String) {
    let size = bits.len();
    let mut mode = FieldMode::Numeric;
    while pos < size {
        let step = match mode {
            FieldMode::Numeric => numeric_step(bits, pos, out, &mut mode),
            FieldMode::Alpha | FieldMode::Iso => alpha_step(bits, pos, out, &mut mode),
        };
        match step {
            Some(used) => pos += used,
            None => break,
        }
    }
}

fn digit_or_separator(value: u32) -> char {
    if value == 10 {
        GROUP_SEPARATOR
    } else {
        char::from(b'0' + value as u8)
    }
}

/// Decodes one numeric-mode code, returning the bits it used
fn numeric_step(bits: &BitStream<'_>, pos: usize, out: &mut String, mode: &mut FieldMode) -> Option<usize> {
    let size = bits.len();
    if bits.matches(pos, "0000") {
        if pos + 4 >= size {
            return None;
        }
        *mode = FieldMode::Alpha;
        return Some(4);
    }

    let remaining = size - pos;
    if remaining < 7 {
        if remaining >= 4 {
            let v = bits.read(pos, 4);
            if v != 0 {
                out.push(if v == 10 { GROUP_SEPARATOR } else { char::from(b'0' + (v - 1) as u8) });
            }
        }
        return None;
    }

    let value = bits.read(pos, 7).checked_sub(8)?;
    out.push(digit_or_separator(value / 11));
    out.push(digit_or_separator(value % 11));
    Some(7)
}

const ISO_PUNCTUATION: [char; 21] = [
    '!', '"', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', ':', ';', '<', '=', '>', '?',
    '_', ' ',
];

/// Decodes one alphanumeric- or ISO-mode code, returning the bits it used
fn alpha_step(bits: &BitStream<'_>, pos: usize, out: &mut String, mode: &mut FieldMode) -> Option<usize> {
    let size = bits.len();
    let iso = *mode == FieldMode::Iso;
    if bits.matches(pos, "000") {
        if pos + 3 >= size {
            return None;
        }
        *mode = FieldMode::Numeric;
        return Some(3);
    }
    if bits.matches(pos, "00100") {
        if pos + 5 >= size {
            return None;
        }
        *mode = if iso { FieldMode::Alpha } else { FieldMode::Iso };
        return Some(5);
    }

    if size - pos < 5 {
        return None;
    }
    match bits.read(pos, 5) {
        15 => {
            out.push(GROUP_SEPARATOR);
            return Some(5);
        }
        v @ 5..=14 => {
            out.push(char::from(b'0' + (v - 5) as u8));
            return Some(5);
        }
        _ => {}
    }

    if iso {
        if size - pos >= 7 {
            match bits.read(pos, 7) {
                v @ 64..=89 => {
                    out.push(char::from((v + 1) as u8));
                    return Some(7);
                }
                v @ 90..=115 => {
                    out.push(char::from((v + 7) as u8));
                    return Some(7);
                }
                _ => {}
            }
        }
        if size - pos < 8 {
            return None;
        }
        let c = *ISO_PUNCTUATION.get(bits.read(pos, 8).checked_sub(232)? as usize)?;
        out.push(c);
        return Some(8);
    }

    if size - pos < 6 {
        return None;
    }
    let c = match bits.read(pos, 6) {
        v @ 32..=57 => char::from(b'A' + (v - 32) as u8),
        58 => '*',
        59 => ',',
        60 => '-',
        61 => '.',
        62 => '/',
        _ => return None,
    };
    out.push(c);
    Some(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    fn stream(bits: &str) -> Vec<bool> {
        bits.bytes().map(|b| b == b'1').collect()
    }

    #[test]
    fn test_weight_rows() {
        // 4 data characters use finders A1 B2 B1
        assert_eq!(weight_row(4, 0), Some(0));
        assert_eq!(weight_row(4, 1), Some(5));
        assert_eq!(weight_row(4, 2), Some(6));
        assert_eq!(weight_row(4, 3), Some(3));
        assert_eq!(weight_row(4, 4), Some(4));
    }

    #[test]
    fn test_candidates() {
        // 4 symbol characters: 2 finders, 4 characters, 4 guard elements
        assert_eq!(total_char_candidates(46).collect::<Vec<_>>(), vec![4]);
        assert_eq!(total_char_candidates(47).count(), 0);
    }

    #[test]
    fn test_encoding_method() {
        let bits = stream("01000000");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((1, 4)));
        let bits = stream("00000000");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((2, 5)));
        let bits = stream("00100000");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((3, 5)));
        let bits = stream("00101000");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((4, 5)));
        let bits = stream("00110000");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((5, 8)));
        let bits = stream("00111000");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((7, 8)));
        let bits = stream("00111111");
        assert_eq!(encoding_method(&BitStream::new(&bits)), Some((14, 8)));
    }

    #[test]
    fn test_general_field_modes() {
        // numeric "12", latch to alpha, "A", latch to ISO, "a"
        let bits = stream(concat!(
            "0010101", // (1*11 + 2) + 8 = 21
            "0000",    // alpha
            "100000",  // A
            "00100",   // ISO
            "1011010", // a = 90 + 7
        ));
        let mut out = String::new();
        general_field(&BitStream::new(&bits), 0, &mut out);
        assert_eq!(out, "12Aa");
    }

    #[test]
    fn test_numeric_separator() {
        // 10 * 11 + 1 + 8 = 119: FNC1 then "1"
        let bits = stream("1110111");
        let mut out = String::new();
        general_field(&BitStream::new(&bits), 0, &mut out);
        assert_eq!(out, "\u{1D}1");
    }

    #[test]
    fn test_decode_gtin_method() {
        let m = fixtures::databar_expanded(&fixtures::expanded_gtin_bits("0101234567890")).unwrap();
        assert_eq!(
            decode_databar_expanded(&m).as_deref(),
            Some("0101012345678904")
        );
    }

    #[test]
    fn test_decode_general_method() {
        // Method 2 header, numeric "10" and "12", then latch to alpha
        let bits = concat!("00000", "0010011", "0010101", "0000", "00100");
        let m = fixtures::databar_expanded(bits).unwrap();
        assert_eq!(decode_databar_expanded(&m).as_deref(), Some("1012"));
    }

    #[test]
    fn test_corrupt_check_character() {
        let bits = fixtures::expanded_gtin_bits("0101234567890");
        let mut widths = fixtures::databar_expanded_widths(&bits).unwrap();
        let i = (2..9).find(|&i| widths[i] != widths[i + 1]).unwrap();
        widths.swap(i, i + 1);
        let m = fixtures::modules_from_widths(&widths[1..]);
        assert_eq!(decode_databar_expanded(&m), None);
    }
}
