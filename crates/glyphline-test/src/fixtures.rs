//! Module-sequence builders for every supported symbology
//!
//! These are test-only encoders. Each returns the trimmed module sequence
//! (`true` = dark) a clean scan of the symbol would produce: no quiet
//! zones, first and last module dark. Run-width symbologies use a narrow
//! width of 1 and a wide width of 2 or 3 modules.
//!
//! Builders validate their input and return [`TestError::FixtureInput`]
//! instead of encoding something the symbology cannot represent.

use crate::error::{TestError, TestResult};

fn invalid(symbology: &'static str, input: &str, reason: &'static str) -> TestError {
    TestError::FixtureInput {
        symbology,
        input: input.to_string(),
        reason,
    }
}

fn parse_digits(symbology: &'static str, input: &str, len: Option<usize>) -> TestResult<Vec<u8>> {
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(symbology, input, "not all digits"));
    }
    if len.is_some_and(|n| n != input.len()) {
        return Err(invalid(symbology, input, "wrong digit count"));
    }
    Ok(input.bytes().map(|b| b - b'0').collect())
}

/// Renders alternating element widths, the first element dark
pub fn modules_from_widths(widths: &[u32]) -> Vec<bool> {
    widths
        .iter()
        .enumerate()
        .flat_map(|(i, &w)| std::iter::repeat_n(i % 2 == 0, w as usize))
        .collect()
}

fn push_bits(out: &mut Vec<bool>, value: u32, width: usize) {
    out.extend((0..width).rev().map(|bit| (value >> bit) & 1 == 1));
}

fn push_pattern(out: &mut Vec<bool>, pattern: &str) {
    out.extend(pattern.bytes().map(|b| b == b'1'));
}

// ---------------------------------------------------------------------------
// EAN / UPC
// ---------------------------------------------------------------------------

const L_PATTERNS: [u32; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, 0b0110001, 0b0101111, 0b0111011,
    0b0110111, 0b0001011,
];
const G_PATTERNS: [u32; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101, 0b0111001, 0b0000101, 0b0010001,
    0b0001001, 0b0010111,
];
const FIRST_DIGIT_PARITY: [u32; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];
const ADDON5_PARITY: [u32; 10] = [
    0b11000, 0b10100, 0b10010, 0b10001, 0b01100, 0b00110, 0b00011, 0b01010, 0b01001, 0b00101,
];
const UPCE_PARITY: [u32; 10] = [
    0b111000, 0b110100, 0b110010, 0b110001, 0b101100, 0b100110, 0b100011, 0b101010, 0b101001,
    0b100101,
];

/// Light modules between a main symbol and its add-on
const ADDON_GAP: usize = 9;

fn push_digit(out: &mut Vec<bool>, digit: u8, even: bool) {
    let pattern = if even {
        G_PATTERNS[usize::from(digit)]
    } else {
        L_PATTERNS[usize::from(digit)]
    };
    push_bits(out, pattern, 7);
}

fn push_right_digit(out: &mut Vec<bool>, digit: u8) {
    push_bits(out, !L_PATTERNS[usize::from(digit)] & 0x7f, 7);
}

/// Mod-10 check digit weighting the rightmost content digit by 3
fn mod10_weight3(content: &[u8]) -> u8 {
    let sum: u32 = content
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Builds an EAN-13 symbol from 12 digits; the check digit is appended
pub fn ean13(digits: &str) -> TestResult<Vec<bool>> {
    let mut d = parse_digits("EAN-13", digits, Some(12))?;
    d.push(mod10_weight3(&d));

    let parity = FIRST_DIGIT_PARITY[usize::from(d[0])];
    let mut out = Vec::with_capacity(95);
    push_pattern(&mut out, "101");
    for (i, &digit) in d[1..7].iter().enumerate() {
        push_digit(&mut out, digit, (parity >> (5 - i)) & 1 == 1);
    }
    push_pattern(&mut out, "01010");
    for &digit in &d[7..] {
        push_right_digit(&mut out, digit);
    }
    push_pattern(&mut out, "101");
    Ok(out)
}

/// Builds an EAN-8 symbol from 7 digits; the check digit is appended
pub fn ean8(digits: &str) -> TestResult<Vec<bool>> {
    let mut d = parse_digits("EAN-8", digits, Some(7))?;
    d.push(mod10_weight3(&d));

    let mut out = Vec::with_capacity(67);
    push_pattern(&mut out, "101");
    for &digit in &d[..4] {
        push_digit(&mut out, digit, false);
    }
    push_pattern(&mut out, "01010");
    for &digit in &d[4..] {
        push_right_digit(&mut out, digit);
    }
    push_pattern(&mut out, "101");
    Ok(out)
}

/// Builds a UPC-A symbol from 11 digits; the check digit is appended
pub fn upca(digits: &str) -> TestResult<Vec<bool>> {
    parse_digits("UPC-A", digits, Some(11))?;
    ean13(&format!("0{digits}"))
}

fn expand_upce(ns: u8, d: &[u8]) -> Vec<u8> {
    let body: [u8; 10] = match d[5] {
        0..=2 => [d[0], d[1], d[5], 0, 0, 0, 0, d[2], d[3], d[4]],
        3 => [d[0], d[1], d[2], 0, 0, 0, 0, 0, d[3], d[4]],
        4 => [d[0], d[1], d[2], d[3], 0, 0, 0, 0, 0, d[4]],
        _ => [d[0], d[1], d[2], d[3], d[4], 0, 0, 0, 0, d[5]],
    };
    std::iter::once(ns).chain(body).collect()
}

/// Builds a UPC-E symbol from the number system (0 or 1) and six digits
///
/// The check digit is computed on the UPC-A expansion and carried in the
/// parity pattern.
pub fn upce(digits: &str) -> TestResult<Vec<bool>> {
    let d = parse_digits("UPC-E", digits, Some(7))?;
    let ns = d[0];
    if ns > 1 {
        return Err(invalid("UPC-E", digits, "number system must be 0 or 1"));
    }
    let check = mod10_weight3(&expand_upce(ns, &d[1..]));
    let ns0 = UPCE_PARITY[usize::from(check)];
    let parity = if ns == 0 { ns0 } else { !ns0 & 0x3f };

    let mut out = Vec::with_capacity(51);
    push_pattern(&mut out, "101");
    for (i, &digit) in d[1..].iter().enumerate() {
        push_digit(&mut out, digit, (parity >> (5 - i)) & 1 == 1);
    }
    push_pattern(&mut out, "010101");
    Ok(out)
}

fn addon(digits: &str) -> TestResult<Vec<bool>> {
    let d = parse_digits("EAN add-on", digits, None)?;
    let (parity, count) = match d.len() {
        2 => ((u32::from(d[0]) * 10 + u32::from(d[1])) % 4, 2),
        5 => {
            let sum: u32 = d
                .iter()
                .enumerate()
                .map(|(i, &v)| u32::from(v) * if i % 2 == 0 { 3 } else { 9 })
                .sum();
            (ADDON5_PARITY[(sum % 10) as usize], 5)
        }
        _ => return Err(invalid("EAN add-on", digits, "add-on must be 2 or 5 digits")),
    };

    let mut out = Vec::new();
    push_pattern(&mut out, "1011");
    for (i, &digit) in d.iter().enumerate() {
        if i > 0 {
            push_pattern(&mut out, "01");
        }
        push_digit(&mut out, digit, (parity >> (count - 1 - i)) & 1 == 1);
    }
    Ok(out)
}

fn with_addon(mut main: Vec<bool>, digits: &str) -> TestResult<Vec<bool>> {
    let addon = addon(digits)?;
    main.extend(std::iter::repeat_n(false, ADDON_GAP));
    main.extend(addon);
    Ok(main)
}

/// Builds an EAN-13 symbol followed by a 2- or 5-digit add-on
pub fn ean13_with_addon(digits: &str, addon_digits: &str) -> TestResult<Vec<bool>> {
    with_addon(ean13(digits)?, addon_digits)
}

/// Builds a UPC-E symbol followed by a 2- or 5-digit add-on
pub fn upce_with_addon(digits: &str, addon_digits: &str) -> TestResult<Vec<bool>> {
    with_addon(upce(digits)?, addon_digits)
}

// ---------------------------------------------------------------------------
// 2 of 5 family
// ---------------------------------------------------------------------------

const TWO_OF_FIVE_KEYS: [u32; 10] = [
    0b00110, 0b10001, 0b01001, 0b11000, 0b00101, 0b10100, 0b01100, 0b00011, 0b10010, 0b01010,
];

const WIDE: u32 = 3;

fn width(wide: bool) -> u32 {
    if wide { WIDE } else { 1 }
}

fn key_widths(digit: u8) -> [u32; 5] {
    let key = TWO_OF_FIVE_KEYS[usize::from(digit)];
    std::array::from_fn(|i| width((key >> (4 - i)) & 1 == 1))
}

/// Builds an Interleaved 2 of 5 symbol from an even number of digits
pub fn itf(digits: &str) -> TestResult<Vec<bool>> {
    let d = parse_digits("ITF", digits, None)?;
    if d.is_empty() || d.len() % 2 != 0 {
        return Err(invalid("ITF", digits, "needs an even, nonzero digit count"));
    }

    let mut widths = vec![1, 1, 1, 1];
    for pair in d.chunks_exact(2) {
        let bars = key_widths(pair[0]);
        let spaces = key_widths(pair[1]);
        for (bar, space) in bars.into_iter().zip(spaces) {
            widths.extend([bar, space]);
        }
    }
    widths.extend([WIDE, 1, 1]);
    Ok(modules_from_widths(&widths))
}

/// Discrete 2 of 5 variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoOfFive {
    Industrial,
    Matrix,
    Iata,
}

impl TwoOfFive {
    fn framing(self) -> (&'static [bool], &'static [bool]) {
        match self {
            TwoOfFive::Industrial => (&[true, true, false], &[true, false, true]),
            TwoOfFive::Matrix => (
                &[true, false, false, false, false],
                &[true, false, false, false, false],
            ),
            TwoOfFive::Iata => (&[false, false, false], &[true, false, false]),
        }
    }
}

/// Builds a discrete 2 of 5 symbol; every space is narrow
pub fn two_of_five(variant: TwoOfFive, digits: &str) -> TestResult<Vec<bool>> {
    let d = parse_digits("2 of 5", digits, None)?;
    if d.is_empty() {
        return Err(invalid("2 of 5", digits, "needs at least one digit"));
    }
    let (start, stop) = variant.framing();

    let mut bars: Vec<u32> = start.iter().map(|&w| width(w)).collect();
    for &digit in &d {
        bars.extend(key_widths(digit));
    }
    bars.extend(stop.iter().map(|&w| width(w)));

    let mut widths = Vec::with_capacity(bars.len() * 2);
    for (i, bar) in bars.into_iter().enumerate() {
        if i > 0 {
            widths.push(1);
        }
        widths.push(bar);
    }
    Ok(modules_from_widths(&widths))
}

// ---------------------------------------------------------------------------
// Code 39 / Code 32 / Code 93
// ---------------------------------------------------------------------------

const CODE39_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

const CODE39_PATTERNS: [&str; 44] = [
    "111221211", "211211112", "112211112", "212211111", "111221112", "211221111", "112221111",
    "111211212", "211211211", "112211211", "211112112", "112112112", "212112111", "111122112",
    "211122111", "112122111", "111112212", "211112211", "112112211", "111122211", "211111122",
    "112111122", "212111121", "111121122", "211121121", "112121121", "111111222", "211111221",
    "112111221", "111121221", "221111112", "122111112", "222111111", "121121112", "221121111",
    "122121111", "121111212", "221111211", "122111211", "121212111", "121211121", "121112121",
    "111212121", "121121211",
];

/// Full ASCII shift pair: shift index in `$ % / +` order, then a letter
fn full_ascii_pair(ascii: u8) -> Option<(usize, char)> {
    let letter = |base: u8, offset: u8| char::from(base + offset);
    let pair = match ascii {
        0 => (1, 'U'),
        1..=26 => (0, letter(b'A', ascii - 1)),
        27..=31 => (1, letter(b'A', ascii - 27)),
        b'!'..=b',' => (2, letter(b'A', ascii - b'!')),
        b'/' => (2, 'O'),
        b':' => (2, 'Z'),
        b';'..=b'?' => (1, letter(b'F', ascii - b';')),
        b'@' => (1, 'V'),
        b'['..=b'_' => (1, letter(b'K', ascii - b'[')),
        b'`' => (1, 'W'),
        b'a'..=b'z' => (3, letter(b'A', ascii - b'a')),
        b'{'..=127 => (1, letter(b'P', ascii - b'{')),
        _ => return None,
    };
    Some(pair)
}

fn code39_symbol(chars: &[char]) -> TestResult<Vec<bool>> {
    let mut out = Vec::with_capacity(chars.len() * 13);
    for (i, &c) in chars.iter().enumerate() {
        let index = if c == '*' {
            43
        } else {
            CODE39_ALPHABET
                .find(c)
                .ok_or_else(|| invalid("Code 39", &c.to_string(), "not in the alphabet"))?
        };
        if i > 0 {
            out.push(false);
        }
        let widths: Vec<u32> = CODE39_PATTERNS[index].bytes().map(|b| u32::from(b - b'0')).collect();
        out.extend(modules_from_widths(&widths));
    }
    Ok(out)
}

fn code39_check(chars: &[char]) -> Option<char> {
    let sum: usize = chars
        .iter()
        .map(|&c| CODE39_ALPHABET.find(c))
        .sum::<Option<usize>>()?;
    CODE39_ALPHABET.chars().nth(sum % 43)
}

/// Builds a Code 39 symbol framed by `*`, optionally with the mod-43 check
pub fn code39(text: &str, with_check: bool) -> TestResult<Vec<bool>> {
    let mut chars: Vec<char> = text.chars().collect();
    if with_check {
        let check = code39_check(&chars).ok_or_else(|| invalid("Code 39", text, "not in the alphabet"))?;
        chars.push(check);
    }
    chars.insert(0, '*');
    chars.push('*');
    code39_symbol(&chars)
}

/// Builds a Code 39 full ASCII symbol framed by `*`
pub fn code39_full_ascii(text: &str) -> TestResult<Vec<bool>> {
    let shifts = ['$', '%', '/', '+'];
    let mut chars = vec!['*'];
    for c in text.chars() {
        if c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | ' ') {
            chars.push(c);
            continue;
        }
        let (shift, letter) = u8::try_from(c)
            .ok()
            .and_then(full_ascii_pair)
            .ok_or_else(|| invalid("Code 39", text, "not ASCII"))?;
        chars.extend([shifts[shift], letter]);
    }
    chars.push('*');
    code39_symbol(&chars)
}

/// Builds Code 39 characters without the `*` delimiters
pub fn code39_raw(text: &str) -> TestResult<Vec<bool>> {
    let chars: Vec<char> = text.chars().collect();
    code39_symbol(&chars)
}

const CODE32_ALPHABET: &[u8] = b"0123456789BCDFGHJKLMNPQRSTUVWXYZ";

/// Builds a Code 32 symbol from the first eight digits of the code
pub fn code32(digits: &str) -> TestResult<Vec<bool>> {
    let mut d = parse_digits("Code 32", digits, Some(8))?;
    let sum: u32 = d
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let value = u32::from(v) * if i % 2 == 0 { 1 } else { 2 };
            value / 10 + value % 10
        })
        .sum();
    d.push((sum % 10) as u8);

    let mut value = d.iter().fold(0u32, |v, &digit| v * 10 + u32::from(digit));
    let mut base32 = [0u8; 6];
    for slot in base32.iter_mut().rev() {
        *slot = CODE32_ALPHABET[(value % 32) as usize];
        value /= 32;
    }
    let text: String = base32.iter().map(|&b| char::from(b)).collect();
    code39(&text, false)
}

const CODE93_NATIVE: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

const CODE93_PATTERNS: [u32; 48] = [
    276, 328, 324, 322, 296, 292, 290, 336, 274, 266, 424, 420, 418, 404, 402, 394, 360, 356, 354,
    308, 282, 344, 332, 326, 300, 278, 436, 434, 428, 422, 406, 410, 364, 358, 310, 314, 302, 468,
    466, 458, 366, 374, 430, 294, 474, 470, 306, 350,
];

const CODE93_START_STOP: usize = 47;

fn code93_check(values: &[usize], max_weight: usize) -> usize {
    values
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &v)| v * (i % max_weight + 1))
        .sum::<usize>()
        % 47
}

/// Builds a Code 93 symbol with C and K check characters
///
/// Characters outside the native alphabet are sent as shift pairs.
pub fn code93(text: &str) -> TestResult<Vec<bool>> {
    let mut values = Vec::with_capacity(text.len() * 2 + 2);
    for c in text.chars() {
        if let Some(v) = CODE93_NATIVE.find(c) {
            values.push(v);
            continue;
        }
        let (shift, letter) = u8::try_from(c)
            .ok()
            .and_then(full_ascii_pair)
            .ok_or_else(|| invalid("Code 93", text, "not ASCII"))?;
        values.push(43 + shift);
        values.push(CODE93_NATIVE.find(letter).unwrap_or(0));
    }
    let c = code93_check(&values, 20);
    values.push(c);
    let k = code93_check(&values, 15);
    values.push(k);

    let mut out = Vec::with_capacity((values.len() + 2) * 9 + 1);
    push_bits(&mut out, CODE93_PATTERNS[CODE93_START_STOP], 9);
    for v in values {
        push_bits(&mut out, CODE93_PATTERNS[v], 9);
    }
    push_bits(&mut out, CODE93_PATTERNS[CODE93_START_STOP], 9);
    out.push(true);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Codabar / MSI / Code 11 / Plessey / Patch / Telepen / Pharmacode
// ---------------------------------------------------------------------------

const CODABAR_CHARS: &str = "0123456789-$:/.+ABCD";
const CODABAR_KEYS: [u32; 20] = [
    0b0000011, 0b0000110, 0b0001001, 0b1100000, 0b0010010, 0b1000010, 0b0100001, 0b0100100,
    0b0110000, 0b1001000, 0b0001100, 0b0011000, 0b1000101, 0b1010001, 0b1010100, 0b0010101,
    0b0011010, 0b0101001, 0b0001011, 0b0001110,
];

/// Renders keyed characters (wide = 2) separated by narrow gaps
fn keyed_characters(keys: &[u32], elements: usize) -> Vec<bool> {
    let mut widths = Vec::with_capacity(keys.len() * (elements + 1));
    for (i, &key) in keys.iter().enumerate() {
        if i > 0 {
            widths.push(1);
        }
        widths.extend((0..elements).map(|e| if (key >> (elements - 1 - e)) & 1 == 1 { 2 } else { 1 }));
    }
    modules_from_widths(&widths)
}

/// Builds a Codabar symbol from a start character, data, and a stop character
///
/// Start and stop are not restricted to `A`-`D` so tests can build
/// malformed framing.
pub fn codabar(start: char, data: &str, stop: char) -> TestResult<Vec<bool>> {
    let keys = std::iter::once(start)
        .chain(data.chars())
        .chain(std::iter::once(stop))
        .map(|c| {
            CODABAR_CHARS
                .find(c)
                .map(|i| CODABAR_KEYS[i])
                .ok_or_else(|| invalid("Codabar", data, "not in the alphabet"))
        })
        .collect::<TestResult<Vec<u32>>>()?;
    Ok(keyed_characters(&keys, 7))
}

/// Builds an MSI symbol; the digits are encoded as given
pub fn msi(digits: &str) -> TestResult<Vec<bool>> {
    let d = parse_digits("MSI", digits, None)?;
    let mut out = Vec::with_capacity(d.len() * 12 + 7);
    push_pattern(&mut out, "110");
    for digit in d {
        for bit in (0..4).rev() {
            push_pattern(&mut out, if (digit >> bit) & 1 == 1 { "110" } else { "100" });
        }
    }
    push_pattern(&mut out, "1001");
    Ok(out)
}

const CODE11_CHARS: &str = "0123456789-*";
const CODE11_KEYS: [u32; 12] = [
    0b00001, 0b10001, 0b01001, 0b11000, 0b00101, 0b10100, 0b01100, 0b00011, 0b10010, 0b10000,
    0b00100, 0b00110,
];

/// Builds a Code 11 symbol framed by `*`; check characters are not added
pub fn code11(text: &str) -> TestResult<Vec<bool>> {
    let keys = std::iter::once('*')
        .chain(text.chars())
        .chain(std::iter::once('*'))
        .map(|c| {
            CODE11_CHARS
                .find(c)
                .map(|i| CODE11_KEYS[i])
                .ok_or_else(|| invalid("Code 11", text, "not in the alphabet"))
        })
        .collect::<TestResult<Vec<u32>>>()?;
    Ok(keyed_characters(&keys, 5))
}

fn plessey_crc(bits: &[bool]) -> u8 {
    let mut crc = 0u32;
    for bit in bits.iter().copied().chain(std::iter::repeat_n(false, 8)) {
        crc = (crc << 1) | u32::from(bit);
        if crc & 0x100 != 0 {
            crc ^= 0x1E9;
        }
    }
    (crc & 0xff) as u8
}

fn plessey_payload(hex: &str) -> TestResult<Vec<bool>> {
    if hex.is_empty() {
        return Err(invalid("Plessey", hex, "needs at least one character"));
    }
    let mut bits = Vec::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let value = c
            .to_digit(16)
            .ok_or_else(|| invalid("Plessey", hex, "not hexadecimal"))?;
        bits.extend((0..4).map(|i| (value >> i) & 1 == 1));
    }
    Ok(bits)
}

fn plessey_symbol(payload: &[bool], crc: u8) -> Vec<bool> {
    let bit_pair = |bit: bool| if bit { [2, 1] } else { [1, 2] };
    let mut widths = Vec::new();
    for bit in [true, true, false, true] {
        widths.extend(bit_pair(bit));
    }
    for &bit in payload {
        widths.extend(bit_pair(bit));
    }
    for i in 0..8 {
        widths.extend(bit_pair((crc >> i) & 1 == 1));
    }
    // Termination bar, then stop bits drawn space first
    widths.push(2);
    for bit in [false, false, true, true] {
        let [bar, space] = bit_pair(bit);
        widths.extend([space, bar]);
    }
    modules_from_widths(&widths)
}

/// Builds a Plessey symbol from hex digits with its computed CRC
pub fn plessey(hex: &str) -> TestResult<Vec<bool>> {
    let payload = plessey_payload(hex)?;
    Ok(plessey_symbol(&payload, plessey_crc(&payload)))
}

/// Builds a Plessey symbol carrying the given CRC byte
pub fn plessey_with_crc(hex: &str, crc: u8) -> TestResult<Vec<bool>> {
    let payload = plessey_payload(hex)?;
    Ok(plessey_symbol(&payload, crc))
}

/// Builds a patch code (`1`, `2`, `3`, `4`, `6`, or `T`)
pub fn patch_code(code: &str) -> TestResult<Vec<bool>> {
    let key: u32 = match code {
        "1" => 0b1001,
        "2" => 0b1010,
        "3" => 0b1100,
        "4" => 0b0101,
        "6" => 0b0011,
        "T" => 0b0110,
        _ => return Err(invalid("patch code", code, "unknown code")),
    };
    let mut widths = Vec::with_capacity(7);
    for i in 0..4 {
        if i > 0 {
            widths.push(1);
        }
        widths.push(width((key >> (3 - i)) & 1 == 1));
    }
    Ok(modules_from_widths(&widths))
}

/// Builds a Telepen (ASCII) symbol with start, check, and stop characters
pub fn telepen(text: &str) -> TestResult<Vec<bool>> {
    if !text.is_ascii() {
        return Err(invalid("Telepen", text, "not ASCII"));
    }
    let sum: u32 = text.bytes().map(u32::from).sum();
    let check = ((127 - sum % 127) % 127) as u8;

    let bytes = std::iter::once(b'_')
        .chain(text.bytes())
        .chain([check, b'z']);
    let mut bits = Vec::new();
    for byte in bytes {
        let parity = u8::from(byte.count_ones() % 2 == 1);
        let byte = byte | (parity << 7);
        bits.extend((0..8).map(|i| (byte >> i) & 1 == 1));
    }

    // A one is narrow/narrow; zeros pair up around the ones between them
    let mut widths = Vec::new();
    let mut i = 0;
    while i < bits.len() {
        if bits[i] {
            widths.extend([1, 1]);
            i += 1;
            continue;
        }
        let Some(close) = bits[i + 1..].iter().position(|&b| !b).map(|p| i + 1 + p) else {
            return Err(invalid("Telepen", text, "unpaired zero bit"));
        };
        match close - i - 1 {
            0 => widths.extend([WIDE, 1]),
            1 => widths.extend([WIDE, WIDE]),
            ones => {
                widths.extend([1, WIDE]);
                for _ in 0..ones - 2 {
                    widths.extend([1, 1]);
                }
                widths.extend([1, WIDE]);
            }
        }
        i = close + 1;
    }
    // The trailing space is not part of a trimmed scan
    widths.pop();
    Ok(modules_from_widths(&widths))
}

/// Builds a one-track Pharmacode symbol for a value in 3..=131070
pub fn pharmacode(value: u32) -> TestResult<Vec<bool>> {
    if !(3..=131_070).contains(&value) {
        return Err(invalid("Pharmacode", &value.to_string(), "value out of range"));
    }
    let mut bars = Vec::new();
    let mut v = value;
    while v > 0 {
        if v % 2 == 0 {
            bars.push(WIDE);
            v = (v - 2) / 2;
        } else {
            bars.push(1);
            v = (v - 1) / 2;
        }
    }
    bars.reverse();

    let mut widths = Vec::with_capacity(bars.len() * 2);
    for (i, bar) in bars.into_iter().enumerate() {
        if i > 0 {
            widths.push(1);
        }
        widths.push(bar);
    }
    Ok(modules_from_widths(&widths))
}

// ---------------------------------------------------------------------------
// Code 128 / GS1-128
// ---------------------------------------------------------------------------

const CODE128_PATTERNS: [u32; 106] = [
    212222, 222122, 222221, 121223, 121322, 131222, 122213, 122312, 132212, 221213, 221312, 231212,
    112232, 122132, 122231, 113222, 123122, 123221, 223211, 221132, 221231, 213212, 223112, 312131,
    311222, 321122, 321221, 312212, 322112, 322211, 212123, 212321, 232121, 111323, 131123, 131321,
    112313, 132113, 132311, 211313, 231113, 231311, 112133, 112331, 132131, 113123, 113321, 133121,
    313121, 211331, 231131, 213113, 213311, 213131, 311123, 311321, 331121, 312113, 312311, 332111,
    314111, 221411, 431111, 111224, 111422, 121124, 121421, 141122, 141221, 112214, 112412, 122114,
    122411, 142112, 142211, 241211, 221114, 413111, 241112, 134111, 111242, 121142, 121241, 114212,
    124112, 124211, 411212, 421112, 421211, 212141, 214121, 412121, 111143, 111341, 131141, 114113,
    114311, 411113, 411311, 113141, 114131, 311141, 411131, 211412, 211214, 211232,
];
const CODE128_STOP: u32 = 2331112;
const FNC1: u32 = 102;
const START_B: u32 = 104;
const START_C: u32 = 105;

fn code128_set_b(symbology: &'static str, text: &str, values: &mut Vec<u32>) -> TestResult<()> {
    for c in text.chars() {
        let code = u32::from(c);
        if !(32..=127).contains(&code) {
            return Err(invalid(symbology, text, "not in code set B"));
        }
        values.push(code - 32);
    }
    Ok(())
}

fn with_check(mut values: Vec<u32>) -> Vec<u32> {
    let check = values
        .iter()
        .enumerate()
        .fold(0u32, |sum, (i, &v)| (sum + v * (i as u32).max(1)) % 103);
    values.push(check);
    values
}

/// Code 128 symbol values for `text`: start, data, and check
///
/// An even-length all-digit text uses code set C; anything else uses B.
pub fn code128_values(text: &str) -> TestResult<Vec<u32>> {
    let bytes = text.as_bytes();
    let mut values = Vec::with_capacity(text.len() + 2);
    if !bytes.is_empty() && bytes.len() % 2 == 0 && bytes.iter().all(u8::is_ascii_digit) {
        values.push(START_C);
        values.extend(
            bytes
                .chunks_exact(2)
                .map(|pair| u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0')),
        );
    } else {
        values.push(START_B);
        code128_set_b("Code 128", text, &mut values)?;
    }
    Ok(with_check(values))
}

/// Renders Code 128 symbol values followed by the stop pattern
pub fn code128_from_values(values: &[u32]) -> TestResult<Vec<bool>> {
    let mut widths = Vec::with_capacity(values.len() * 6 + 7);
    for &v in values {
        let pattern = *CODE128_PATTERNS
            .get(v as usize)
            .ok_or_else(|| invalid("Code 128", &v.to_string(), "symbol value out of range"))?;
        widths.extend(pattern.to_string().bytes().map(|b| u32::from(b - b'0')));
    }
    widths.extend(CODE128_STOP.to_string().bytes().map(|b| u32::from(b - b'0')));
    Ok(modules_from_widths(&widths))
}

/// Builds a Code 128 symbol
pub fn code128(text: &str) -> TestResult<Vec<bool>> {
    code128_from_values(&code128_values(text)?)
}

/// Builds a GS1-128 symbol: FNC1, then the element strings separated by FNC1
pub fn gs1_128(elements: &[&str]) -> TestResult<Vec<bool>> {
    let mut values = vec![START_B];
    for element in elements {
        values.push(FNC1);
        code128_set_b("GS1-128", element, &mut values)?;
    }
    code128_from_values(&with_check(values))
}

// ---------------------------------------------------------------------------
// GS1 DataBar
// ---------------------------------------------------------------------------

fn combinations(n: i64, r: i64) -> i64 {
    let (min_denom, max_denom) = if n - r > r { (r, n - r) } else { (n - r, r) };
    let mut value = 1i64;
    let mut j = 1i64;
    let mut i = n;
    while i > max_denom {
        value *= i;
        if j <= min_denom {
            value /= j;
            j += 1;
        }
        i -= 1;
    }
    while j <= min_denom {
        value /= j;
        j += 1;
    }
    value
}

/// Four element widths with the given rank in an element set
fn rss_widths(value: u32, modules: u32, widest: u32, no_narrow: bool) -> [u32; 4] {
    const ELEMENTS: i64 = 4;
    let mut value = i64::from(value);
    let mut n = i64::from(modules);
    let max_width = i64::from(widest);
    let mut widths = [0u32; 4];
    let mut narrow_mask = 0u32;

    for bar in 0..3usize {
        let b = bar as i64;
        let mut elm = 1i64;
        let mut mask = narrow_mask | (1 << bar);
        loop {
            let mut sub = combinations(n - elm - 1, ELEMENTS - b - 2);
            if !no_narrow && mask == 0 && n - elm - (ELEMENTS - b - 1) >= ELEMENTS - b - 1 {
                sub -= combinations(n - elm - (ELEMENTS - b), ELEMENTS - b - 2);
            }
            if ELEMENTS - b - 1 > 1 {
                let mut less = 0i64;
                let mut mxw = n - elm - (ELEMENTS - b - 2);
                while mxw > max_width {
                    less += combinations(n - elm - mxw - 1, ELEMENTS - b - 3);
                    mxw -= 1;
                }
                sub -= less * (ELEMENTS - 1 - b);
            } else if n - elm > max_width {
                sub -= 1;
            }
            value -= sub;
            if value < 0 {
                value += sub;
                break;
            }
            elm += 1;
            mask &= !(1 << bar);
        }
        widths[bar] = elm as u32;
        n -= elm;
        narrow_mask = mask;
    }
    widths[3] = n as u32;
    widths
}

const TRUNCATED_FINDERS: [[u32; 5]; 9] = [
    [3, 8, 2, 1, 1],
    [3, 5, 5, 1, 1],
    [3, 3, 7, 1, 1],
    [3, 1, 9, 1, 1],
    [2, 7, 4, 1, 1],
    [2, 5, 6, 1, 1],
    [2, 3, 8, 1, 1],
    [1, 5, 7, 1, 1],
    [1, 3, 9, 1, 1],
];
const TRUNCATED_G_SUM: [u32; 9] = [0, 161, 961, 2015, 2715, 0, 336, 1036, 1516];
const TRUNCATED_GROUP_MAX: [u32; 9] = [160, 960, 2014, 2714, 2840, 335, 1035, 1515, 1596];
const TRUNCATED_T: [u32; 9] = [1, 10, 34, 70, 126, 4, 20, 48, 81];
const TRUNCATED_MODULES_ODD: [u32; 9] = [12, 10, 8, 6, 4, 5, 7, 9, 11];
const TRUNCATED_MODULES_EVEN: [u32; 9] = [4, 6, 8, 10, 12, 10, 8, 6, 4];
const TRUNCATED_WIDEST_ODD: [u32; 9] = [8, 6, 4, 3, 1, 2, 4, 6, 8];
const TRUNCATED_WIDEST_EVEN: [u32; 9] = [1, 3, 5, 6, 8, 7, 5, 3, 1];

/// GS1 DataBar Truncated element widths for a number of up to 13 digits
///
/// The 46 widths start with the leading guard space.
pub fn databar_truncated_widths(number: &str) -> TestResult<Vec<u32>> {
    let d = parse_digits("DataBar Truncated", number, None)?;
    if d.is_empty() || d.len() > 13 {
        return Err(invalid("DataBar Truncated", number, "needs 1 to 13 digits"));
    }
    let accum = d.iter().fold(0u64, |v, &digit| v * 10 + u64::from(digit));
    let left = accum / 4_537_077;
    let right = accum % 4_537_077;
    let chars = [left / 1597, left % 1597, right / 1597, right % 1597].map(|c| c as u32);

    let mut dw = [[0u32; 4]; 8];
    for (i, &value) in chars.iter().enumerate() {
        let outer = i % 2 == 0;
        let mut groups = if outer { 0..5 } else { 5..9 };
        let g = groups
            .find(|&g| value <= TRUNCATED_GROUP_MAX[g])
            .ok_or_else(|| invalid("DataBar Truncated", number, "character out of range"))?;
        let rel = value - TRUNCATED_G_SUM[g];
        let (v_odd, v_even) = if outer {
            (rel / TRUNCATED_T[g], rel % TRUNCATED_T[g])
        } else {
            (rel % TRUNCATED_T[g], rel / TRUNCATED_T[g])
        };
        let odd = rss_widths(v_odd, TRUNCATED_MODULES_ODD[g], TRUNCATED_WIDEST_ODD[g], outer);
        let even = rss_widths(v_even, TRUNCATED_MODULES_EVEN[g], TRUNCATED_WIDEST_EVEN[g], !outer);
        for k in 0..4 {
            dw[2 * k][i] = odd[k];
            dw[2 * k + 1][i] = even[k];
        }
    }

    let mut weights = [1u32; 32];
    for k in 1..32 {
        weights[k] = weights[k - 1] * 3 % 79;
    }
    let mut checksum = 0u32;
    for (i, row) in dw.iter().enumerate() {
        for (c, &w) in row.iter().enumerate() {
            checksum += weights[i + c * 8] * w;
        }
    }
    checksum %= 79;
    if checksum >= 8 {
        checksum += 1;
    }
    if checksum >= 72 {
        checksum += 1;
    }
    let (left_finder, right_finder) = ((checksum / 9) as usize, (checksum % 9) as usize);

    let mut widths = vec![0u32; 46];
    widths[0] = 1;
    widths[1] = 1;
    widths[44] = 1;
    widths[45] = 1;
    for i in 0..8 {
        widths[i + 2] = dw[i][0];
        widths[i + 15] = dw[7 - i][1];
        widths[i + 23] = dw[i][3];
        widths[i + 36] = dw[7 - i][2];
    }
    for i in 0..5 {
        widths[i + 10] = TRUNCATED_FINDERS[left_finder][i];
        widths[i + 31] = TRUNCATED_FINDERS[right_finder][4 - i];
    }
    Ok(widths)
}

/// Builds a GS1 DataBar Truncated symbol
pub fn databar_truncated(number: &str) -> TestResult<Vec<bool>> {
    let widths = databar_truncated_widths(number)?;
    Ok(modules_from_widths(&widths[1..]))
}

const EXPANDED_G_SUM: [u32; 5] = [0, 348, 1388, 2948, 3988];
const EXPANDED_GROUP_MAX: [u32; 5] = [347, 1387, 2947, 3987, 4191];
const EXPANDED_T_EVEN: [u32; 5] = [4, 20, 52, 104, 204];
const EXPANDED_MODULES_ODD: [u32; 5] = [12, 10, 8, 6, 4];
const EXPANDED_MODULES_EVEN: [u32; 5] = [5, 7, 9, 11, 13];
const EXPANDED_WIDEST_ODD: [u32; 5] = [7, 5, 4, 3, 1];
const EXPANDED_WIDEST_EVEN: [u32; 5] = [2, 4, 5, 6, 8];
const EXPANDED_FINDERS: [[u32; 5]; 12] = [
    [1, 8, 4, 1, 1],
    [1, 1, 4, 8, 1],
    [3, 6, 4, 1, 1],
    [1, 1, 4, 6, 3],
    [3, 4, 6, 1, 1],
    [1, 1, 6, 4, 3],
    [3, 2, 8, 1, 1],
    [1, 1, 8, 2, 3],
    [2, 6, 5, 1, 1],
    [1, 1, 5, 6, 2],
    [2, 2, 9, 1, 1],
    [1, 1, 9, 2, 2],
];
const EXPANDED_SEQUENCES: [&[usize]; 10] = [
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
/// Filler that reads as mode latches in the general-purpose field
const EXPANDED_PAD: &str = "00100";

fn expanded_char_widths(value: u32) -> [u32; 8] {
    let g = EXPANDED_GROUP_MAX.iter().position(|&max| value <= max).unwrap_or(4);
    let rel = value - EXPANDED_G_SUM[g];
    let odd = rss_widths(
        rel / EXPANDED_T_EVEN[g],
        EXPANDED_MODULES_ODD[g],
        EXPANDED_WIDEST_ODD[g],
        false,
    );
    let even = rss_widths(
        rel % EXPANDED_T_EVEN[g],
        EXPANDED_MODULES_EVEN[g],
        EXPANDED_WIDEST_EVEN[g],
        true,
    );
    [odd[0], even[0], odd[1], even[1], odd[2], even[2], odd[3], even[3]]
}

fn expanded_weight_row(sequence: &[usize], index: usize) -> usize {
    if index == 0 {
        return 0;
    }
    let finder = sequence[index.div_ceil(2)];
    if index % 2 == 1 { 2 * finder - 3 } else { 2 * finder - 2 }
}

/// GS1 DataBar Expanded element widths for a payload bit string
///
/// The bits are padded to whole 12-bit characters (at least three) with
/// latch filler. The widths start with the leading guard space.
pub fn databar_expanded_widths(bits: &str) -> TestResult<Vec<u32>> {
    if !bits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(invalid("DataBar Expanded", bits, "not a bit string"));
    }
    let target = (bits.len().div_ceil(12) * 12).max(36);
    let mut padded = bits.to_string();
    while padded.len() < target {
        let need = target - padded.len();
        padded.push_str(&EXPANDED_PAD[..need.min(EXPANDED_PAD.len())]);
    }
    let data_chars = padded.len() / 12;
    if data_chars > 21 {
        return Err(invalid("DataBar Expanded", bits, "too many data characters"));
    }

    let values: Vec<u32> = padded
        .as_bytes()
        .chunks_exact(12)
        .map(|chunk| chunk.iter().fold(0u32, |v, &b| (v << 1) | u32::from(b == b'1')))
        .collect();
    let chars: Vec<[u32; 8]> = values.iter().map(|&v| expanded_char_widths(v)).collect();

    let sequence = EXPANDED_SEQUENCES[(data_chars - 2) / 2];
    let mut weights = vec![1u32; 184];
    for k in 1..184 {
        weights[k] = weights[k - 1] * 3 % 211;
    }
    let mut checksum = 0u32;
    for (i, widths) in chars.iter().enumerate() {
        let row = expanded_weight_row(sequence, i);
        for (j, &w) in widths.iter().enumerate() {
            checksum += w * weights[row * 8 + j];
        }
    }
    let check = 211 * (data_chars as u32 + 1 - 4) + checksum % 211;
    let check_widths = expanded_char_widths(check);

    let total = data_chars + 1;
    let finders = total.div_ceil(2);
    let mut widths = vec![0u32; finders * 5 + total * 8 + 4];
    for (i, &finder) in sequence.iter().take(finders).enumerate() {
        widths[21 * i + 10..21 * i + 15].copy_from_slice(&EXPANDED_FINDERS[finder - 1]);
    }
    widths[2..10].copy_from_slice(&check_widths);
    for (i, char_widths) in chars.iter().enumerate() {
        if i % 2 == 1 {
            let base = (i - 1) / 2 * 21 + 23;
            widths[base..base + 8].copy_from_slice(char_widths);
        } else {
            let base = i / 2 * 21 + 15;
            for j in 0..8 {
                widths[base + j] = char_widths[7 - j];
            }
        }
    }
    let n = widths.len();
    widths[0] = 1;
    widths[1] = 1;
    widths[n - 2] = 1;
    widths[n - 1] = 1;
    Ok(widths)
}

/// Builds a GS1 DataBar Expanded symbol from a payload bit string
pub fn databar_expanded(bits: &str) -> TestResult<Vec<bool>> {
    let widths = databar_expanded_widths(bits)?;
    let mut modules = modules_from_widths(&widths[1..]);
    while modules.last() == Some(&false) {
        modules.pop();
    }
    Ok(modules)
}

/// Encoding method 1 payload bits for a 13-digit GTIN body
///
/// The decoded element string is `01`, the 13 digits, and their check digit.
///
/// # Panics
/// Panics if `digits` is not 13 ASCII digits.
pub fn expanded_gtin_bits(digits: &str) -> String {
    let d = match parse_digits("DataBar Expanded", digits, Some(13)) {
        Ok(d) => d,
        Err(e) => panic!("{e}"),
    };
    let mut bits = String::from("0100");
    bits.push_str(&format!("{:04b}", d[0]));
    for group in d[1..].chunks_exact(3) {
        let value = u32::from(group[0]) * 100 + u32::from(group[1]) * 10 + u32::from(group[2]);
        bits.push_str(&format!("{value:010b}"));
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_from_widths() {
        assert_eq!(modules_from_widths(&[2, 1, 1]), vec![true, true, false, true]);
    }

    #[test]
    fn test_symbol_widths() {
        assert_eq!(ean13("400638133393").unwrap().len(), 95);
        assert_eq!(ean8("9638507").unwrap().len(), 67);
        assert_eq!(upce("0425261").unwrap().len(), 51);
        assert_eq!(code93("AB").unwrap().len(), 6 * 9 + 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ean13("12345").is_err());
        assert!(itf("123").is_err());
        assert!(upce("2425261").is_err());
        assert!(plessey("XYZ").is_err());
        assert!(pharmacode(2).is_err());
        assert!(patch_code("5").is_err());
        assert!(code39("lower", false).is_err());
    }

    #[test]
    fn test_rss_widths_sum() {
        for value in 0..100 {
            let w = rss_widths(value, 12, 7, false);
            assert_eq!(w.iter().sum::<u32>(), 12);
            assert!(w.iter().all(|&x| (1..=7).contains(&x)));
        }
    }

    #[test]
    fn test_databar_layouts() {
        let widths = databar_truncated_widths("0950110153001").unwrap();
        assert_eq!(widths.len(), 46);

        let bits = expanded_gtin_bits("0101234567890");
        assert_eq!(bits.len(), 48);
        // Four data characters plus the check character
        let widths = databar_expanded_widths(&bits).unwrap();
        assert_eq!(widths.len(), 3 * 5 + 5 * 8 + 4);
    }
}
