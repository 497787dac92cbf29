//! Discrete 2 of 5 decoders: Industrial, Matrix, and IATA
//!
//! Reference: <http://en.wikipedia.org/wiki/Two-out-of-five_code>
//!
//! Only the bars carry information; every space is narrow. Digits are
//! five bars with two wide, using the same wide-flag table as ITF. The
//! three variants differ only in their start and stop bar sequences.

use super::ean::digits_to_string;
use super::itf::digit_for_key;
use crate::modules::{Threshold, runs};

/// Start and stop bar sequences (`true` = wide bar)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Framing {
    start: &'static [bool],
    stop: &'static [bool],
}

pub(crate) const INDUSTRIAL: Framing = Framing {
    start: &[true, true, false],
    stop: &[true, false, true],
};

pub(crate) const MATRIX: Framing = Framing {
    start: &[true, false, false, false, false],
    stop: &[true, false, false, false, false],
};

pub(crate) const IATA: Framing = Framing {
    start: &[false, false, false],
    stop: &[true, false, false],
};

fn decode_discrete(modules: &[bool], framing: Framing) -> Option<String> {
    if modules.len() < 15 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    if runs.len() < (framing.start.len() + framing.stop.len()) * 2 {
        return None;
    }
    let threshold = Threshold::global(&runs, 0, 1)?;
    if !threshold.all_narrow(&runs, 1, 2) {
        return None;
    }

    let bar_count = runs.len().div_ceil(2);
    if bar_count < framing.start.len() + framing.stop.len() + 5 {
        return None;
    }
    let bars: Vec<bool> = runs.iter().step_by(2).map(|&r| threshold.is_wide(r)).collect();

    let data_end = bar_count - framing.stop.len();
    if bars[..framing.start.len()] != *framing.start || bars[data_end..] != *framing.stop {
        return None;
    }

    let data = &bars[framing.start.len()..data_end];
    if data.is_empty() || data.len() % 5 != 0 {
        return None;
    }

    let mut digits = Vec::with_capacity(data.len() / 5);
    for chunk in data.chunks_exact(5) {
        let key = chunk.iter().fold(0u32, |k, &w| (k << 1) | u32::from(w));
        digits.push(digit_for_key(key)?);
    }
    Some(digits_to_string(&digits))
}

/// Decodes an Industrial 2 of 5 symbol
pub fn decode_industrial(modules: &[bool]) -> Option<String> {
    decode_discrete(modules, INDUSTRIAL)
}

/// Decodes a Matrix 2 of 5 symbol
pub fn decode_matrix(modules: &[bool]) -> Option<String> {
    decode_discrete(modules, MATRIX)
}

/// Decodes an IATA 2 of 5 symbol
pub fn decode_iata(modules: &[bool]) -> Option<String> {
    decode_discrete(modules, IATA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures::{self, TwoOfFive};

    #[test]
    fn test_decode_variants() {
        let m = fixtures::two_of_five(TwoOfFive::Industrial, "12345").unwrap();
        assert_eq!(decode_industrial(&m).as_deref(), Some("12345"));
        assert_eq!(decode_iata(&m), None);

        let m = fixtures::two_of_five(TwoOfFive::Matrix, "0987").unwrap();
        assert_eq!(decode_matrix(&m).as_deref(), Some("0987"));

        let m = fixtures::two_of_five(TwoOfFive::Iata, "4711").unwrap();
        assert_eq!(decode_iata(&m).as_deref(), Some("4711"));
        assert_eq!(decode_industrial(&m), None);
    }

    #[test]
    fn test_wide_space_rejected() {
        let mut m = fixtures::two_of_five(TwoOfFive::Industrial, "12").unwrap();
        // Widen the first space
        let first_space = m.iter().position(|&b| !b).unwrap();
        m.splice(first_space..first_space, [false, false, false]);
        assert_eq!(decode_industrial(&m), None);
    }
}
