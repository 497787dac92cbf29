//! Pharmacode (one-track) decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Pharmacode>
//!
//! Bars are read left to right as a binary-weighted sum where a narrow bar
//! counts 1 and a wide bar counts 2. Spaces carry no data and are narrow.

use crate::modules::{Threshold, runs};

const MIN_BARS: usize = 2;
const MAX_BARS: usize = 16;
const MIN_VALUE: u32 = 3;
const MAX_VALUE: u32 = 131_070;

/// Decodes a one-track Pharmacode symbol to its decimal value
pub fn decode_pharmacode(modules: &[bool]) -> Option<String> {
    if modules.len() < 3 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    if runs.len() % 2 == 0 {
        return None;
    }
    let bars = runs.len().div_ceil(2);
    if !(MIN_BARS..=MAX_BARS).contains(&bars) {
        return None;
    }

    // Calibrated on bars only; a symbol with a single bar width is ambiguous
    let threshold = Threshold::global(&runs, 0, 2)?;
    if !threshold.all_narrow(&runs, 1, 2) {
        return None;
    }

    let value: u32 = runs
        .iter()
        .step_by(2)
        .enumerate()
        .map(|(i, &bar)| {
            let weight = 1u32 << (bars - 1 - i);
            if threshold.is_wide(bar) { 2 * weight } else { weight }
        })
        .sum();

    (MIN_VALUE..=MAX_VALUE)
        .contains(&value)
        .then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_decode_pharmacode() {
        for value in [5, 100, 1234, 131_069] {
            let m = fixtures::pharmacode(value).unwrap();
            assert_eq!(decode_pharmacode(&m), Some(value.to_string()), "value {value}");
        }
    }

    #[test]
    fn test_wide_space_rejected() {
        // narrow bar, wide space, wide bar
        let m: Vec<bool> = [1, 3, 3]
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| std::iter::repeat_n(i % 2 == 0, w))
            .collect();
        assert_eq!(decode_pharmacode(&m), None);
    }

    #[test]
    fn test_uniform_bars_rejected() {
        // Three narrow bars would be 7, but there is no wide reference
        let m = [true, false, true, false, true];
        assert_eq!(decode_pharmacode(&m), None);
    }
}
