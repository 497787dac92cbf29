//! Kodak patch code decoder
//!
//! A patch code is a single sheet-separator symbol of four bars and three
//! narrow spaces. The pattern of wide bars selects one of six codes.

use crate::modules::{Threshold, runs};

/// Bar wide-flag keys (first bar in MSB) and their codes
const CODES: [(u32, &str); 6] = [
    (0b1001, "1"),
    (0b1010, "2"),
    (0b1100, "3"),
    (0b0101, "4"),
    (0b0011, "6"),
    (0b0110, "T"),
];

/// Decodes a patch code
pub fn decode_patch(modules: &[bool]) -> Option<String> {
    if modules.len() < 7 || !modules[0] {
        return None;
    }
    let runs = runs(modules);
    if runs.len() != 7 {
        return None;
    }
    let threshold = Threshold::global(&runs, 0, 1)?;
    if !threshold.all_narrow(&runs, 1, 2) {
        return None;
    }

    let key = runs
        .iter()
        .step_by(2)
        .fold(0u32, |k, &r| (k << 1) | u32::from(threshold.is_wide(r)));
    CODES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, code)| (*code).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_decode_patch() {
        for code in ["1", "2", "3", "4", "6", "T"] {
            let m = fixtures::patch_code(code).unwrap();
            assert_eq!(decode_patch(&m).as_deref(), Some(code));
        }
    }

    #[test]
    fn test_unknown_key() {
        // Three wide bars (0b1110) is not a code
        let m: Vec<bool> = [3, 1, 3, 1, 3, 1, 1]
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| std::iter::repeat_n(i % 2 == 0, w))
            .collect();
        assert_eq!(decode_patch(&m), None);
    }
}
