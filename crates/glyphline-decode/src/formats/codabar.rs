//! Codabar decoder
//!
//! Reference: <http://en.wikipedia.org/wiki/Codabar>
//!
//! Each character is 7 elements (4 bars, 3 spaces) separated by a narrow
//! gap. Widths vary between printers, so each character is classified
//! against its own narrow/wide threshold. Start and stop characters are
//! one of `A`-`D` and are not part of the decoded text.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::modules::{run_key, runs};
use crate::pool::scratch;

const CHARS: [char; 20] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '$', ':', '/', '.', '+', 'A', 'B', 'C',
    'D',
];

/// Wide-flag keys (7 elements, first element in MSB), indexed like [`CHARS`]
const KEYS: [u32; 20] = [
    0b0000011, 0b0000110, 0b0001001, 0b1100000, 0b0010010, // 0-4
    0b1000010, 0b0100001, 0b0100100, 0b0110000, 0b1001000, // 5-9
    0b0001100, 0b0011000, 0b1000101, 0b1010001, 0b1010100, // - $ : / .
    0b0010101, 0b0011010, 0b0101001, 0b0001011, 0b0001110, // + A B C D
];

const CHAR_RUNS: usize = 7;

static KEY_MAP: LazyLock<HashMap<u32, char>> =
    LazyLock::new(|| KEYS.into_iter().zip(CHARS).collect());

fn is_start_stop(c: char) -> bool {
    matches!(c, 'A'..='D')
}

/// Decodes a Codabar symbol
pub fn decode_codabar(modules: &[bool]) -> Option<String> {
    if modules.len() < CHAR_RUNS || !modules[0] {
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

        // Gap between characters; must be a space
        if pos < runs.len() {
            if pos % 2 == 0 {
                return None;
            }
            pos += 1;
        }
    }

    let count = chars.len();
    if pos != runs.len() || count < 2 || !is_start_stop(chars[0]) || !is_start_stop(chars[count - 1])
    {
        return None;
    }
    Some(chars[1..count - 1].iter().collect())
}
