//! GS1 DataBar Truncated decoder
//!
//! The symbol is 46 elements: a 1-1 guard, a left data pair, the left
//! finder, a right data pair, the right finder (mirrored), and a 1-1 guard.
//! Four data characters combine into a number of up to 13 digits. The two
//! finder values carry a mod-79 checksum over the data element widths.

use std::sync::LazyLock;

use super::databar::{ElementSet, element_widths};

const ELEMENTS: usize = 46;

const FINDERS: [[u32; 5]; 9] = [
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

const G_SUM: [u32; 9] = [0, 161, 961, 2015, 2715, 0, 336, 1036, 1516];
const GROUP_MAX: [u32; 9] = [160, 960, 2014, 2714, 2840, 335, 1035, 1515, 1596];
const T_TABLE: [u32; 9] = [1, 10, 34, 70, 126, 4, 20, 48, 81];
const MODULES_ODD: [u32; 9] = [12, 10, 8, 6, 4, 5, 7, 9, 11];
const MODULES_EVEN: [u32; 9] = [4, 6, 8, 10, 12, 10, 8, 6, 4];
const WIDEST_ODD: [u32; 9] = [8, 6, 4, 3, 1, 2, 4, 6, 8];
const WIDEST_EVEN: [u32; 9] = [1, 3, 5, 6, 8, 7, 5, 3, 1];

/// Checksum weights, 3^k mod 79
static CHECKSUM_WEIGHTS: LazyLock<[u32; 32]> = LazyLock::new(|| {
    let mut weights = [1u32; 32];
    for k in 1..32 {
        weights[k] = weights[k - 1] * 3 % 79;
    }
    weights
});

/// Per-character element widths: `widths[element][character]`
type DataWidths = [[u32; 4]; 8];

fn find_finder(widths: &[u32], offset: usize, mirrored: bool) -> Option<u32> {
    let window = &widths[offset..offset + 5];
    FINDERS
        .iter()
        .position(|finder| {
            if mirrored {
                finder.iter().rev().eq(window.iter())
            } else {
                finder.as_slice() == window
            }
        })
        .map(|c| c as u32)
}

fn data_widths(widths: &[u32]) -> DataWidths {
    let mut dw = [[0u32; 4]; 8];
    for (i, row) in dw.iter_mut().enumerate() {
        row[0] = widths[i + 2];
        row[1] = widths[15 + 7 - i];
        row[2] = widths[36 + 7 - i];
        row[3] = widths[i + 23];
    }
    dw
}

fn checksum(dw: &DataWidths) -> u32 {
    let weights = &*CHECKSUM_WEIGHTS;
    let mut sum = 0u32;
    for (i, row) in dw.iter().enumerate() {
        for (c, &w) in row.iter().enumerate() {
            sum += weights[i + c * 8] * w;
        }
    }
    let mut checksum = sum % 79;
    if checksum >= 8 {
        checksum += 1;
    }
    if checksum >= 72 {
        checksum += 1;
    }
    checksum
}

/// Decodes one of the four data characters
fn data_character(index: usize, dw: &DataWidths) -> Option<u32> {
    let odd = [dw[0][index], dw[2][index], dw[4][index], dw[6][index]];
    let even = [dw[1][index], dw[3][index], dw[5][index], dw[7][index]];
    // Outer characters use groups 0-4 with the odd set weighted; inner
    // characters use groups 5-8 with the even set weighted
    let outer = index % 2 == 0;
    let mut groups = if outer { 0..5 } else { 5..9 };

    groups.find_map(|g| {
        let odd_set = ElementSet::new(MODULES_ODD[g], WIDEST_ODD[g], outer);
        let even_set = ElementSet::new(MODULES_EVEN[g], WIDEST_EVEN[g], !outer);
        let v_odd = odd_set.value(&odd)?;
        let v_even = even_set.value(&even)?;
        let value = if outer {
            v_odd * T_TABLE[g] + v_even + G_SUM[g]
        } else {
            v_even * T_TABLE[g] + v_odd + G_SUM[g]
        };
        (G_SUM[g]..=GROUP_MAX[g]).contains(&value).then_some(value)
    })
}

/// Decodes a GS1 DataBar Truncated symbol to its 13-digit number
pub fn decode_databar_truncated(modules: &[bool]) -> Option<String> {
    let widths = element_widths(modules);
    if widths.len() != ELEMENTS {
        return None;
    }
    if widths[0] != 1 || widths[1] != 1 || widths[44] != 1 || widths[45] != 1 {
        return None;
    }

    let left = find_finder(&widths, 10, false)?;
    let right = find_finder(&widths, 31, true)?;
    let dw = data_widths(&widths);
    if checksum(&dw) != left * 9 + right {
        return None;
    }

    let mut chars = [0u64; 4];
    for (i, c) in chars.iter_mut().enumerate() {
        *c = u64::from(data_character(i, &dw)?);
    }
    let left_reg = chars[0] * 1597 + chars[1];
    let right_reg = chars[2] * 1597 + chars[3];
    let accum = left_reg * 4_537_077 + right_reg;
    if accum > 9_999_999_999_999 {
        return None;
    }
    Some(format!("{accum:013}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphline_test::fixtures;

    #[test]
    fn test_checksum_weights() {
        assert_eq!(CHECKSUM_WEIGHTS[0], 1);
        assert_eq!(CHECKSUM_WEIGHTS[4], 81 % 79);
        assert_eq!(CHECKSUM_WEIGHTS[31], 59);
    }

    #[test]
    fn test_decode_databar_truncated() {
        for gtin in ["0950110153001", "0000000000000", "2001234567890"] {
            let m = fixtures::databar_truncated(gtin).unwrap();
            assert_eq!(decode_databar_truncated(&m).as_deref(), Some(gtin));
        }
    }

    #[test]
    fn test_leading_zeros_restored() {
        let m = fixtures::databar_truncated("42").unwrap();
        assert_eq!(
            decode_databar_truncated(&m).as_deref(),
            Some("0000000000042")
        );
    }

    #[test]
    fn test_checksum_gate() {
        let mut widths = fixtures::databar_truncated_widths("0950110153001").unwrap();
        // Swap two unequal elements of the first data character
        let i = (2..9).find(|&i| widths[i] != widths[i + 1]).unwrap();
        widths.swap(i, i + 1);
        let m = fixtures::modules_from_widths(&widths[1..]);
        assert_eq!(decode_databar_truncated(&m), None);
    }
}
