//! Shared GS1 DataBar combinatorics
//!
//! DataBar characters split into an odd and an even element set. Each set
//! is four widths that add up to a fixed module count, and its value is the
//! rank of that width combination among all combinations allowed for the
//! set's group (bounded widest element, optionally at least one narrow
//! element). These helpers compute that rank.

use crate::modules::runs;

/// Binomial coefficient `n` choose `r`, dividing as it multiplies
///
/// Out-of-range arguments give 1 or 0 the way the rank formula expects.
pub(crate) fn combinations(n: i64, r: i64) -> i64 {
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

/// Element-set parameters for one DataBar group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ElementSet {
    /// Total modules the widths must add up to
    pub modules: u32,
    /// Largest allowed element width
    pub widest: u32,
    /// True when the set need not contain a one-module element
    pub no_narrow: bool,
}

impl ElementSet {
    pub(crate) const fn new(modules: u32, widest: u32, no_narrow: bool) -> Self {
        Self {
            modules,
            widest,
            no_narrow,
        }
    }

    /// Ranks `widths` within this set, or `None` if they do not belong to it
    pub(crate) fn value(&self, widths: &[u32]) -> Option<u32> {
        let elements = widths.len() as i64;
        if elements < 2 {
            return None;
        }
        if widths.iter().any(|&w| w < 1 || w > self.widest) {
            return None;
        }
        if widths.iter().sum::<u32>() != self.modules {
            return None;
        }
        // Such a set has no rank of its own and would alias a valid one
        if !self.no_narrow && !widths.contains(&1) {
            return None;
        }

        let max_width = i64::from(self.widest);
        let mut value = 0i64;
        let mut narrow_mask = 0u32;
        let mut remaining = i64::from(self.modules);

        for (bar, &current) in widths[..widths.len() - 1].iter().enumerate() {
            let b = bar as i64;
            let current = i64::from(current);
            for elm in 1..current {
                let mask = if elm == 1 {
                    narrow_mask | (1 << bar)
                } else {
                    narrow_mask
                };
                let mut sub = combinations(remaining - elm - 1, elements - b - 2);
                if !self.no_narrow
                    && mask == 0
                    && remaining - elm - (elements - b - 1) >= elements - b - 1
                {
                    sub -= combinations(remaining - elm - (elements - b), elements - b - 2);
                }
                if elements - b - 1 > 1 {
                    let mut less = 0i64;
                    let mut mxw = remaining - elm - (elements - b - 2);
                    while mxw > max_width {
                        less += combinations(remaining - elm - mxw - 1, elements - b - 3);
                        mxw -= 1;
                    }
                    sub -= less * (elements - 1 - b);
                } else if remaining - elm > max_width {
                    sub -= 1;
                }
                value += sub;
            }

            remaining -= current;
            if current == 1 {
                narrow_mask |= 1 << bar;
            } else {
                narrow_mask &= !(1 << bar);
            }
        }

        u32::try_from(value).ok()
    }
}

/// Splits eight character widths into odd (0, 2, 4, 6) and even (1, 3, 5, 7)
/// element sets
pub(crate) fn split_odd_even(widths: &[u32; 8]) -> ([u32; 4], [u32; 4]) {
    let odd = [widths[0], widths[2], widths[4], widths[6]];
    let even = [widths[1], widths[3], widths[5], widths[7]];
    (odd, even)
}

/// Element widths of a trimmed symbol, restoring the leading guard space
pub(crate) fn element_widths(modules: &[bool]) -> Vec<u32> {
    let mut widths = runs(modules);
    if modules.first() == Some(&true) {
        widths.insert(0, 1);
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(5, 2), 10);
        assert_eq!(combinations(10, 3), 120);
        assert_eq!(combinations(7, 0), 1);
        assert_eq!(combinations(6, 6), 1);
    }

    #[test]
    fn test_value_bounds() {
        let set = ElementSet::new(12, 8, true);
        // 1 + 1 + 1 + 9 is wider than allowed
        assert_eq!(set.value(&[1, 1, 1, 9]), None);
        // sum mismatch
        assert_eq!(set.value(&[3, 3, 3, 2]), None);
        // lowest rank: the widest element sits last
        assert_eq!(set.value(&[1, 1, 2, 8]), Some(0));
    }

    #[test]
    fn test_value_is_a_rank() {
        // Every valid combination of a set gets a distinct rank
        let set = ElementSet::new(8, 4, false);
        let mut seen = std::collections::HashSet::new();
        for a in 1..=4 {
            for b in 1..=4 {
                for c in 1..=4 {
                    let Some(d) = 8u32.checked_sub(a + b + c) else {
                        continue;
                    };
                    if let Some(v) = set.value(&[a, b, c, d]) {
                        assert!(seen.insert(v), "duplicate rank {v}");
                    }
                }
            }
        }
        assert_eq!(seen.len(), 30);
        assert_eq!(set.value(&[2, 2, 2, 2]), None);
    }

    #[test]
    fn test_element_widths() {
        assert_eq!(element_widths(&[true, false, false, true]), vec![1, 1, 2, 1]);
        assert_eq!(element_widths(&[false, true]), vec![1, 1]);
    }
}
