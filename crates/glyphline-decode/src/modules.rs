//! Module and run utilities
//!
//! A scanline arrives as a module sequence (`true` = dark). These helpers
//! trim, flip, and convert it into the run-length and bit-key forms the
//! format decoders match against their tables.

use crate::{DecodeError, DecodeResult};

/// Largest module sequence the engine will build from run lengths
pub const MAX_MODULES: usize = 1 << 20;

/// Drops leading and trailing light modules
///
/// Returns an empty slice for an all-light input. Trimming a trimmed slice
/// returns it unchanged.
pub fn trim(modules: &[bool]) -> &[bool] {
    let Some(start) = modules.iter().position(|&m| m) else {
        return &[];
    };
    // A dark module exists, so rposition finds one at or after `start`
    let end = modules.iter().rposition(|&m| m).unwrap_or(start);
    &modules[start..=end]
}

/// Returns the polarity complement of a module sequence
pub fn invert(modules: &[bool]) -> Vec<bool> {
    modules.iter().map(|&m| !m).collect()
}

/// Returns a module sequence in reverse scan order
pub fn reverse(modules: &[bool]) -> Vec<bool> {
    modules.iter().rev().copied().collect()
}

/// Converts a module sequence to alternating run lengths
///
/// The first run has the polarity of `modules[0]`. An empty input yields no
/// runs.
pub fn runs(modules: &[bool]) -> Vec<u32> {
    let mut out = Vec::with_capacity(modules.len() / 2 + 1);
    let Some(&first) = modules.first() else {
        return out;
    };

    let mut current = first;
    let mut len = 0u32;
    for &m in modules {
        if m == current {
            len += 1;
        } else {
            out.push(len);
            current = m;
            len = 1;
        }
    }
    out.push(len);
    out
}

/// Expands run lengths into a module sequence whose first run is dark
///
/// # Errors
/// * [`DecodeError::ZeroLengthRun`] if any run is zero
/// * [`DecodeError::InputTooLong`] if the total exceeds [`MAX_MODULES`]
pub fn modules_from_runs(runs: &[u32]) -> DecodeResult<Vec<bool>> {
    let mut total = 0usize;
    for (index, &run) in runs.iter().enumerate() {
        if run == 0 {
            return Err(DecodeError::ZeroLengthRun { index });
        }
        total = total.saturating_add(run as usize);
    }
    if total > MAX_MODULES {
        return Err(DecodeError::InputTooLong {
            modules: total,
            max: MAX_MODULES,
        });
    }

    let mut modules = Vec::with_capacity(total);
    for (i, &run) in runs.iter().enumerate() {
        let dark = i % 2 == 0;
        modules.extend(std::iter::repeat_n(dark, run as usize));
    }
    Ok(modules)
}

/// Packs `width` modules starting at `offset` into an integer, MSB first
///
/// The caller guarantees `offset + width <= modules.len()` and `width <= 32`.
pub fn bit_key(modules: &[bool], offset: usize, width: usize) -> u32 {
    modules[offset..offset + width]
        .iter()
        .fold(0u32, |key, &m| (key << 1) | u32::from(m))
}

/// Returns whether `pattern` occurs in `modules` at `offset`
pub fn matches_at(modules: &[bool], offset: usize, pattern: &[bool]) -> bool {
    modules
        .get(offset..offset + pattern.len())
        .is_some_and(|window| window == pattern)
}

/// Narrow/wide classifier for run lengths
///
/// A run is wide when it exceeds the midpoint of the smallest and largest
/// runs it was calibrated on. The midpoint is held doubled so comparisons
/// stay in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    twice: u64,
}

impl Threshold {
    /// Calibrates on the runs at `start`, `start + step`, ...
    ///
    /// Returns `None` if no runs are selected, a run is zero, or the widest
    /// run is not at least twice the narrowest (no usable wide/narrow split).
    pub fn global(runs: &[u32], start: usize, step: usize) -> Option<Self> {
        let (min, max) = min_max(runs.iter().skip(start).step_by(step.max(1)).copied())?;
        if min == 0 || u64::from(max) < u64::from(min) * 2 {
            return None;
        }
        Some(Self {
            twice: u64::from(min) + u64::from(max),
        })
    }

    /// Calibrates on every run of a window without a minimum spread
    ///
    /// Used by symbologies whose characters always carry both widths.
    pub fn local(window: &[u32]) -> Option<Self> {
        let (min, max) = min_max(window.iter().copied())?;
        if min == 0 {
            return None;
        }
        Some(Self {
            twice: u64::from(min) + u64::from(max),
        })
    }

    /// Returns whether `run` is wide
    pub fn is_wide(&self, run: u32) -> bool {
        u64::from(run) * 2 > self.twice
    }

    /// Returns whether every run at `start`, `start + step`, ... is narrow
    pub fn all_narrow(&self, runs: &[u32], start: usize, step: usize) -> bool {
        runs.iter()
            .skip(start)
            .step_by(step.max(1))
            .all(|&r| !self.is_wide(r))
    }
}

fn min_max(values: impl Iterator<Item = u32>) -> Option<(u32, u32)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Classifies `count` runs from `offset` as wide/narrow and packs them MSB first
///
/// The threshold is recomputed over just this window, so each character
/// calibrates itself against local scan speed.
pub fn run_key(runs: &[u32], offset: usize, count: usize) -> Option<u32> {
    let window = runs.get(offset..offset + count)?;
    let threshold = Threshold::local(window)?;
    Some(
        window
            .iter()
            .fold(0u32, |key, &r| (key << 1) | u32::from(threshold.is_wide(r))),
    )
}

/// Packs `count` runs from `offset` as decimal digits of their widths
///
/// Returns `None` for a run that does not fit one digit, so a malformed width
/// can never alias a valid pattern.
pub fn decimal_key(runs: &[u32], offset: usize, count: usize) -> Option<u32> {
    runs.get(offset..offset + count)?
        .iter()
        .try_fold(0u32, |key, &r| (1..=9).contains(&r).then_some(key * 10 + r))
}
