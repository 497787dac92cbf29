//! Transform driver and public decode entry points
//!
//! A scanline may have been read with either polarity and in either
//! direction. The driver tries the modules as-is, inverted, reversed, and
//! inverted then reversed, re-trimming each, and returns the first
//! symbol the dispatcher recognizes.

use enough::{Stop, Unstoppable};
use tracing::debug;

use crate::DecodeResult;
use crate::dispatch::{Dispatch, dispatch};
use crate::modules::{invert, modules_from_runs, reverse, trim};
use crate::types::{Decode, DecodeDiagnostics, DecodeOptions};

/// Orientation applied to the raw modules before trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    AsIs,
    Inverted,
    Reversed,
    InvertedReversed,
}

const TRANSFORMS: [Transform; 4] = [
    Transform::AsIs,
    Transform::Inverted,
    Transform::Reversed,
    Transform::InvertedReversed,
];

impl Transform {
    fn name(self) -> &'static str {
        match self {
            Transform::AsIs => "as-is",
            Transform::Inverted => "inverted",
            Transform::Reversed => "reversed",
            Transform::InvertedReversed => "inverted+reversed",
        }
    }

    fn apply(self, modules: &[bool]) -> Vec<bool> {
        match self {
            Transform::AsIs => modules.to_vec(),
            Transform::Inverted => invert(modules),
            Transform::Reversed => reverse(modules),
            Transform::InvertedReversed => reverse(&invert(modules)),
        }
    }
}

/// A decode call with options and a cooperative stop token
///
/// # Example
///
/// ```
/// use glyphline_decode::{DecodeJob, DecodeOptions, Unstoppable};
///
/// let options = DecodeOptions::default();
/// let job = DecodeJob::new(&options).with_stop(&Unstoppable);
/// assert!(!job.decode(&[false, false]).is_found());
/// ```
pub struct DecodeJob<'a> {
    options: &'a DecodeOptions,
    stop: &'a dyn Stop,
}

impl<'a> DecodeJob<'a> {
    /// Creates a job that never stops early
    pub fn new(options: &'a DecodeOptions) -> Self {
        Self {
            options,
            stop: &Unstoppable,
        }
    }

    /// Sets the stop token, polled between transforms and between decoders
    pub fn with_stop(mut self, stop: &'a dyn Stop) -> Self {
        self.stop = stop;
        self
    }

    /// Decodes one scanline of modules (`true` = dark)
    pub fn decode(&self, modules: &[bool]) -> Decode {
        self.decode_with_diagnostics(modules).0
    }

    /// Decodes alternating run lengths, the first run dark
    ///
    /// # Errors
    /// * [`DecodeError::ZeroLengthRun`](crate::DecodeError::ZeroLengthRun) if a run is zero
    /// * [`DecodeError::InputTooLong`](crate::DecodeError::InputTooLong) if the runs expand
    ///   past [`MAX_MODULES`](crate::modules::MAX_MODULES)
    pub fn decode_runs(&self, runs: &[u32]) -> DecodeResult<Decode> {
        let modules = modules_from_runs(runs)?;
        Ok(self.decode(&modules))
    }

    /// Decodes one scanline and reports what the driver tried
    pub fn decode_with_diagnostics(&self, modules: &[bool]) -> (Decode, DecodeDiagnostics) {
        let mut diagnostics = DecodeDiagnostics::default();

        for transform in TRANSFORMS {
            if self.stop.check().is_err() {
                debug!(transform = transform.name(), "decode stopped");
                diagnostics.cancelled = true;
                return (Decode::NotRecognized, diagnostics);
            }

            let transformed = transform.apply(modules);
            let trimmed = trim(&transformed);
            if trimmed.is_empty() {
                continue;
            }

            diagnostics.attempts += 1;
            match transform {
                Transform::AsIs => {}
                Transform::Inverted => diagnostics.inverted_tried = true,
                Transform::Reversed => diagnostics.reversed_tried = true,
                Transform::InvertedReversed => {
                    diagnostics.inverted_tried = true;
                    diagnostics.reversed_tried = true;
                }
            }
            debug!(
                transform = transform.name(),
                modules = trimmed.len(),
                "trying transform"
            );

            match dispatch(trimmed, self.options, self.stop) {
                Dispatch::Matched(result) => {
                    diagnostics.matched = Some(result.symbology);
                    return (Decode::Found(result), diagnostics);
                }
                Dispatch::NoMatch => {}
                Dispatch::Stopped => {
                    debug!(transform = transform.name(), "decode stopped");
                    diagnostics.cancelled = true;
                    return (Decode::NotRecognized, diagnostics);
                }
            }
        }

        (Decode::NotRecognized, diagnostics)
    }
}

/// Decodes one scanline of modules (`true` = dark)
///
/// # Example
///
/// ```
/// use glyphline_decode::{Decode, DecodeOptions, decode};
///
/// let result = decode(&[false, true, false], &DecodeOptions::default());
/// assert_eq!(result, Decode::NotRecognized);
/// ```
pub fn decode(modules: &[bool], options: &DecodeOptions) -> Decode {
    DecodeJob::new(options).decode(modules)
}

/// Decodes alternating run lengths whose first run is dark
///
/// # Errors
/// See [`DecodeJob::decode_runs`].
pub fn decode_runs(runs: &[u32], options: &DecodeOptions) -> DecodeResult<Decode> {
    DecodeJob::new(options).decode_runs(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;
    use crate::types::Symbology;
    use glyphline_test::fixtures;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_transform_apply() {
        let m = [true, true, false];
        assert_eq!(Transform::AsIs.apply(&m), vec![true, true, false]);
        assert_eq!(Transform::Inverted.apply(&m), vec![false, false, true]);
        assert_eq!(Transform::Reversed.apply(&m), vec![false, true, true]);
        assert_eq!(Transform::InvertedReversed.apply(&m), vec![true, false, false]);
    }

    #[test]
    fn test_empty_input() {
        let (result, diag) = DecodeJob::new(&DecodeOptions::default()).decode_with_diagnostics(&[]);
        assert_eq!(result, Decode::NotRecognized);
        assert_eq!(diag.attempts, 0);
        assert!(!diag.cancelled);
    }

    #[test]
    fn test_reversed_symbol() {
        let m = fixtures::code93("TEST93").unwrap();
        let reversed: Vec<bool> = m.iter().rev().copied().collect();
        let opts = DecodeOptions::default();
        let (result, diag) = DecodeJob::new(&opts).decode_with_diagnostics(&reversed);
        assert_eq!(result.found().map(|r| r.text.as_str()), Some("TEST93"));
        assert!(diag.reversed_tried);
        assert_eq!(diag.matched, Some(Symbology::Code93));
    }

    #[test]
    fn test_inverted_symbol() {
        let m = fixtures::code93("TEST93").unwrap();
        // Light margins become dark after inversion and are trimmed away
        let mut framed = vec![true; 3];
        framed.extend(m.iter().map(|&b| !b));
        framed.extend([true; 3]);
        let (result, diag) =
            DecodeJob::new(&DecodeOptions::default()).decode_with_diagnostics(&framed);
        assert_eq!(result.found().map(|r| r.text.as_str()), Some("TEST93"));
        assert!(diag.inverted_tried);
        assert!(!diag.reversed_tried);
    }

    struct Flag(AtomicBool);

    impl Stop for Flag {
        fn check(&self) -> Result<(), enough::StopReason> {
            if self.0.load(Ordering::Relaxed) {
                Err(enough::StopReason::Cancelled)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_cancelled() {
        let stop = Flag(AtomicBool::new(true));
        let m = fixtures::ean13("400638133393").unwrap();
        let opts = DecodeOptions::default();
        let (result, diag) = DecodeJob::new(&opts)
            .with_stop(&stop)
            .decode_with_diagnostics(&m);
        assert_eq!(result, Decode::NotRecognized);
        assert!(diag.cancelled);
        assert_eq!(diag.attempts, 0);
    }

    #[test]
    fn test_decode_runs_errors() {
        let opts = DecodeOptions::default();
        assert_eq!(
            decode_runs(&[1, 0, 1], &opts),
            Err(DecodeError::ZeroLengthRun { index: 1 })
        );
        assert!(matches!(
            decode_runs(&[1 << 20, 1], &opts),
            Err(DecodeError::InputTooLong { .. })
        ));
    }
}
