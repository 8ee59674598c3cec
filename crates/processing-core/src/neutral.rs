//! Neutral-pose calibration.
//!
//! ARKit reports a relaxed face with small non-zero weights that differ per
//! performer. A short calibration take of the neutral face is averaged into
//! a per-signal baseline which the transformer later subtracts out.

use applicator_capture_model::take::Take;
use applicator_common::error::{ApplicatorError, ApplicatorResult};

/// Decimal places neutral values are rounded to.
const NEUTRAL_DECIMALS: i32 = 10;

/// Per-signal baseline values in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeutralProfile {
    values: Vec<(String, f64)>,
}

impl NeutralProfile {
    /// A profile with every signal at 0.0.
    pub fn zero<S: AsRef<str>>(signals: &[S]) -> Self {
        Self {
            values: signals
                .iter()
                .map(|s| (s.as_ref().to_string(), 0.0))
                .collect(),
        }
    }

    /// Average the middle third of a calibration take for each signal.
    ///
    /// Samples are clamped to `[0, 1]` before summing and each average is
    /// rounded to 10 decimal places. Without a calibration take, or with one
    /// too short to have a middle third, every neutral is 0.0.
    pub fn compute<S: AsRef<str>>(
        signals: &[S],
        calibration: Option<&Take>,
    ) -> ApplicatorResult<Self> {
        let Some(take) = calibration else {
            return Ok(Self::zero(signals));
        };

        let start = take.len() / 3;
        let end = start * 2;
        if start == 0 {
            tracing::warn!(
                "Neutral take {} has {} frames; using zero neutrals",
                take.source().display(),
                take.len()
            );
            return Ok(Self::zero(signals));
        }

        let mut values = Vec::with_capacity(signals.len());
        for signal in signals {
            let signal = signal.as_ref();
            let track = take.track(signal)?;
            let mut sum = 0.0;
            for index in start..end {
                let raw = track.raw(index).unwrap_or_default();
                let sample: f64 = raw.parse().map_err(|_| {
                    ApplicatorError::file_format(
                        track.source(),
                        format!("invalid {signal} value '{raw}' at frame {index}"),
                    )
                })?;
                sum += sample.clamp(0.0, 1.0);
            }
            values.push((signal.to_string(), round_to(sum / start as f64, NEUTRAL_DECIMALS)));
        }

        tracing::debug!(
            "Computed {} neutrals from frames {}..{} of {}",
            values.len(),
            start,
            end,
            take.source().display()
        );
        Ok(Self { values })
    }

    /// Neutral of a signal; 0.0 for signals the profile does not hold.
    pub fn get(&self, signal: &str) -> f64 {
        self.values
            .iter()
            .find(|(name, _)| name == signal)
            .map(|(_, value)| *value)
            .unwrap_or(0.0)
    }

    /// `(signal, neutral)` pairs in calibration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
