//! Per-frame signal transformation.
//!
//! For each source frame the cadence keeps, a raw capture field becomes a
//! key value:
//!
//! 1. Truncate the field to 6 characters and parse it
//! 2. Optionally average it with up to 3 neighbours on each side
//! 3. Clamp (magnitudes to `[0, 1]`, rotations to `[-1, 1]`)
//! 4. Add the value shift
//! 5. Rotations only: scale to degrees
//! 6. Apply the multiplier
//! 7. Magnitudes only: neutral-correct, round to 4 places, scale angle channels
//! 8. Rotations only: convert degrees to radians
//!
//! Output frames are numbered consecutively from the start frame.

use applicator_capture_model::keyframes::KeyWrite;
use applicator_capture_model::scene::{ChannelKind, ChannelTarget, TargetNode};
use applicator_capture_model::take::{SignalTrack, Take};
use applicator_common::clock::FrameRate;
use applicator_common::error::{ApplicatorError, ApplicatorResult};

use crate::cadence::CadencePattern;
use crate::mapping::BindingModifiers;
use crate::plan::KeyframePlan;

/// Characters of a capture field that are parsed; the rest is discarded.
pub const TRUNCATED_FIELD_WIDTH: usize = 6;

/// Neighbours on each side included in the smoothing window.
pub const SMOOTHING_RADIUS: usize = 3;

/// Degrees per normalized rotation unit.
pub const DEGREES_PER_UNIT: f64 = 90.0;

/// Scale applied to magnitudes written to angle channels (0..45°).
pub const ANGLE_STRENGTH_SCALE: f64 = 0.785398163397;

/// Smallest `1 - neutral` used as the neutral-correction divisor.
pub const MIN_NEUTRAL_SPAN: f64 = 1e-4;

/// Parse the first [`TRUNCATED_FIELD_WIDTH`] characters of a field.
///
/// `"0.1234567"` parses as `0.1234`: digits are cut, never rounded.
pub fn parse_truncated(raw: &str) -> Option<f64> {
    let cut = raw
        .char_indices()
        .nth(TRUNCATED_FIELD_WIDTH)
        .map_or(raw.len(), |(index, _)| index);
    raw[..cut].parse().ok()
}

/// How a signal's values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalChannel {
    /// Blendshape weight, neutral-corrected. `angular` targets are angle
    /// channels.
    Magnitude { neutral: f64, angular: bool },
    /// Normalized rotation, written in radians.
    Rotation,
}

impl SignalChannel {
    /// Magnitude channel for a target channel kind.
    pub fn magnitude(neutral: f64, kind: ChannelKind) -> Self {
        SignalChannel::Magnitude {
            neutral,
            angular: kind == ChannelKind::Angle,
        }
    }
}

/// Turns capture tracks into key series for one take and cadence.
#[derive(Debug, Clone, Copy)]
pub struct SignalTransformer<'a> {
    take: &'a Take,
    cadence: &'a CadencePattern,
    start_frame: i64,
    skip_frames: usize,
}

impl<'a> SignalTransformer<'a> {
    pub fn new(
        take: &'a Take,
        cadence: &'a CadencePattern,
        start_frame: i64,
        skip_frames: usize,
    ) -> Self {
        Self {
            take,
            cadence,
            start_frame,
            skip_frames,
        }
    }

    pub fn rate(&self) -> FrameRate {
        self.cadence.rate()
    }

    /// `(output frame, value)` pairs for one signal.
    ///
    /// Empty when the take has no frames past `skip_frames`.
    pub fn transform(
        &self,
        signal: &str,
        modifiers: &BindingModifiers,
        channel: SignalChannel,
    ) -> ApplicatorResult<Vec<(i64, f64)>> {
        let track = self.take.track(signal)?;
        let frame_count = track.len();
        if frame_count <= self.skip_frames {
            return Ok(Vec::new());
        }

        let mut series = Vec::new();
        let mut frame = self.start_frame;
        for index in self.skip_frames..frame_count {
            if !self.cadence.is_kept(index) {
                continue;
            }

            let raw = if modifiers.smooth {
                smoothed_sample(&track, index)?
            } else {
                sample(&track, index)?
            };

            let value = match channel {
                SignalChannel::Magnitude { neutral, angular } => {
                    let shifted = raw.clamp(0.0, 1.0) + modifiers.value_shift;
                    let scaled = shifted * modifiers.multiplier;
                    let span = (1.0 - neutral).max(MIN_NEUTRAL_SPAN);
                    let corrected = round4((scaled - neutral) / span);
                    if angular {
                        corrected * ANGLE_STRENGTH_SCALE
                    } else {
                        corrected
                    }
                }
                SignalChannel::Rotation => {
                    let shifted = raw.clamp(-1.0, 1.0) + modifiers.value_shift;
                    let degrees = shifted * DEGREES_PER_UNIT * modifiers.multiplier;
                    degrees.to_radians()
                }
            };

            series.push((frame, value));
            frame += 1;
        }
        Ok(series)
    }

    /// Transform `signal` and plan one key per output frame on `node`.
    /// Returns the number of keys planned.
    #[allow(clippy::too_many_arguments)]
    pub fn apply<N: TargetNode>(
        &self,
        plan: &mut KeyframePlan,
        node: &N,
        target: ChannelTarget,
        signal: &str,
        modifiers: &BindingModifiers,
        channel: SignalChannel,
        take: Option<&str>,
    ) -> ApplicatorResult<usize> {
        let series = self.transform(signal, modifiers, channel)?;
        let rate = self.rate();
        for &(frame, value) in &series {
            plan.push(KeyWrite {
                node: node.id(),
                node_name: node.name().to_string(),
                target: target.clone(),
                frame,
                time: rate.frame_to_time(frame),
                value,
                take: take.map(str::to_string),
            });
        }
        tracing::debug!(
            "{} -> {}.{}: {} keys",
            signal,
            node.name(),
            target,
            series.len()
        );
        Ok(series.len())
    }
}

fn sample(track: &SignalTrack<'_>, index: usize) -> ApplicatorResult<f64> {
    let raw = track.raw(index).unwrap_or_default();
    parse_truncated(raw).ok_or_else(|| {
        ApplicatorError::file_format(
            track.source(),
            format!("invalid {} value '{raw}' at frame {index}", track.signal()),
        )
    })
}

/// Mean of the samples within [`SMOOTHING_RADIUS`] of `index`, clipped to
/// the track.
fn smoothed_sample(track: &SignalTrack<'_>, index: usize) -> ApplicatorResult<f64> {
    let first = index.saturating_sub(SMOOTHING_RADIUS);
    let last = (index + SMOOTHING_RADIUS).min(track.len() - 1);
    let mut sum = 0.0;
    for neighbour in first..=last {
        sum += sample(track, neighbour)?;
    }
    Ok(sum / (last - first + 1) as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn take(values: &[&str]) -> Take {
        let mut content = String::from("jawOpen,HeadYaw\n");
        for value in values {
            content.push_str(&format!("{value},{value}\n"));
        }
        Take::parse("capture.csv", &content).unwrap()
    }

    fn magnitude(neutral: f64) -> SignalChannel {
        SignalChannel::Magnitude {
            neutral,
            angular: false,
        }
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(parse_truncated("0.1234567"), Some(0.1234));
        assert_eq!(parse_truncated("-0.1299"), Some(-0.129));
        assert_eq!(parse_truncated("1"), Some(1.0));
        assert_eq!(parse_truncated("abc"), None);
        assert_eq!(parse_truncated(""), None);
    }

    #[test]
    fn test_straight_through_values() {
        let take = take(&["0.500000", "0.250000", "1.500000"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 10, 0);

        let series = transformer
            .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(0.0))
            .unwrap();
        assert_eq!(series, vec![(10, 0.5), (11, 0.25), (12, 1.0)]);
    }

    #[test]
    fn test_rotation_to_radians() {
        let take = take(&["0.500000"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
        let modifiers = BindingModifiers {
            multiplier: 2.0,
            ..BindingModifiers::IDENTITY
        };

        let series = transformer
            .transform("HeadYaw", &modifiers, SignalChannel::Rotation)
            .unwrap();
        assert!((series[0].1 - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_clamps_to_unit_range() {
        let take = take(&["-3.0000"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
        let series = transformer
            .transform("HeadYaw", &BindingModifiers::IDENTITY, SignalChannel::Rotation)
            .unwrap();
        assert!((series[0].1 + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_correction_and_modifiers() {
        let take = take(&["0.600000"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
        let modifiers = BindingModifiers {
            multiplier: 2.0,
            value_shift: -0.1,
            ..BindingModifiers::IDENTITY
        };

        // (0.6 - 0.1) * 2 = 1.0; (1.0 - 0.2) / 0.8 = 1.0
        let series = transformer
            .transform("jawOpen", &modifiers, magnitude(0.2))
            .unwrap();
        assert_eq!(series[0].1, 1.0);
    }

    #[test]
    fn test_angle_channel_scaling() {
        let take = take(&["0.500000"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
        let series = transformer
            .transform(
                "jawOpen",
                &BindingModifiers::IDENTITY,
                SignalChannel::magnitude(0.0, ChannelKind::Angle),
            )
            .unwrap();
        assert!((series[0].1 - 0.5 * ANGLE_STRENGTH_SCALE).abs() < 1e-12);
    }

    #[test]
    fn test_full_neutral_uses_floor() {
        let take = take(&["1.000000"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
        let series = transformer
            .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(1.0))
            .unwrap();
        assert_eq!(series[0].1, 0.0);
        assert!(series[0].1.is_finite());
    }

    #[test]
    fn test_cadence_and_skip() {
        let take = take(&["0.1", "0.2", "0.3", "0.4", "0.5", "0.6"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps30, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 5, 1);

        let series = transformer
            .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(0.0))
            .unwrap();
        assert_eq!(series, vec![(5, 0.3), (6, 0.5)]);
    }

    #[test]
    fn test_skip_past_end_produces_nothing() {
        let take = take(&["0.1", "0.2"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 2);
        let series = transformer
            .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(0.0))
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_smoothing_window_clips_at_edges() {
        let take = take(&["0.0", "0.8", "0.0", "0.0", "0.0"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
        let modifiers = BindingModifiers {
            smooth: true,
            ..BindingModifiers::IDENTITY
        };

        let series = transformer
            .transform("jawOpen", &modifiers, magnitude(0.0))
            .unwrap();
        // frame 0 averages 0..=3, frame 4 averages 1..=4
        assert_eq!(series[0].1, 0.2);
        assert_eq!(series[4].1, 0.2);
    }

    #[test]
    fn test_missing_signal_and_bad_field() {
        let take = take(&["0.1", "oops"]);
        let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
        let transformer = SignalTransformer::new(&take, &cadence, 0, 0);

        let missing = transformer
            .transform("cheekPuff", &BindingModifiers::IDENTITY, magnitude(0.0))
            .unwrap_err();
        assert!(matches!(missing, ApplicatorError::FileFormat { .. }));

        let bad = transformer
            .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(0.0))
            .unwrap_err();
        assert!(bad.to_string().contains("oops"));
    }

    proptest! {
        #[test]
        fn prop_over_range_matches_one(excess in 1.0f64..9.0) {
            let over = format!("{excess:.4}");
            let take = take(&[over.as_str(), "1.0000"]);
            let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
            let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
            let series = transformer
                .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(0.0))
                .unwrap();
            prop_assert_eq!(series[0].1, series[1].1);
        }

        #[test]
        fn prop_smoothing_constant_track_is_identity(
            c in 0.0f64..1.0,
            frames in 1usize..40,
            rate_index in 0usize..7,
        ) {
            let value = format!("{c:.4}");
            let values = vec![value.as_str(); frames];
            let take = take(&values);
            let cadence = CadencePattern::for_take(FrameRate::ALL[rate_index], take.len());
            let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
            let smooth = BindingModifiers { smooth: true, ..BindingModifiers::IDENTITY };

            let plain = transformer
                .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(0.0))
                .unwrap();
            let smoothed = transformer.transform("jawOpen", &smooth, magnitude(0.0)).unwrap();
            prop_assert_eq!(plain.len(), smoothed.len());
            for ((_, a), (_, b)) in plain.iter().zip(&smoothed) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_magnitudes_stay_in_unit_range(raw in -5.0f64..5.0, neutral in 0.0f64..0.99) {
            let value = format!("{raw:.3}");
            let take = take(&[value.as_str()]);
            let cadence = CadencePattern::for_take(FrameRate::Fps60, take.len());
            let transformer = SignalTransformer::new(&take, &cadence, 0, 0);
            let series = transformer
                .transform("jawOpen", &BindingModifiers::IDENTITY, magnitude(neutral))
                .unwrap();
            prop_assert!(series[0].1 <= 1.0);
        }
    }
}
