//! Frame cadence selection.
//!
//! Capture apps record at ~60 fps while the scene may run slower. A cadence
//! pattern decides, per source frame, whether it is keyed onto the timeline
//! (advancing the output frame) or dropped. Each supported rate has a short
//! base pattern that is tiled across the take.

use applicator_common::clock::FrameRate;

/// Base keep/drop slots for a rate (`Y` keeps, `n` drops).
fn base_slots(rate: FrameRate) -> &'static str {
    match rate {
        FrameRate::Fps24 => "YnYnYnnnYnYnnnYnYnYn",
        FrameRate::Fps25 => "YnYnYnYnYnnn",
        FrameRate::Fps29_97 | FrameRate::Fps30 => "Yn",
        FrameRate::Fps48 => "YYYnYYnYYY",
        FrameRate::Fps50 => "YYYYYn",
        FrameRate::Fps60 => "Y",
    }
}

/// Keep/drop decision for every source frame of a take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadencePattern {
    rate: FrameRate,
    slots: Vec<bool>,
}

impl CadencePattern {
    /// The untiled base pattern for a rate.
    pub fn base(rate: FrameRate) -> Self {
        Self {
            rate,
            slots: base_slots(rate).chars().map(|c| c == 'Y').collect(),
        }
    }

    /// Base pattern tiled until it is longer than `frame_count`.
    pub fn for_take(rate: FrameRate, frame_count: usize) -> Self {
        let base = Self::base(rate);
        let mut slots = Vec::with_capacity(frame_count + base.slots.len());
        while slots.len() <= frame_count {
            slots.extend_from_slice(&base.slots);
        }
        Self { rate, slots }
    }

    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Whether source frame `index` is keyed. Frames past the pattern are
    /// dropped.
    pub fn is_kept(&self, index: usize) -> bool {
        self.slots.get(index).copied().unwrap_or(false)
    }

    pub fn slots(&self) -> &[bool] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of output frames produced from `frame_count` source frames
    /// when the first `skip_frames` are ignored.
    pub fn output_frame_count(&self, frame_count: usize, skip_frames: usize) -> usize {
        (skip_frames..frame_count)
            .filter(|&index| self.is_kept(index))
            .count()
    }

    /// Fraction of source frames kept by the base pattern.
    pub fn true_ratio(rate: FrameRate) -> f64 {
        let base = Self::base(rate);
        let kept = base.slots.iter().filter(|&&keep| keep).count();
        kept as f64 / base.slots.len() as f64
    }
}
