//! Scene clock and frame-rate utilities.
//!
//! Capture devices record at a fixed ~60 fps. The scene timeline runs at
//! one of a small set of supported rates; this module provides:
//! - The closed set of supported rates
//! - Matching a host-reported rate against that set
//! - Converting output frame numbers to scene time

use serde::{Deserialize, Serialize};

/// Tolerance used when matching a host-reported fps against a supported rate.
pub const FPS_TOLERANCE: f64 = 0.005;

/// Scene frame rates the applicator can resample capture data onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameRate {
    #[serde(rename = "24")]
    Fps24,
    #[serde(rename = "25")]
    Fps25,
    #[serde(rename = "29.97")]
    Fps29_97,
    #[serde(rename = "30")]
    Fps30,
    #[serde(rename = "48")]
    Fps48,
    #[serde(rename = "50")]
    Fps50,
    #[serde(rename = "60")]
    Fps60,
}

impl FrameRate {
    /// All supported rates, highest first.
    pub const ALL: [FrameRate; 7] = [
        FrameRate::Fps60,
        FrameRate::Fps50,
        FrameRate::Fps48,
        FrameRate::Fps30,
        FrameRate::Fps29_97,
        FrameRate::Fps25,
        FrameRate::Fps24,
    ];

    /// Match a host-reported rate. Returns `None` for unsupported rates.
    pub fn from_fps(fps: f64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|rate| (rate.fps() - fps).abs() < FPS_TOLERANCE)
    }

    /// Nominal frames per second.
    pub fn fps(self) -> f64 {
        match self {
            FrameRate::Fps24 => 24.0,
            FrameRate::Fps25 => 25.0,
            FrameRate::Fps29_97 => 29.97,
            FrameRate::Fps30 => 30.0,
            FrameRate::Fps48 => 48.0,
            FrameRate::Fps50 => 50.0,
            FrameRate::Fps60 => 60.0,
        }
    }

    /// Scene time in seconds of an output frame number.
    pub fn frame_to_time(self, frame: i64) -> f64 {
        frame as f64 / self.fps()
    }

    /// Human-readable list of supported rates, for validation messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|rate| rate.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameRate::Fps29_97 => write!(f, "29.97"),
            other => write!(f, "{}", other.fps() as u32),
        }
    }
}
