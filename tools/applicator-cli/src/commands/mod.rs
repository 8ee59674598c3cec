pub mod apply;
pub mod info;
pub mod neutral;
pub mod validate;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use applicator_capture_model::scene_graph::SceneGraph;
use applicator_common::config::{ApplyConfig, ApplyDefaults, BlendTargetMode, CaptureFileType};

/// Inputs shared by `apply` and `validate`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scene description (JSON)
    #[arg(long)]
    pub scene: PathBuf,

    /// Capture take to apply
    #[arg(short, long)]
    pub capture: PathBuf,

    /// Neutral-pose calibration take
    #[arg(short, long)]
    pub neutral: Option<PathBuf>,

    /// Mapping table (identity mapping when omitted)
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Actor to target instead of the scene selection
    #[arg(long)]
    pub actor: Option<String>,

    /// Take that receives the keys (actor targets only)
    #[arg(long)]
    pub take: Option<String>,

    /// Allow adding keys to a take that already exists
    #[arg(long)]
    pub append: bool,

    /// First scene frame that receives a key
    #[arg(long, allow_negative_numbers = true)]
    pub start_frame: Option<i64>,

    /// Leading capture frames to ignore
    #[arg(long)]
    pub skip_frames: Option<usize>,

    /// Blendshape target: morph or channel
    #[arg(long)]
    pub blend_target: Option<BlendTargetMode>,

    /// Capture app: live-link-face or face-cap
    #[arg(long)]
    pub file_type: Option<CaptureFileType>,
}

impl RunArgs {
    /// Run configuration from these arguments over the configured defaults.
    pub fn to_config(&self, defaults: &ApplyDefaults) -> ApplyConfig {
        let mut config = ApplyConfig::new(&self.capture, defaults);
        config.neutral_path = self.neutral.clone();
        config.mapping_path = self.mapping.clone();
        config.target_name = self.actor.clone();
        config.take_name = self.take.clone();
        config.append_to_existing_take = self.append;
        if let Some(file_type) = self.file_type {
            config.capture_file_type = file_type;
        }
        if let Some(blend_target) = self.blend_target {
            config.blend_target = blend_target;
        }
        if let Some(start_frame) = self.start_frame {
            config.start_frame = start_frame;
        }
        if let Some(skip_frames) = self.skip_frames {
            config.skip_frames = skip_frames;
        }
        config
    }

    pub fn load_scene(&self) -> anyhow::Result<SceneGraph> {
        SceneGraph::load(&self.scene)
            .with_context(|| format!("Failed to load scene {}", self.scene.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> RunArgs {
        let argv = std::iter::once("applicator").chain(args.iter().copied());
        Harness::try_parse_from(argv).unwrap().run
    }

    #[test]
    fn test_defaults_fill_missing_arguments() {
        let defaults = ApplyDefaults {
            capture_file_type: CaptureFileType::FaceCap,
            blend_target: BlendTargetMode::Channel,
            start_frame: 10,
            skip_frames: 2,
        };
        let config = parse(&["--scene", "scene.json", "--capture", "take.txt"]).to_config(&defaults);
        assert_eq!(config.capture_file_type, CaptureFileType::FaceCap);
        assert_eq!(config.blend_target, BlendTargetMode::Channel);
        assert_eq!(config.start_frame, 10);
        assert_eq!(config.skip_frames, 2);
        assert!(config.mapping_path.is_none());
        assert!(!config.append_to_existing_take);
    }

    #[test]
    fn test_arguments_override_defaults() {
        let config = parse(&[
            "--scene",
            "scene.json",
            "--capture",
            "take.csv",
            "--mapping",
            "map.csv",
            "--actor",
            "Hero",
            "--take",
            "Talk",
            "--append",
            "--start-frame",
            "-5",
            "--blend-target",
            "channel",
            "--file-type",
            "live-link-face",
        ])
        .to_config(&ApplyDefaults::default());
        assert_eq!(config.mapping_path, Some(PathBuf::from("map.csv")));
        assert_eq!(config.target_name(), Some("Hero"));
        assert_eq!(config.take_name(), Some("Talk"));
        assert!(config.append_to_existing_take);
        assert_eq!(config.start_frame, -5);
        assert_eq!(config.blend_target, BlendTargetMode::Channel);
        assert_eq!(config.capture_file_type, CaptureFileType::LiveLinkFace);
    }

    #[test]
    fn test_unknown_blend_target_is_rejected() {
        let argv = [
            "applicator",
            "--scene",
            "s.json",
            "--capture",
            "t.csv",
            "--blend-target",
            "bones",
        ];
        assert!(Harness::try_parse_from(argv).is_err());
    }
}
