//! Application and per-run configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults used when a run does not specify a value.
    #[serde(default)]
    pub defaults: ApplyDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyDefaults {
    /// Capture application that produced the files.
    pub capture_file_type: CaptureFileType,

    /// Where blendshape signals are written.
    pub blend_target: BlendTargetMode,

    /// First scene frame that receives a key.
    pub start_frame: i64,

    /// Leading capture frames to ignore.
    pub skip_frames: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "applicator=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ApplyDefaults {
    fn default() -> Self {
        Self {
            capture_file_type: CaptureFileType::LiveLinkFace,
            blend_target: BlendTargetMode::Morph,
            start_frame: 0,
            skip_frames: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("applicator").join("config.json")
}

/// Where blendshape signals are written on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlendTargetMode {
    /// Strength channel of same-named morph deformers.
    #[default]
    Morph,
    /// Named `item.channel` user channels.
    Channel,
}

impl FromStr for BlendTargetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morph" => Ok(Self::Morph),
            "channel" => Ok(Self::Channel),
            other => Err(format!(
                "unknown blend target '{other}' (expected morph or channel)"
            )),
        }
    }
}

impl std::fmt::Display for BlendTargetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Morph => write!(f, "Morph"),
            Self::Channel => write!(f, "Channel"),
        }
    }
}

/// Capture application that produced the input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureFileType {
    /// Live Link Face exports (`.csv`).
    #[default]
    LiveLinkFace,
    /// Face Cap exports (`.txt`).
    FaceCap,
}

impl CaptureFileType {
    /// Required file extension, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::LiveLinkFace => ".csv",
            Self::FaceCap => ".txt",
        }
    }

    /// Extension name shown in validation messages.
    pub fn extension_label(self) -> &'static str {
        match self {
            Self::LiveLinkFace => "CSV",
            Self::FaceCap => "TXT",
        }
    }
}

impl FromStr for CaptureFileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "-").as_str() {
            "live-link-face" | "livelinkface" => Ok(Self::LiveLinkFace),
            "face-cap" | "facecap" => Ok(Self::FaceCap),
            other => Err(format!(
                "unknown capture file type '{other}' (expected live-link-face or face-cap)"
            )),
        }
    }
}

impl std::fmt::Display for CaptureFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LiveLinkFace => write!(f, "Live Link Face"),
            Self::FaceCap => write!(f, "Face Cap"),
        }
    }
}

/// Immutable configuration of a single apply run.
///
/// Built once at the boundary (CLI arguments over [`ApplyDefaults`]) and
/// passed down through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyConfig {
    /// Capture application that produced the files.
    pub capture_file_type: CaptureFileType,

    /// Capture take to apply. Required.
    pub capture_path: PathBuf,

    /// Neutral-pose calibration take.
    #[serde(default)]
    pub neutral_path: Option<PathBuf>,

    /// Mapping table. Identity bindings are used when absent.
    #[serde(default)]
    pub mapping_path: Option<PathBuf>,

    /// Actor to target. When absent, the scene selection decides.
    #[serde(default)]
    pub target_name: Option<String>,

    /// Take (action clip) that receives the keys in actor mode.
    #[serde(default)]
    pub take_name: Option<String>,

    /// Whether keys may be added to a take that already exists.
    #[serde(default)]
    pub append_to_existing_take: bool,

    /// First scene frame that receives a key.
    #[serde(default)]
    pub start_frame: i64,

    /// Leading capture frames to ignore.
    #[serde(default)]
    pub skip_frames: usize,

    /// Where blendshape signals are written.
    #[serde(default)]
    pub blend_target: BlendTargetMode,
}

impl ApplyConfig {
    /// Config for a capture file with every other value taken from defaults.
    pub fn new(capture_path: impl Into<PathBuf>, defaults: &ApplyDefaults) -> Self {
        Self {
            capture_file_type: defaults.capture_file_type,
            capture_path: capture_path.into(),
            neutral_path: None,
            mapping_path: None,
            target_name: None,
            take_name: None,
            append_to_existing_take: false,
            start_frame: defaults.start_frame,
            skip_frames: defaults.skip_frames,
            blend_target: defaults.blend_target,
        }
    }

    /// Configured actor name, trimmed; `None` when blank.
    pub fn target_name(&self) -> Option<&str> {
        non_blank(self.target_name.as_deref())
    }

    /// Configured take name, trimmed; `None` when blank.
    pub fn take_name(&self) -> Option<&str> {
        non_blank(self.take_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_target_parsing() {
        assert_eq!("Morph".parse::<BlendTargetMode>(), Ok(BlendTargetMode::Morph));
        assert_eq!(
            " channel ".parse::<BlendTargetMode>(),
            Ok(BlendTargetMode::Channel)
        );
        assert!("bones".parse::<BlendTargetMode>().is_err());
    }

    #[test]
    fn test_capture_file_type_parsing_and_extension() {
        let face_cap: CaptureFileType = "Face Cap".parse().unwrap();
        assert_eq!(face_cap, CaptureFileType::FaceCap);
        assert_eq!(face_cap.extension(), ".txt");
        assert_eq!(
            "live-link-face".parse::<CaptureFileType>().unwrap().extension(),
            ".csv"
        );
    }

    #[test]
    fn test_blank_names_are_none() {
        let mut config = ApplyConfig::new("take.csv", &ApplyDefaults::default());
        config.target_name = Some("   ".to_string());
        config.take_name = Some(" Talk ".to_string());
        assert_eq!(config.target_name(), None);
        assert_eq!(config.take_name(), Some("Talk"));
    }

    #[test]
    fn test_apply_config_json_defaults() {
        let raw = r#"{"capture_file_type":"face-cap","capture_path":"take.txt"}"#;
        let config: ApplyConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.capture_file_type, CaptureFileType::FaceCap);
        assert_eq!(config.blend_target, BlendTargetMode::Morph);
        assert_eq!(config.skip_frames, 0);
        assert!(config.mapping_path.is_none());
    }

    #[test]
    fn test_app_config_tolerates_missing_sections() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.blend_target, BlendTargetMode::Morph);
    }

    #[test]
    fn test_app_config_load_from_file() {
        let dir = std::env::temp_dir().join("applicator_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        std::fs::write(
            &path,
            r#"{"defaults":{"capture_file_type":"face-cap","blend_target":"channel","start_frame":12,"skip_frames":0},"logging":{"level":"debug","json":true,"file":null}}"#,
        )
        .unwrap();
        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.defaults.capture_file_type, CaptureFileType::FaceCap);
        assert_eq!(loaded.defaults.blend_target, BlendTargetMode::Channel);
        assert_eq!(loaded.defaults.start_frame, 12);
        assert!(loaded.logging.json);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(AppConfig::load_from(&path).defaults.start_frame, 0);
        assert_eq!(AppConfig::load_from(&dir.join("missing.json")).logging.level, "info");

        std::fs::remove_dir_all(&dir).ok();
    }
}
