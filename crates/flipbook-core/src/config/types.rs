//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{ResizePolicy, DEFAULT_FPS, DEFAULT_SCALE_PERCENT};

/// Animation defaults applied when a run does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Playback rate in frames per second
    pub fps: u32,

    /// Loop count written to the GIF (0 = loop forever)
    pub loop_count: u16,

    /// Scale applied to the first frame's size, as a percentage
    pub scale_percent: u32,

    /// How frames are fitted to the target size: "exact" or "thumbnail"
    pub resize_policy: ResizePolicy,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            loop_count: 0,
            scale_percent: DEFAULT_SCALE_PERCENT,
            resize_policy: ResizePolicy::Exact,
        }
    }
}

/// Where the artifact lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory (supports `~`)
    pub dir: PathBuf,

    /// Fixed artifact file name, overwritten by every run
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("~/.flipbook/output"),
            file_name: "output.gif".to_string(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded source dimension (width or height)
    pub max_image_dimension: u32,

    /// Maximum frames in one animation
    pub max_frames: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 10000,
            max_frames: 1000,
        }
    }
}

/// Input handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Extensions picked up when a directory is given as input
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
