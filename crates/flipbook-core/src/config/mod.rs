//! Configuration management for flipbook.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. The output location lives here rather than in process-wide state,
//! so every [`Pipeline`](crate::pipeline::Pipeline) is handed its own copy.

mod types;
mod validate;

pub use types::*;

use crate::error::{ConfigError, PipelineResult};
use crate::types::{PlaybackConfig, ScaleFactor, ScalePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback and scaling defaults
    pub animation: AnimationConfig,

    /// Output location
    pub output: OutputConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Input handling
    pub processing: ProcessingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.flipbook.flipbook/config.toml
    /// - Linux: ~/.config/flipbook/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\flipbook\config\config.toml
    ///
    /// Falls back to ~/.flipbook/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "flipbook", "flipbook")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".flipbook").join("config.toml")
            })
    }

    /// Resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.output.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Full path of the artifact every run overwrites.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(&self.output.file_name)
    }

    /// Scale policy from the `[animation]` defaults.
    pub fn scale_policy(&self) -> PipelineResult<ScalePolicy> {
        let factor = ScaleFactor::from_percent(self.animation.scale_percent)?;
        Ok(ScalePolicy::new(factor, self.animation.resize_policy))
    }

    /// Playback settings from the `[animation]` defaults.
    pub fn playback(&self) -> PipelineResult<PlaybackConfig> {
        Ok(PlaybackConfig::new(self.animation.fps)?.with_loop_count(self.animation.loop_count))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
