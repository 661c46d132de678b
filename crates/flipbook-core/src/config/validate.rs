//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::pipeline::encode::MAX_GIF_DIMENSION;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.fps == 0 {
            return Err(ConfigError::ValidationError(
                "animation.fps must be > 0".into(),
            ));
        }
        if self.animation.scale_percent == 0 {
            return Err(ConfigError::ValidationError(
                "animation.scale_percent must be > 0".into(),
            ));
        }
        let name = self.output.file_name.as_str();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(
                "output.file_name must be a bare, non-empty file name".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension > MAX_GIF_DIMENSION {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_image_dimension must be <= {MAX_GIF_DIMENSION} (GIF canvas limit)"
            )));
        }
        if self.limits.max_frames == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_frames must be > 0".into(),
            ));
        }
        Ok(())
    }
}
