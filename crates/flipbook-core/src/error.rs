//! Error types for the flipbook animation pipeline.
//!
//! Every pipeline error is fatal to the run that raised it: a batch either
//! becomes one coherent animation or produces no artifact at all.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::TargetSize;

/// Top-level error type for flipbook operations.
#[derive(Error, Debug)]
pub enum FlipbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one variant per failure class of a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The batch contained no source images
    #[error("Empty batch: at least one source image is required")]
    EmptyBatch,

    /// A source could not be read or decoded
    #[error("Unreadable image {path}: {message}")]
    UnreadableImage { path: PathBuf, message: String },

    /// Scale factor is not usable, or floors a dimension to zero
    #[error("Invalid scale: {message}")]
    InvalidScale { message: String },

    /// Frame rate is not a positive integer
    #[error("Invalid frame rate {value:?}: must be a positive integer")]
    InvalidFrameRate { value: String },

    /// A frame's canvas differs from the first frame's
    #[error("Frame {index} is {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: TargetSize,
        actual: TargetSize,
    },

    /// The GIF codec could not represent the sequence
    #[error("Encoding failed: {message}")]
    Encoding { message: String },

    /// The run was abandoned at a frame checkpoint
    #[error("Cancelled after {completed} of {total} frames")]
    Cancelled { completed: usize, total: usize },

    /// The encoded artifact could not be written
    #[error("Failed to write {path}: {message}")]
    Output { path: PathBuf, message: String },
}

impl PipelineError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UnreadableImage {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

/// Convenience type alias for flipbook results.
pub type Result<T> = std::result::Result<T, FlipbookError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = PipelineError::DimensionMismatch {
            index: 2,
            expected: TargetSize::new(100, 50),
            actual: TargetSize::new(80, 50),
        };
        assert_eq!(err.to_string(), "Frame 2 is 80x50, expected 100x50");
    }

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: FlipbookError = PipelineError::EmptyBatch.into();
        assert!(matches!(
            err,
            FlipbookError::Pipeline(PipelineError::EmptyBatch)
        ));
        assert!(err.to_string().starts_with("Pipeline error"));
    }
}
