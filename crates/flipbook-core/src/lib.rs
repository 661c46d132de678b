//! Flipbook Core - turns an ordered batch of still images into a looping GIF.
//!
//! # Architecture
//!
//! ```text
//! Sources → Validate → Decode → Rescale (to first frame × scale) → Encode GIF → Store
//! ```
//!
//! The first source fixes the batch's target size; every frame is fitted to
//! it, in submission order, and the result is written to a single well-known
//! output file that each run replaces.
//!
//! # Usage
//!
//! ```rust,no_run
//! use flipbook_core::{Config, Pipeline, PlaybackConfig, ScaleFactor, ScalePolicy};
//! use std::path::PathBuf;
//!
//! fn main() -> flipbook_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::new(&config);
//!
//!     let scale = ScalePolicy::new(ScaleFactor::parse_percent(Some("50"))?, Default::default());
//!     let playback = PlaybackConfig::parse_fps(Some("10"))?;
//!     let sources = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
//!
//!     let artifact = pipeline.run(&sources, &scale, &playback)?;
//!     println!("{} frames -> {:?}", artifact.frame_count(), artifact.path());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, FlipbookError, PipelineError, PipelineResult, Result};
pub use pipeline::{
    AnimationArtifact, AnimationEncoder, CancelFlag, Frame, FrameRescaler, FrameSequence,
    OutputStore, Pipeline, RunHooks, SourceImage,
};
pub use types::{
    ArtifactSummary, PlaybackConfig, ResizePolicy, ScaleFactor, ScalePolicy, TargetSize,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
