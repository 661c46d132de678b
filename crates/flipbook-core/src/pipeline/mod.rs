//! Batch image-to-animation pipeline.
//!
//! - **validate**: Cheap pre-decode checks on source files
//! - **decode**: Load and decode source images
//! - **discovery**: Expand directory inputs into ordered source lists
//! - **rescale**: Derive the target size and fit frames to it
//! - **encode**: Encode frame sequences as looping GIFs
//! - **store**: Persist the artifact to its fixed output slot
//! - **processor**: Orchestrates a full run

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod processor;
pub mod rescale;
pub mod store;
pub mod validate;

// Re-exports for convenient access
pub use decode::{ImageDecoder, SourceImage};
pub use discovery::FileDiscovery;
pub use encode::{AnimationArtifact, AnimationEncoder, FrameSequence};
pub use processor::{CancelFlag, Pipeline, RunHooks};
pub use rescale::{Frame, FrameRescaler};
pub use store::OutputStore;
pub use validate::Validator;
