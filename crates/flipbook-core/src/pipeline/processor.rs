//! Pipeline orchestration - loads, rescales, encodes, and stores a batch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{PlaybackConfig, ScalePolicy, TargetSize};

use super::decode::{ImageDecoder, SourceImage};
use super::discovery::FileDiscovery;
use super::encode::{AnimationArtifact, AnimationEncoder, FrameSequence};
use super::rescale::{Frame, FrameRescaler};
use super::store::OutputStore;
use super::validate::Validator;

/// Shared flag for abandoning a run between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-frame progress callback: `(frames_done, total)`.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send>;

/// Optional observers for a run.
#[derive(Default)]
pub struct RunHooks {
    cancel: Option<CancelFlag>,
    on_frame: Option<ProgressFn>,
}

impl RunHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `flag` before loading each frame.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Call `f` after each frame is rescaled.
    pub fn with_progress(mut self, f: impl Fn(usize, usize) + Send + 'static) -> Self {
        self.on_frame = Some(Box::new(f));
        self
    }

    fn checkpoint(&self, completed: usize, total: usize) -> PipelineResult<()> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => {
                Err(PipelineError::Cancelled { completed, total })
            }
            _ => Ok(()),
        }
    }

    fn frame_done(&self, completed: usize, total: usize) {
        if let Some(f) = &self.on_frame {
            f(completed, total);
        }
    }
}

/// The batch coordinator.
///
/// One run is synchronous and owns everything it creates; nothing outlives it
/// except the artifact written to the store.
pub struct Pipeline {
    validator: Validator,
    decoder: ImageDecoder,
    encoder: AnimationEncoder,
    discovery: FileDiscovery,
    store: OutputStore,
}

impl Pipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            encoder: AnimationEncoder::new(
                config.output.file_name.clone(),
                config.limits.max_frames,
            ),
            discovery: FileDiscovery::new(config.processing.clone()),
            store: OutputStore::from_config(config),
        }
    }

    /// Replace the output store (e.g. to target a different directory).
    pub fn with_store(mut self, store: OutputStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Expand file and directory inputs into ordered source paths.
    pub fn discover(&self, inputs: &[PathBuf]) -> PipelineResult<Vec<PathBuf>> {
        self.discovery.expand(inputs)
    }

    /// Validate and decode one source.
    pub fn load(&self, path: &Path) -> PipelineResult<SourceImage> {
        self.validator.validate(path)?;
        self.decoder.decode(path)
    }

    /// Run the whole batch and write the artifact to the store.
    pub fn run(
        &self,
        sources: &[PathBuf],
        scale: &ScalePolicy,
        playback: &PlaybackConfig,
    ) -> PipelineResult<AnimationArtifact> {
        self.run_with_hooks(sources, scale, playback, &RunHooks::default())
    }

    /// [`run`](Self::run) with cancellation and progress observers.
    pub fn run_with_hooks(
        &self,
        sources: &[PathBuf],
        scale: &ScalePolicy,
        playback: &PlaybackConfig,
        hooks: &RunHooks,
    ) -> PipelineResult<AnimationArtifact> {
        let frames = self.assemble(sources, scale, hooks)?;
        self.finish(frames, playback)
    }

    /// Load and rescale every source, in order, to the batch target size.
    ///
    /// The first source fixes the target size. Any failure aborts the batch.
    pub fn assemble(
        &self,
        sources: &[PathBuf],
        scale: &ScalePolicy,
        hooks: &RunHooks,
    ) -> PipelineResult<FrameSequence> {
        let (first_path, rest) = sources.split_first().ok_or(PipelineError::EmptyBatch)?;
        let total = sources.len();
        let start = Instant::now();
        let rescaler = FrameRescaler::new(scale.resize);

        hooks.checkpoint(0, total)?;
        let first = self.load(first_path)?;
        let target = FrameRescaler::compute_target_size(&first, scale)?;
        tracing::debug!(
            "Target size {} from {:?} ({}x{} at {}, {} policy)",
            target,
            first_path,
            first.width,
            first.height,
            scale.factor,
            rescaler.policy()
        );

        let mut frames = FrameSequence::with_capacity(total);
        frames.push(self.rescale_at(&rescaler, first, target, 0)?);
        hooks.frame_done(1, total);

        for (offset, path) in rest.iter().enumerate() {
            let index = offset + 1;
            hooks.checkpoint(index, total)?;

            let load_start = Instant::now();
            let source = self.load(path)?;
            tracing::trace!("  Load {:?}: {:?}", path, load_start.elapsed());

            let rescale_start = Instant::now();
            frames.push(self.rescale_at(&rescaler, source, target, index)?);
            tracing::trace!("  Rescale {:?}: {:?}", path, rescale_start.elapsed());

            hooks.frame_done(index + 1, total);
        }

        tracing::debug!(
            "Assembled {} frames at {} in {:?}",
            frames.len(),
            target,
            start.elapsed()
        );
        Ok(frames)
    }

    /// Encode an assembled sequence and write it to the store.
    pub fn finish(
        &self,
        frames: FrameSequence,
        playback: &PlaybackConfig,
    ) -> PipelineResult<AnimationArtifact> {
        let encode_start = Instant::now();
        let artifact = self.encoder.encode(frames, playback)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        self.store.persist(artifact)
    }

    fn rescale_at(
        &self,
        rescaler: &FrameRescaler,
        source: SourceImage,
        target: TargetSize,
        index: usize,
    ) -> PipelineResult<Frame> {
        rescaler.rescale(source, target).map_err(|e| match e {
            PipelineError::DimensionMismatch {
                expected, actual, ..
            } => PipelineError::DimensionMismatch {
                index,
                expected,
                actual,
            },
            other => other,
        })
    }
}
