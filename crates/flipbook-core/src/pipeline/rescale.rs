//! Frame rescaling: derives the batch target size and fits each source to it.

use image::imageops::FilterType;
use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ResizePolicy, ScalePolicy, TargetSize};

use super::decode::SourceImage;

/// Filter for the exact policy (bicubic).
const EXACT_FILTER: FilterType = FilterType::CatmullRom;

/// Filter for the thumbnail policy.
const THUMBNAIL_FILTER: FilterType = FilterType::Lanczos3;

/// One rescaled image, ready for encoding.
///
/// The canvas is always the batch's [`TargetSize`]. Content is placed at
/// (`left`, `top`) and is never larger than the canvas.
#[derive(Debug, Clone)]
pub struct Frame {
    source: PathBuf,
    canvas: TargetSize,
    left: u32,
    top: u32,
    pixels: RgbImage,
}

impl Frame {
    /// Build a frame whose content fills the whole canvas.
    pub fn full(source: impl Into<PathBuf>, pixels: RgbImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            source: source.into(),
            canvas: TargetSize::new(width, height),
            left: 0,
            top: 0,
            pixels,
        }
    }

    /// Build a frame with content centred on a larger canvas.
    ///
    /// Content that does not fit is a [`PipelineError::DimensionMismatch`].
    pub fn centered(
        source: impl Into<PathBuf>,
        pixels: RgbImage,
        canvas: TargetSize,
    ) -> PipelineResult<Self> {
        let (width, height) = pixels.dimensions();
        if !canvas.contains(width, height) {
            return Err(PipelineError::DimensionMismatch {
                index: 0,
                expected: canvas,
                actual: TargetSize::new(width, height),
            });
        }
        Ok(Self {
            source: source.into(),
            canvas,
            left: (canvas.width - width) / 2,
            top: (canvas.height - height) / 2,
            pixels,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The frame's logical size; identical across a batch.
    pub fn canvas(&self) -> TargetSize {
        self.canvas
    }

    /// Size of the placed content, bounded by the canvas.
    pub fn content_size(&self) -> TargetSize {
        let (width, height) = self.pixels.dimensions();
        TargetSize::new(width, height)
    }

    pub fn offset(&self) -> (u32, u32) {
        (self.left, self.top)
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Write the resized content to disk.
    ///
    /// This is the only way a frame reaches the filesystem; rescaling never
    /// touches the source file.
    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        self.pixels.save(path).map_err(|e| PipelineError::Output {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Fits source images to a batch-wide target size.
pub struct FrameRescaler {
    policy: ResizePolicy,
}

impl FrameRescaler {
    pub fn new(policy: ResizePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResizePolicy {
        self.policy
    }

    /// `floor(native * factor)` per axis, from the first image of a batch.
    pub fn compute_target_size(
        first: &SourceImage,
        scale: &ScalePolicy,
    ) -> PipelineResult<TargetSize> {
        let width = scale.factor.apply(first.width);
        let height = scale.factor.apply(first.height);

        if width < 1 || height < 1 {
            return Err(PipelineError::InvalidScale {
                message: format!(
                    "{} of {}x{} floors to {}x{}",
                    scale.factor, first.width, first.height, width, height
                ),
            });
        }

        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(width), Ok(height)) => Ok(TargetSize::new(width, height)),
            _ => Err(PipelineError::InvalidScale {
                message: format!("{} of {}x{} overflows", scale.factor, first.width, first.height),
            }),
        }
    }

    /// Resize `image` to `target` under the configured policy.
    ///
    /// The source is consumed; alpha is discarded.
    pub fn rescale(&self, image: SourceImage, target: TargetSize) -> PipelineResult<Frame> {
        let SourceImage {
            path,
            image,
            width,
            height,
            ..
        } = image;

        match self.policy {
            ResizePolicy::Exact => {
                let resized = if (width, height) == (target.width, target.height) {
                    image
                } else {
                    image.resize_exact(target.width, target.height, EXACT_FILTER)
                };
                Ok(Frame::full(path, resized.to_rgb8()))
            }
            ResizePolicy::Thumbnail => {
                let fitted = if target.contains(width, height) {
                    image
                } else {
                    image.resize(target.width, target.height, THUMBNAIL_FILTER)
                };
                Frame::centered(path, fitted.to_rgb8(), target)
            }
        }
    }
}
