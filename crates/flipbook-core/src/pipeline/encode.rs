//! GIF encoding of an ordered, uniformly sized frame sequence.

use gif::{DisposalMethod, Repeat};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ArtifactSummary, PlaybackConfig, TargetSize};

use super::rescale::Frame;

/// Largest canvas edge a GIF logical screen can describe.
pub const MAX_GIF_DIMENSION: u32 = u16::MAX as u32;

/// NeuQuant sampling speed (1 = best, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Frames in playback order.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append a frame; it plays after every frame already pushed.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Canvas of the first frame, if any.
    pub fn canvas(&self) -> Option<TargetSize> {
        self.frames.first().map(Frame::canvas)
    }

    /// Save every frame as `frame_0001.png`, `frame_0002.png`, ... in `dir`.
    pub fn save_to_dir(&self, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::Output {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut written = Vec::with_capacity(self.frames.len());
        for (index, frame) in self.frames.iter().enumerate() {
            let path = dir.join(format!("frame_{:04}.png", index + 1));
            frame.save(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

impl FromIterator<Frame> for FrameSequence {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FrameSequence {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// An encoded animation and the well-known file name it is stored under.
#[derive(Debug, Clone)]
pub struct AnimationArtifact {
    file_name: String,
    path: Option<PathBuf>,
    bytes: Vec<u8>,
    frame_count: usize,
    canvas: TargetSize,
    playback: PlaybackConfig,
}

impl AnimationArtifact {
    /// Logical output identity, reused by every run.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Where the artifact was persisted, once stored.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn stored_at(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn canvas(&self) -> TargetSize {
        self.canvas
    }

    pub fn frame_delay(&self) -> Duration {
        self.playback.frame_delay()
    }

    pub fn loop_count(&self) -> u16 {
        self.playback.loop_count
    }

    /// BLAKE3 hash of the encoded bytes.
    pub fn content_hash(&self) -> String {
        blake3::hash(&self.bytes).to_hex().to_string()
    }

    /// Describe this artifact; unstored artifacts report their file name.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            path: self
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.file_name)),
            frame_count: self.frame_count,
            width: self.canvas.width,
            height: self.canvas.height,
            frame_delay_ms: self.frame_delay().as_millis() as u64,
            loop_count: self.loop_count(),
            file_size: self.bytes.len() as u64,
            content_hash: self.content_hash(),
        }
    }
}

/// Encodes frame sequences as looping GIFs.
pub struct AnimationEncoder {
    file_name: String,
    max_frames: usize,
}

impl AnimationEncoder {
    /// `file_name` is the identity stamped on every artifact.
    pub fn new(file_name: impl Into<String>, max_frames: usize) -> Self {
        Self {
            file_name: file_name.into(),
            max_frames,
        }
    }

    /// Encode `frames` in order with a uniform per-frame delay.
    ///
    /// Every frame must share the first frame's canvas. Nothing is reordered,
    /// merged, or dropped.
    pub fn encode(
        &self,
        frames: FrameSequence,
        playback: &PlaybackConfig,
    ) -> PipelineResult<AnimationArtifact> {
        let canvas = frames.canvas().ok_or(PipelineError::EmptyBatch)?;

        for (index, frame) in frames.iter().enumerate() {
            if frame.canvas() != canvas {
                return Err(PipelineError::DimensionMismatch {
                    index,
                    expected: canvas,
                    actual: frame.canvas(),
                });
            }
        }

        if frames.len() > self.max_frames {
            return Err(PipelineError::encoding(format!(
                "{} frames exceeds the limit of {}",
                frames.len(),
                self.max_frames
            )));
        }
        if canvas.width > MAX_GIF_DIMENSION || canvas.height > MAX_GIF_DIMENSION {
            return Err(PipelineError::encoding(format!(
                "canvas {canvas} exceeds the GIF limit of {MAX_GIF_DIMENSION}px"
            )));
        }

        let delay = playback.delay_centis();
        let frame_count = frames.len();
        let mut bytes = Vec::new();

        let mut encoder = gif::Encoder::new(
            &mut bytes,
            canvas.width as u16,
            canvas.height as u16,
            &[],
        )
        .map_err(|e| PipelineError::encoding(e.to_string()))?;

        let repeat = if playback.loops_forever() {
            Repeat::Infinite
        } else {
            Repeat::Finite(playback.loop_count)
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| PipelineError::encoding(e.to_string()))?;

        for (index, frame) in frames.into_iter().enumerate() {
            let content = frame.content_size();
            let (left, top) = frame.offset();

            let mut gif_frame = gif::Frame::from_rgb_speed(
                content.width as u16,
                content.height as u16,
                frame.pixels().as_raw(),
                QUANTIZER_SPEED,
            );
            gif_frame.delay = delay;
            gif_frame.left = left as u16;
            gif_frame.top = top as u16;
            gif_frame.dispose = DisposalMethod::Background;

            encoder.write_frame(&gif_frame).map_err(|e| {
                PipelineError::encoding(format!("frame {index} ({:?}): {e}", frame.source()))
            })?;
            tracing::trace!("  Encoded frame {}/{}", index + 1, frame_count);
        }

        // Dropping the encoder writes the GIF trailer.
        drop(encoder);

        tracing::debug!(
            "Encoded {} frames at {} ({}cs delay, {} bytes)",
            frame_count,
            canvas,
            delay,
            bytes.len()
        );

        Ok(AnimationArtifact {
            file_name: self.file_name.clone(),
            path: None,
            bytes,
            frame_count,
            canvas,
            playback: *playback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> Frame {
        Frame::full("solid.png", RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn encoder() -> AnimationEncoder {
        AnimationEncoder::new("output.gif", 100)
    }

    /// Decode and return (screen size, per-frame delays).
    fn inspect(bytes: &[u8]) -> ((u16, u16), Vec<u16>) {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(bytes).unwrap();
        let screen = (decoder.width(), decoder.height());
        let mut delays = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            delays.push(frame.delay);
        }
        (screen, delays)
    }

    #[test]
    fn test_encode_writes_every_frame_with_uniform_delay() {
        let frames: FrameSequence = (0..3).map(|_| solid(100, 100, [0, 0, 255])).collect();
        let playback = PlaybackConfig::new(2).unwrap();

        let artifact = encoder().encode(frames, &playback).unwrap();
        assert_eq!(&artifact.bytes()[..6], b"GIF89a");
        assert_eq!(artifact.frame_count(), 3);
        assert_eq!(artifact.frame_delay(), Duration::from_millis(500));

        let (screen, delays) = inspect(artifact.bytes());
        assert_eq!(screen, (100, 100));
        assert_eq!(delays, vec![50, 50, 50]);
    }

    #[test]
    fn test_encode_rejects_dimension_mismatch() {
        let mut frames = FrameSequence::new();
        frames.push(solid(10, 10, [0, 0, 0]));
        frames.push(solid(10, 10, [0, 0, 0]));
        frames.push(solid(12, 10, [0, 0, 0]));

        let err = encoder()
            .encode(frames, &PlaybackConfig::default())
            .unwrap_err();
        match err {
            PipelineError::DimensionMismatch {
                index,
                expected,
                actual,
            } => {
                assert_eq!(index, 2);
                assert_eq!(expected, TargetSize::new(10, 10));
                assert_eq!(actual, TargetSize::new(12, 10));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_encode_empty_sequence() {
        let err = encoder()
            .encode(FrameSequence::new(), &PlaybackConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyBatch));
    }

    #[test]
    fn test_encode_respects_frame_limit() {
        let frames: FrameSequence = (0..3).map(|_| solid(4, 4, [1, 2, 3])).collect();
        let err = AnimationEncoder::new("output.gif", 2)
            .encode(frames, &PlaybackConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Encoding { .. }));
    }

    #[test]
    fn test_encode_keeps_frame_order() {
        let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];
        let frames: FrameSequence = colors.iter().map(|c| solid(8, 8, *c)).collect();
        let artifact = encoder()
            .encode(frames, &PlaybackConfig::default())
            .unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(artifact.bytes()).unwrap();
        let mut dominant = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            // Quantization may nudge values, so compare the strongest channel
            let px = &frame.buffer[..3];
            let max = (0..3).max_by_key(|&c| px[c]).unwrap();
            dominant.push(max);
        }
        assert_eq!(dominant, vec![0, 1, 2]);
    }

    #[test]
    fn test_encode_places_thumbnail_content_at_offset() {
        let content = RgbImage::from_pixel(10, 5, Rgb([9, 9, 9]));
        let frame = Frame::centered("thumb.png", content, TargetSize::new(10, 10)).unwrap();
        let frames: FrameSequence = std::iter::once(frame).collect();
        let artifact = encoder()
            .encode(frames, &PlaybackConfig::default())
            .unwrap();

        let mut decoder = gif::DecodeOptions::new().read_info(artifact.bytes()).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (10, 10));
        let frame = decoder.read_next_frame().unwrap().unwrap();
        assert_eq!((frame.left, frame.top), (0, 2));
        assert_eq!((frame.width, frame.height), (10, 5));
    }

    #[test]
    fn test_save_to_dir_numbers_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames: FrameSequence = (0..2).map(|_| solid(3, 3, [1, 1, 1])).collect();
        let written = frames.save_to_dir(&dir.path().join("frames")).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("frame_0001.png"));
        assert!(written[1].exists());
    }

    #[test]
    fn test_summary_reports_artifact() {
        let frames: FrameSequence = (0..2).map(|_| solid(6, 4, [5, 5, 5])).collect();
        let playback = PlaybackConfig::new(10).unwrap().with_loop_count(3);
        let artifact = encoder().encode(frames, &playback).unwrap();

        let summary = artifact.summary();
        assert_eq!(summary.path, PathBuf::from("output.gif"));
        assert_eq!(summary.frame_count, 2);
        assert_eq!((summary.width, summary.height), (6, 4));
        assert_eq!(summary.frame_delay_ms, 100);
        assert_eq!(summary.loop_count, 3);
        assert_eq!(summary.file_size, artifact.bytes().len() as u64);
        assert_eq!(summary.content_hash.len(), 64);
    }
}
