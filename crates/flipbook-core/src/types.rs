//! Core data types shared by the rescale, encode, and coordination stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// Default scale, as an integer percentage.
pub const DEFAULT_SCALE_PERCENT: u32 = 100;

/// Default playback rate in frames per second.
pub const DEFAULT_FPS: u32 = 2;

/// The (width, height) every frame of a batch is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether a `width` x `height` box fits inside this size.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A positive rational scale factor, `numerator / denominator`.
///
/// Kept rational so `floor(native * factor)` is computed exactly in integers.
#[derive(Debug, Clone, Copy)]
pub struct ScaleFactor {
    numerator: u32,
    denominator: u32,
}

impl ScaleFactor {
    /// Identity scale (100%).
    pub const ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    /// Create a factor from an integer percentage (`100` == 1.0x).
    pub fn from_percent(percent: u32) -> PipelineResult<Self> {
        Self::new(percent, 100)
    }

    /// Create a factor from a ratio. Zero numerator or denominator is rejected.
    pub fn new(numerator: u32, denominator: u32) -> PipelineResult<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(PipelineError::InvalidScale {
                message: format!("scale factor {numerator}/{denominator} must be positive"),
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Parse an integer percentage string as submitted by a form field.
    ///
    /// Absent or blank input means 100%.
    pub fn parse_percent(input: Option<&str>) -> PipelineResult<Self> {
        let raw = match input.map(str::trim) {
            None | Some("") => return Self::from_percent(DEFAULT_SCALE_PERCENT),
            Some(raw) => raw,
        };
        let percent: u32 = raw.parse().map_err(|_| PipelineError::InvalidScale {
            message: format!("{raw:?} is not a whole-number percentage"),
        })?;
        Self::from_percent(percent)
    }

    /// `floor(value * factor)`, computed without rounding error.
    pub fn apply(&self, value: u32) -> u64 {
        u64::from(value) * u64::from(self.numerator) / u64::from(self.denominator)
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl PartialEq for ScaleFactor {
    fn eq(&self, other: &Self) -> bool {
        u64::from(self.numerator) * u64::from(other.denominator)
            == u64::from(other.numerator) * u64::from(self.denominator)
    }
}

impl Eq for ScaleFactor {}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_f64() * 100.0)
    }
}

/// How a frame is fitted to the batch's target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Stretch or compress to exactly the target size, ignoring aspect ratio.
    #[default]
    Exact,
    /// Shrink to fit inside the target box, keeping the source aspect ratio.
    /// Never enlarges.
    Thumbnail,
}

impl ResizePolicy {
    /// Parse a policy name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" | "resize" => Some(Self::Exact),
            "thumbnail" | "fit" => Some(Self::Thumbnail),
            _ => None,
        }
    }
}

impl fmt::Display for ResizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizePolicy::Exact => write!(f, "exact"),
            ResizePolicy::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// Scale factor plus the resampling strategy applied batch-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScalePolicy {
    pub factor: ScaleFactor,
    pub resize: ResizePolicy,
}

impl ScalePolicy {
    pub fn new(factor: ScaleFactor, resize: ResizePolicy) -> Self {
        Self { factor, resize }
    }
}

/// Playback rate and looping behavior of the output animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Frames per second, always > 0
    fps: u32,
    /// Number of loops; 0 plays forever
    pub loop_count: u16,
}

impl PlaybackConfig {
    /// Infinite-loop playback at `fps`.
    pub fn new(fps: u32) -> PipelineResult<Self> {
        if fps == 0 {
            return Err(PipelineError::InvalidFrameRate {
                value: fps.to_string(),
            });
        }
        Ok(Self { fps, loop_count: 0 })
    }

    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Parse a frame rate string. Absent or blank input means 2 fps.
    pub fn parse_fps(input: Option<&str>) -> PipelineResult<Self> {
        let raw = match input.map(str::trim) {
            None | Some("") => return Self::new(DEFAULT_FPS),
            Some(raw) => raw,
        };
        let fps: u32 = raw.parse().map_err(|_| PipelineError::InvalidFrameRate {
            value: raw.to_string(),
        })?;
        Self::new(fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn loops_forever(&self) -> bool {
        self.loop_count == 0
    }

    /// Per-frame delay in GIF centiseconds: `round(100 / fps)`, at least 1.
    pub fn delay_centis(&self) -> u16 {
        let centis = (100 + self.fps / 2) / self.fps;
        u16::try_from(centis.max(1)).unwrap_or(u16::MAX)
    }

    /// Per-frame display duration as actually encoded.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_centis()) * 10)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            loop_count: 0,
        }
    }
}

/// Serializable description of a written animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    /// Where the artifact was written
    pub path: PathBuf,

    /// Number of frames, equal to the number of sources
    pub frame_count: usize,

    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Per-frame display time in milliseconds
    pub frame_delay_ms: u64,

    /// 0 means infinite
    pub loop_count: u16,

    /// Encoded size in bytes
    pub file_size: u64,

    /// BLAKE3 hash of the encoded bytes
    pub content_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_floors_exactly() {
        let half = ScaleFactor::from_percent(50).unwrap();
        assert_eq!(half.apply(200), 100);
        assert_eq!(half.apply(101), 50);

        let third = ScaleFactor::from_percent(33).unwrap();
        assert_eq!(third.apply(300), 99);
        assert_eq!(third.apply(100), 33);
    }

    #[test]
    fn test_parse_percent_defaults_to_100() {
        assert_eq!(ScaleFactor::parse_percent(None).unwrap(), ScaleFactor::ONE);
        assert_eq!(ScaleFactor::parse_percent(Some("  ")).unwrap().apply(640), 640);
    }

    #[test]
    fn test_parse_percent_rejects_zero_and_garbage() {
        for bad in ["0", "-50", "abc", "12.5"] {
            let err = ScaleFactor::parse_percent(Some(bad)).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidScale { .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_equal_ratios_compare_equal() {
        assert_eq!(ScaleFactor::from_percent(50).unwrap(), ScaleFactor::new(1, 2).unwrap());
        assert_ne!(ScaleFactor::from_percent(50).unwrap(), ScaleFactor::ONE);
    }

    #[test]
    fn test_parse_fps() {
        assert_eq!(PlaybackConfig::parse_fps(None).unwrap().fps(), 2);
        assert_eq!(PlaybackConfig::parse_fps(Some("")).unwrap().fps(), 2);
        assert_eq!(PlaybackConfig::parse_fps(Some(" 10 ")).unwrap().fps(), 10);
        assert!(matches!(
            PlaybackConfig::parse_fps(Some("0")),
            Err(PipelineError::InvalidFrameRate { .. })
        ));
        assert!(matches!(
            PlaybackConfig::parse_fps(Some("-3")),
            Err(PipelineError::InvalidFrameRate { .. })
        ));
    }

    #[test]
    fn test_delay_centis() {
        assert_eq!(PlaybackConfig::new(2).unwrap().delay_centis(), 50);
        assert_eq!(PlaybackConfig::new(10).unwrap().delay_centis(), 10);
        assert_eq!(PlaybackConfig::new(3).unwrap().delay_centis(), 33);
        assert_eq!(PlaybackConfig::new(1).unwrap().delay_centis(), 100);
        // Faster than the format can express clamps to one centisecond
        assert_eq!(PlaybackConfig::new(500).unwrap().delay_centis(), 1);
    }

    #[test]
    fn test_frame_delay_ms() {
        let playback = PlaybackConfig::new(2).unwrap();
        assert_eq!(playback.frame_delay(), Duration::from_millis(500));
        assert!(playback.loops_forever());
    }

    #[test]
    fn test_resize_policy_parse() {
        assert_eq!(ResizePolicy::parse("EXACT"), Some(ResizePolicy::Exact));
        assert_eq!(ResizePolicy::parse("thumbnail"), Some(ResizePolicy::Thumbnail));
        assert_eq!(ResizePolicy::parse("crop"), None);
        assert_eq!(ResizePolicy::default(), ResizePolicy::Exact);
    }

    #[test]
    fn test_target_size_display_and_contains() {
        let size = TargetSize::new(100, 50);
        assert_eq!(size.to_string(), "100x50");
        assert!(size.contains(100, 50));
        assert!(size.contains(50, 50));
        assert!(!size.contains(101, 10));
    }
}
