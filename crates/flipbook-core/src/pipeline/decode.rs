//! Image decoding with content-based format detection.

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// A decoded source image. Consumed by the rescale step.
pub struct SourceImage {
    /// Where the image was loaded from
    pub path: PathBuf,
    /// The decoded pixels
    pub image: DynamicImage,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color mode of the decoded buffer
    pub color: ColorType,
}

impl SourceImage {
    /// Wrap an in-memory image, e.g. one produced by another stage or a test.
    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let color = image.color();
        Self {
            path: path.into(),
            image,
            width,
            height,
            color,
        }
    }
}

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode an image from disk.
    pub fn decode(&self, path: &Path) -> Result<SourceImage, PipelineError> {
        let bytes = std::fs::read(path)
            .map_err(|e| PipelineError::unreadable(path, format!("cannot read file: {e}")))?;
        self.decode_from_bytes(bytes, path)
    }

    /// Decode an image from an in-memory byte buffer.
    ///
    /// The format is sniffed from the content, falling back to the extension.
    pub fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<SourceImage, PipelineError> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| {
                PipelineError::unreadable(path, format!("cannot detect image format: {e}"))
            })?;
        if reader.format().is_none() {
            let format = ImageFormat::from_path(path).map_err(|_| {
                PipelineError::unreadable(
                    path,
                    format!(
                        "unsupported format: {}",
                        path.extension()
                            .and_then(|e| e.to_str())
                            .unwrap_or("unknown")
                    ),
                )
            })?;
            reader.set_format(format);
        }

        let max_dim = self.limits.max_image_dimension;
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(max_dim);
        limits.max_image_height = Some(max_dim);
        reader.limits(limits);

        // Limits are checked against the header, before pixels are allocated.
        let image = reader.decode().map_err(|e| match e {
            image::ImageError::Limits(_) => {
                PipelineError::unreadable(path, format!("image too large (> {max_dim}px)"))
            }
            other => PipelineError::unreadable(path, other.to_string()),
        })?;

        Ok(SourceImage::from_image(path, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decode_reports_dimensions_and_color() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = decoder
            .decode_from_bytes(png_bytes(40, 30), Path::new("a.png"))
            .unwrap();
        assert_eq!((source.width, source.height), (40, 30));
        assert_eq!(source.color, ColorType::Rgb8);
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name still decode
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = decoder
            .decode_from_bytes(png_bytes(8, 8), Path::new("misnamed.jpg"))
            .unwrap();
        assert_eq!(source.width, 8);
    }

    #[test]
    fn test_decode_garbage_is_unreadable() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode_from_bytes(b"not an image at all".to_vec(), Path::new("x.png"))
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::UnreadableImage { .. }));
    }

    #[test]
    fn test_decode_rejects_oversized_image() {
        let limits = LimitsConfig {
            max_image_dimension: 16,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder
            .decode_from_bytes(png_bytes(32, 8), Path::new("big.png"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("too large"));
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in bytes {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        let mut body = kind.to_vec();
        body.extend_from_slice(data);
        out.extend_from_slice(&body);
        out.extend_from_slice(&crc32(&body).to_be_bytes());
        out
    }

    #[test]
    fn test_oversized_header_rejected_before_pixels() {
        // Header claims 60000x60000 RGB; the pixel data is a stub
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&60_000u32.to_be_bytes());
        ihdr.extend_from_slice(&60_000u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);

        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend(chunk(b"IHDR", &ihdr));
        bytes.extend(chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]));
        bytes.extend(chunk(b"IEND", &[]));

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode_from_bytes(bytes, Path::new("bomb.png"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("too large"), "{err}");
    }
}
