//! Cheap source checks that run before a full decode.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates source files before they are decoded.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File has valid image magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::unreadable(path, "file not found"));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| PipelineError::unreadable(path, format!("cannot read metadata: {e}")))?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::unreadable(
                path,
                format!(
                    "file too large ({}MB > {}MB)",
                    metadata.len() / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            ));
        }

        self.check_magic_bytes(path)
    }

    /// Check file magic bytes to verify it's a decodable image format.
    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path)
            .map_err(|e| PipelineError::unreadable(path, format!("cannot open file: {e}")))?;

        let (header, bytes_read) = Self::read_header(&mut file, path)?;

        if bytes_read < 4 {
            return Err(PipelineError::unreadable(
                path,
                "file too small to be a valid image",
            ));
        }

        if !Self::is_valid_image_header(&header, bytes_read) {
            return Err(PipelineError::unreadable(
                path,
                "unrecognized image format (invalid magic bytes)",
            ));
        }

        Ok(())
    }

    fn read_header(reader: &mut impl Read, path: &Path) -> Result<([u8; 12], usize), PipelineError> {
        let mut header = [0u8; 12];
        let bytes_read = reader
            .read(&mut header)
            .map_err(|e| PipelineError::unreadable(path, format!("cannot read header: {e}")))?;
        Ok((header, bytes_read))
    }

    /// Check if the header bytes match a known image format.
    fn is_valid_image_header(header: &[u8; 12], bytes_read: usize) -> bool {
        if bytes_read < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return true;
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return true;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") {
            return bytes_read < 12 || &header[8..12] == b"WEBP";
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return true;
        }

        // TIFF: II*\0 or MM\0*
        header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    }
}
