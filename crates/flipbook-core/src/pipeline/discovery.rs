//! Expands command-line inputs into an ordered list of source files.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};

/// Resolves files and directories into source paths.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Expand inputs in the order given.
    ///
    /// Files are kept as-is (an unsupported extension still goes through, so
    /// it fails loudly at decode instead of silently dropping a frame).
    /// Directories expand to their supported files, sorted by path.
    pub fn expand(&self, inputs: &[PathBuf]) -> PipelineResult<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for input in inputs {
            if input.is_dir() {
                sources.extend(self.discover_dir(input)?);
            } else {
                sources.push(input.clone());
            }
        }
        Ok(sources)
    }

    /// Recursively find supported image files under `dir`, sorted by path.
    ///
    /// Any entry the walk cannot read (a dangling symlink, a directory
    /// without permission) fails the whole expansion.
    pub fn discover_dir(&self, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                PipelineError::unreadable(path, format!("cannot read directory entry: {e}"))
            })?;
            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
