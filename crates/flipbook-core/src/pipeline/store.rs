//! Output storage: the single well-known artifact slot every run overwrites.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};

use super::encode::AnimationArtifact;

/// Owns the output directory and writes artifacts into it.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the configured (tilde-expanded) output directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.output_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where an artifact named `file_name` lands.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Create the output directory if needed. Idempotent.
    pub fn ensure_dir(&self) -> PipelineResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PipelineError::Output {
            path: self.dir.clone(),
            message: format!("cannot create output directory: {e}"),
        })
    }

    /// Write the artifact, replacing any previous one at the same identity.
    ///
    /// Bytes go to a sibling temp file first and are renamed into place, so
    /// readers see either the old artifact or the complete new one.
    pub fn persist(&self, artifact: AnimationArtifact) -> PipelineResult<AnimationArtifact> {
        self.ensure_dir()?;

        let target = self.path_for(artifact.file_name());
        let staging = self.dir.join(format!(".{}.partial", artifact.file_name()));

        let output_err = |path: &Path, e: std::io::Error| PipelineError::Output {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        std::fs::write(&staging, artifact.bytes()).map_err(|e| output_err(&staging, e))?;
        if let Err(e) = std::fs::rename(&staging, &target) {
            let _ = std::fs::remove_file(&staging);
            return Err(output_err(&target, e));
        }

        tracing::info!(
            "Wrote {} ({} frames, {} bytes)",
            target.display(),
            artifact.frame_count(),
            artifact.bytes().len()
        );
        Ok(artifact.stored_at(target))
    }

    /// Delete every file under the output directory.
    ///
    /// Per-file failures are logged and skipped. Returns how many files were
    /// removed; a missing directory counts as already clean.
    pub fn clear_previous(&self) -> usize {
        if !self.dir.exists() {
            return 0;
        }
        tracing::debug!("Clearing previous output in {}", self.dir.display());

        let mut removed = 0;
        for entry in WalkDir::new(&self.dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!("Deleted: {}", entry.path().display());
                }
                Err(e) => tracing::warn!("Failed to delete {}: {e}", entry.path().display()),
            }
        }
        removed
    }
}
