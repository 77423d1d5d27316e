use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use tokio::fs;

use notecore::artifact::{self, ExportArtifact};
use notecore::Metrics;

/// Writes export artifacts into the export directory. The empty-buffer
/// guard lives with the caller, which owns the notification surface.
pub struct Exporter {
    directory: Option<PathBuf>,
}

impl Exporter {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    /// Save the buffer as plain text. Returns the filename written.
    pub async fn export_plain_text(&self, text: &str) -> Result<String> {
        let artifact = artifact::build_plain_text(text, &Local::now());
        self.write_artifact(artifact).await
    }

    /// Save the buffer as a paginated PDF. Returns the filename written.
    pub async fn export_pdf(&self, text: &str, metrics: &Metrics) -> Result<String> {
        let artifact = artifact::build_pdf(text, metrics, &Local::now());
        self.write_artifact(artifact).await
    }

    fn target_path(&self, filename: &str) -> PathBuf {
        match self.directory {
            Some(ref dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }

    async fn write_artifact(&self, artifact: ExportArtifact) -> Result<String> {
        let path = self.target_path(&artifact.filename);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create export directory {}", parent.display())
                })?;
            }
        }

        fs::write(&path, &artifact.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        log::info!(
            "Exported {} bytes to {}",
            artifact.bytes.len(),
            path.display()
        );
        Ok(artifact.filename)
    }
}
