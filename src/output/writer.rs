//! Persistence writer for scraped page text

use crate::Result;
use std::path::{Path, PathBuf};

/// Writes page text files into one output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
}

impl OutputWriter {
    /// Creates a writer for the given directory; nothing is created yet
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory files are written into
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the output directory if it does not exist yet
    pub async fn ensure_directory(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    /// Writes `text` as UTF-8 to `filename` inside the output directory
    ///
    /// An existing file with the same name is overwritten. Returns the path
    /// that was written.
    pub async fn write(&self, text: &str, filename: &str) -> Result<PathBuf> {
        self.ensure_directory().await?;
        let path = self.directory.join(filename);
        tokio::fs::write(&path, text.as_bytes()).await?;
        tracing::debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(path)
    }
}
