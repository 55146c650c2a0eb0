//! Read-only view over the directory of saved page files

use crate::analysis::Lexicon;
use crate::{Result, ScribeError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One saved file in the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub name: String,
    pub path: PathBuf,

    /// Sentiment weight of the file, or `None` if it could not be read as UTF-8
    pub sentiment: Option<i64>,
}

/// The output directory seen as a collection of saved pages
///
/// The directory is read fresh on every call, so files written by a running
/// crawl show up as soon as they exist.
#[derive(Debug, Clone)]
pub struct Corpus {
    directory: PathBuf,
    lexicon: Lexicon,
}

impl Corpus {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            lexicon: Lexicon::default(),
        }
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Lists the files in the corpus, sorted by name
    ///
    /// A missing directory is an empty corpus.
    pub async fn entries(&self) -> Result<Vec<CorpusEntry>> {
        let mut entries = Vec::new();
        for (name, path) in self.files().await? {
            let sentiment = match tokio::fs::read_to_string(&path).await {
                Ok(text) => Some(self.lexicon.weight(&text)),
                Err(e) => {
                    debug!("Could not read {}: {}", path.display(), e);
                    None
                }
            };
            entries.push(CorpusEntry {
                name,
                path,
                sentiment,
            });
        }
        Ok(entries)
    }

    /// Names of files whose content contains `keyword`, ignoring case
    ///
    /// Unreadable files are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::EmptyInput` if the keyword is blank
    pub async fn search(&self, keyword: &str) -> Result<Vec<String>> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ScribeError::EmptyInput("search keyword".to_string()));
        }

        let mut matches = Vec::new();
        for (name, path) in self.files().await? {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) if text.to_lowercase().contains(&needle) => matches.push(name),
                Ok(_) => {}
                Err(e) => debug!("Skipping {} in search: {}", path.display(), e),
            }
        }
        Ok(matches)
    }

    async fn files(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut dir = match tokio::fs::read_dir(&self.directory).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push((name, entry.path()));
        }
        files.sort();
        Ok(files)
    }
}
