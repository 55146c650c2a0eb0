//! Analysis of saved page text
//!
//! This module contains the corpus analytics, including:
//! - Lexicon-based sentiment scoring
//! - Keyword frequency
//! - LLM-backed summaries
//! - Whole-file analysis combining the three

mod keywords;
mod sentiment;
mod summary;

pub use keywords::keyword_density;
pub use sentiment::{sentiment_details, sentiment_weight, Lexicon, Mood, SentimentReport};
pub use summary::{SummaryClient, SummaryError, MIN_SUMMARY_CHARS, TOO_SHORT_MESSAGE};

use crate::config::Config;
use crate::{Result, ScribeError};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Number of keywords included in a file analysis
pub const REPORT_KEYWORDS: usize = 5;

/// Result of analyzing one saved text file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub file_name: String,
    pub sentiment: SentimentReport,
    pub summary: String,
    pub keywords: Vec<String>,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Sentiment: {}", self.sentiment)?;
        writeln!(f, "Keywords: {}", self.keywords.join(", "))?;
        writeln!(f)?;
        writeln!(f, "Summary:")?;
        write!(f, "{}", self.summary)
    }
}

/// Runs sentiment, keyword and summary analysis over saved files
pub struct Analyzer {
    lexicon: Lexicon,
    summaries: SummaryClient,
}

impl Analyzer {
    pub fn new(lexicon: Lexicon, summaries: SummaryClient) -> Self {
        Self { lexicon, summaries }
    }

    /// Builds an analyzer from the `[sentiment]` and `[summary]` sections
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Lexicon::from_config(&config.sentiment),
            SummaryClient::new(config.summary.clone())?,
        ))
    }

    /// Analyzes the text already loaded from `file_name`
    pub async fn analyze_text(&self, file_name: &str, text: &str) -> AnalysisReport {
        AnalysisReport {
            file_name: file_name.to_string(),
            sentiment: self.lexicon.details(text),
            summary: self.summaries.summarize(text).await,
            keywords: keyword_density(text, REPORT_KEYWORDS),
        }
    }

    /// Reads and analyzes a saved text file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    ///
    /// # Returns
    ///
    /// * `Ok(AnalysisReport)` - Sentiment, summary and top keywords
    /// * `Err(ScribeError::NotFound)` - The path is not an existing file
    /// * `Err(ScribeError::EmptyInput)` - The file holds only whitespace
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisReport> {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ScribeError::NotFound(path.display().to_string()));
        }

        let text = tokio::fs::read_to_string(path).await?;
        if text.trim().is_empty() {
            return Err(ScribeError::EmptyInput(format!(
                "{} is empty",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!("Analyzing {} ({} chars)", file_name, text.len());
        Ok(self.analyze_text(&file_name, &text).await)
    }
}
