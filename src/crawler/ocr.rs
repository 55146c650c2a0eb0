//! Image text recognition
//!
//! Images referenced by a page are downloaded one at a time and passed to an
//! OCR engine. A failure for one image is reported as a warning and the next
//! image is tried; it never fails the page.

use crate::config::OcrConfig;
use crate::crawler::events::EventSink;
use crate::output::ImageText;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Errors from an OCR engine
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors for a single image, fetch through recognition
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{0}")]
    Ocr(#[from] OcrError),
}

/// Recognizes text in image bytes
#[async_trait]
pub trait Ocr: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// OCR backed by the `tesseract` command line tool
///
/// Image bytes go in on stdin and recognized text comes back on stdout.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Ocr for TesseractOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OcrError::Launch {
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Downloads page images and collects their OCR text
pub struct ImageTextCollector {
    client: reqwest::Client,
    ocr: Arc<dyn Ocr>,
}

impl ImageTextCollector {
    pub fn new(ocr: Arc<dyn Ocr>, client: reqwest::Client) -> Self {
        Self { client, ocr }
    }

    /// Builds a tesseract-backed collector from configuration
    pub fn from_config(config: &OcrConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.image_timeout_secs))
            .build()?;

        Ok(Self::new(
            Arc::new(TesseractOcr::new(config.tesseract_command.clone())),
            client,
        ))
    }

    /// OCRs every image in order, keeping the non-empty results
    pub async fn collect(&self, sources: &[String], events: &EventSink) -> Vec<ImageText> {
        let mut texts = Vec::new();

        for source in sources {
            match self.image_text(source).await {
                Ok(text) if !text.is_empty() => texts.push(ImageText {
                    source: source.clone(),
                    text,
                }),
                Ok(_) => tracing::debug!("No text found in image {}", source),
                Err(e) => {
                    tracing::warn!("OCR failed for {}: {}", source, e);
                    events.warn(format!("OCR failed for {}: {}", source, e));
                }
            }
        }

        texts
    }

    async fn image_text(&self, source: &str) -> Result<String, ImageError> {
        let response = self.client.get(source).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let text = self.ocr.recognize(&bytes).await?;
        Ok(text.trim().to_string())
    }
}
