//! Crawler module for page rendering, extraction and traversal
//!
//! This module contains the crawl-and-extract pipeline, including:
//! - Page rendering (headless browser or plain HTTP)
//! - Title, article text, link and image extraction
//! - Image OCR
//! - Level-by-level crawl coordination with a hard page limit
//! - Background crawl tasks with progress events and cancellation

mod coordinator;
mod events;
mod extractor;
mod ocr;
mod renderer;
mod task;

pub use coordinator::{CrawlOutcome, CrawlRequest, Crawler, StopReason};
pub use events::{CrawlEvent, EventSink};
pub use extractor::{extract, extract_links_only, ExtractedPage, UNTITLED};
pub use ocr::{ImageError, ImageTextCollector, Ocr, OcrError, TesseractOcr};
pub use renderer::{build_renderer, HttpRenderer, RenderError, Renderer, WebDriverRenderer};
pub use task::{CancelFlag, CrawlHandle, CrawlTask};

use crate::config::Config;
use crate::ScribeError;

/// Runs a complete crawl with a configuration-built crawler
///
/// This is the simplest entry point: no progress events, no cancellation.
/// Use `CrawlTask::spawn` to observe or stop a crawl.
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `request` - What to crawl
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ended (possibly early at the page limit)
/// * `Err(ScribeError)` - The request was invalid or a file could not be written
pub async fn crawl(config: &Config, request: &CrawlRequest) -> Result<CrawlOutcome, ScribeError> {
    let crawler = Crawler::from_config(config)?;
    crawler
        .run(request, &EventSink::disabled(), &CancelFlag::new())
        .await
}
