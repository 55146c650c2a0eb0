//! Crawl coordinator - level-by-level crawl orchestration
//!
//! This module contains the crawl loop, which:
//! - Walks the frontier one level at a time, up to the requested depth
//! - Skips URLs already visited in this run
//! - Renders, extracts and saves each page
//! - Collects discovered links into the next level's frontier
//! - Stops at the page limit, on cancellation, or when nothing is left

use crate::config::{Config, MAX_PAGE_LIMIT};
use crate::crawler::events::{CrawlEvent, EventSink};
use crate::crawler::extractor::{extract, extract_links_only, ExtractedPage};
use crate::crawler::ocr::ImageTextCollector;
use crate::crawler::renderer::{build_renderer, Renderer};
use crate::crawler::task::CancelFlag;
use crate::output::{OutputWriter, PageRecord};
use crate::{Result, ScribeError};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// What to crawl and how
///
/// Immutable for the duration of one crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub start_url: String,

    /// Number of levels to crawl; the start page is level 1
    pub max_depth: u32,

    /// Accepted for callers that collect them; extraction does not filter on them
    pub keywords: Vec<String>,

    /// Run OCR over page images
    pub ocr: bool,
}

impl CrawlRequest {
    /// A depth-1 crawl of `start_url` without OCR
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_depth: 1,
            keywords: Vec::new(),
            ocr: false,
        }
    }

    pub fn with_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_ocr(mut self, ocr: bool) -> Self {
        self.ocr = ocr;
        self
    }

    /// Checks the request before any network work happens
    ///
    /// Returns the parsed start URL, normalized the same way discovered
    /// links are.
    pub fn validate(&self) -> Result<Url> {
        if self.max_depth < 1 {
            return Err(ScribeError::InvalidRequest(
                "max depth must be at least 1".to_string(),
            ));
        }

        Url::parse(&self.start_url).map_err(|e| {
            ScribeError::InvalidRequest(format!("invalid start URL '{}': {}", self.start_url, e))
        })
    }
}

/// Why a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A level produced no links to follow
    FrontierExhausted,

    /// All requested levels were crawled
    DepthReached,

    /// The page limit was hit
    PageLimit,

    /// Cancellation was requested
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FrontierExhausted => "no more links",
            Self::DepthReached => "depth reached",
            Self::PageLimit => "page limit reached",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Files successfully written
    pub files_written: usize,

    /// Distinct URLs taken from the frontier, whether or not they rendered
    pub pages_visited: usize,

    /// Levels walked to the end
    pub levels_completed: u32,

    pub stop_reason: StopReason,
}

fn outcome(
    files_written: usize,
    visited: &HashSet<String>,
    levels_completed: u32,
    stop_reason: StopReason,
) -> CrawlOutcome {
    CrawlOutcome {
        files_written,
        pages_visited: visited.len(),
        levels_completed,
        stop_reason,
    }
}

/// Main crawler structure
pub struct Crawler {
    renderer: Arc<dyn Renderer>,
    writer: OutputWriter,
    images: Option<ImageTextCollector>,
    page_limit: usize,
    separate_link_fetch: bool,
}

impl Crawler {
    /// Creates a crawler with the default 50-page limit and no OCR support
    pub fn new(renderer: Arc<dyn Renderer>, writer: OutputWriter) -> Self {
        Self {
            renderer,
            writer,
            images: None,
            page_limit: MAX_PAGE_LIMIT,
            separate_link_fetch: false,
        }
    }

    /// Builds a crawler from configuration, with tesseract OCR available
    pub fn from_config(config: &Config) -> Result<Self> {
        let renderer = build_renderer(&config.renderer)?;
        let images = ImageTextCollector::from_config(&config.ocr, &config.renderer.user_agent)?;

        Ok(Self::new(renderer, OutputWriter::new(&config.output.directory))
            .with_image_text(images)
            .with_page_limit(config.crawler.page_limit)
            .with_separate_link_fetch(config.crawler.separate_link_fetch))
    }

    /// Enables OCR for requests that ask for it
    pub fn with_image_text(mut self, images: ImageTextCollector) -> Self {
        self.images = Some(images);
        self
    }

    /// Sets the page limit; values above 50 are capped
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.min(MAX_PAGE_LIMIT);
        self
    }

    /// Renders each URL a second time for link discovery instead of
    /// reusing the extraction markup
    pub fn with_separate_link_fetch(mut self, separate: bool) -> Self {
        self.separate_link_fetch = separate;
        self
    }

    pub fn page_limit(&self) -> usize {
        self.page_limit
    }

    pub fn writer(&self) -> &OutputWriter {
        &self.writer
    }

    /// Runs a crawl to completion
    ///
    /// Per-URL render, write and OCR failures are reported as events and
    /// skipped. The crawl only ends with an error if the request is invalid
    /// or the output directory cannot be created.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pagescribe::config::Config;
    /// use pagescribe::crawler::{CancelFlag, CrawlRequest, Crawler, EventSink};
    ///
    /// # async fn example() -> pagescribe::Result<()> {
    /// let crawler = Crawler::from_config(&Config::default())?;
    /// let request = CrawlRequest::new("https://example.com/").with_depth(2);
    /// let outcome = crawler
    ///     .run(&request, &EventSink::disabled(), &CancelFlag::new())
    ///     .await?;
    /// println!("{} files written", outcome.files_written);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(
        &self,
        request: &CrawlRequest,
        events: &EventSink,
        cancel: &CancelFlag,
    ) -> Result<CrawlOutcome> {
        let start_url = request.validate()?;
        self.writer.ensure_directory().await?;

        let depth = request.max_depth;
        tracing::info!(
            "Starting crawl of {} (depth {}, OCR {})",
            request.start_url,
            depth,
            if request.ocr { "on" } else { "off" }
        );
        if !request.keywords.is_empty() {
            tracing::debug!(
                "Keyword filter {:?} accepted but not applied",
                request.keywords
            );
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier = vec![start_url.to_string()];
        let mut files_written = 0;
        let mut levels_completed = 0;

        for level in 1..=depth {
            if frontier.is_empty() {
                break;
            }

            tracing::info!(
                "Crawl level {}/{} ({} URLs queued)",
                level,
                depth,
                frontier.len()
            );
            events.emit(CrawlEvent::LevelStarted {
                level,
                depth,
                frontier: frontier.len(),
            });

            let mut next_frontier = Vec::new();

            for url in &frontier {
                if cancel.is_cancelled() {
                    tracing::info!("Crawl cancelled before {}", url);
                    events.emit(CrawlEvent::Cancelled);
                    return Ok(self.finish(
                        outcome(files_written, &visited, levels_completed, StopReason::Cancelled),
                        events,
                    ));
                }

                if !visited.insert(url.clone()) {
                    tracing::debug!("Skipping already visited URL: {}", url);
                    continue;
                }

                let page = self.fetch_and_extract(url, events).await;

                if let Some(page) = &page {
                    match self.save_page(url, page, request.ocr, events).await {
                        Ok(path) => {
                            files_written += 1;
                            events.emit(CrawlEvent::PageSaved {
                                url: url.clone(),
                                path,
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Could not save {}: {}", url, e);
                            events.emit(CrawlEvent::PageSkipped {
                                url: url.clone(),
                                reason: format!("could not save page: {}", e),
                            });
                        }
                    }

                    if files_written >= self.page_limit {
                        tracing::info!("Page limit ({}) reached", self.page_limit);
                        events.emit(CrawlEvent::LimitReached {
                            limit: self.page_limit,
                        });
                        return Ok(self.finish(
                            outcome(files_written, &visited, levels_completed, StopReason::PageLimit),
                            events,
                        ));
                    }
                }

                if let Some(links) = self.discover_links(url, page, events).await {
                    tracing::debug!("Queued {} links from {}", links.len(), url);
                    next_frontier.extend(links);
                }
            }

            levels_completed = level;
            frontier = next_frontier;
        }

        let stop_reason = if frontier.is_empty() {
            StopReason::FrontierExhausted
        } else {
            StopReason::DepthReached
        };

        Ok(self.finish(
            outcome(files_written, &visited, levels_completed, stop_reason),
            events,
        ))
    }

    /// Renders and extracts one page; None if rendering failed
    async fn fetch_and_extract(&self, url: &str, events: &EventSink) -> Option<ExtractedPage> {
        match self.renderer.render(url).await {
            Ok(markup) => Some(extract(&markup, url)),
            Err(e) => {
                tracing::warn!("Render failed for {}: {}", url, e);
                events.emit(CrawlEvent::PageSkipped {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Writes one page's text file, running OCR first if requested
    async fn save_page(
        &self,
        url: &str,
        page: &ExtractedPage,
        ocr: bool,
        events: &EventSink,
    ) -> Result<PathBuf> {
        let mut record = PageRecord::new(page.title.clone(), url.to_string(), page.body_text.clone());

        if ocr {
            match &self.images {
                Some(images) => {
                    let texts = images.collect(&page.image_sources, events).await;
                    record = record.with_image_texts(texts);
                }
                None => {
                    tracing::warn!("OCR requested but no OCR engine is configured");
                    events.warn("OCR requested but no OCR engine is configured");
                }
            }
        }

        let path = self.writer.write(&record.to_text(), &record.filename()).await?;
        tracing::info!("Saved article text to {}", path.display());
        Ok(path)
    }

    /// Links to queue for the next level
    ///
    /// By default the extraction result is reused. With a separate link
    /// fetch the URL is rendered again; a failure there only loses this
    /// page's links.
    async fn discover_links(
        &self,
        url: &str,
        page: Option<ExtractedPage>,
        events: &EventSink,
    ) -> Option<Vec<String>> {
        if !self.separate_link_fetch {
            return page.map(|page| page.links);
        }

        match self.renderer.render(url).await {
            Ok(markup) => Some(extract_links_only(&markup, url)),
            Err(e) => {
                tracing::warn!("Link discovery render failed for {}: {}", url, e);
                events.warn(format!("Link discovery failed for {}: {}", url, e));
                None
            }
        }
    }

    fn finish(&self, outcome: CrawlOutcome, events: &EventSink) -> CrawlOutcome {
        tracing::info!(
            "Crawl finished: {} files written, {} pages visited, {} levels ({})",
            outcome.files_written,
            outcome.pages_visited,
            outcome.levels_completed,
            outcome.stop_reason
        );
        events.emit(CrawlEvent::Finished(outcome));
        outcome
    }
}
