//! Crawl progress events
//!
//! The controller reports progress to an `EventSink`. Consumers (the CLI, a
//! UI, tests) hold the receiving end of the channel.

use crate::crawler::CrawlOutcome;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// A progress report from a running crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A new level is starting with `frontier` URLs queued
    LevelStarted {
        level: u32,
        depth: u32,
        frontier: usize,
    },

    /// A page was written to disk
    PageSaved { url: String, path: PathBuf },

    /// A page could not be rendered or saved and was skipped
    PageSkipped { url: String, reason: String },

    /// Non-fatal problem (image fetch or OCR failure, missing link markup)
    Warning { message: String },

    /// The safety ceiling stopped the crawl
    LimitReached { limit: usize },

    /// The crawl stopped because cancellation was requested
    Cancelled,

    /// The crawl is over
    Finished(CrawlOutcome),
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelStarted {
                level,
                depth,
                frontier,
            } => write!(
                f,
                "[INFO] Crawl level {}/{} ({} queued)",
                level, depth, frontier
            ),
            Self::PageSaved { path, .. } => {
                write!(f, "[INFO] Saved article text to {}", path.display())
            }
            Self::PageSkipped { url, reason } => write!(f, "[ERROR] Skipped {}: {}", url, reason),
            Self::Warning { message } => write!(f, "[WARNING] {}", message),
            Self::LimitReached { limit } => write!(f, "[INFO] Page limit ({}) reached", limit),
            Self::Cancelled => write!(f, "[INFO] Crawl cancelled"),
            Self::Finished(outcome) => write!(
                f,
                "[INFO] Crawl finished: {} files written, {} pages visited ({})",
                outcome.files_written, outcome.pages_visited, outcome.stop_reason
            ),
        }
    }
}

/// Sending half of a crawl's progress channel
///
/// Emitting never fails: once the receiver is gone, events are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<mpsc::UnboundedSender<CrawlEvent>>,
}

impl EventSink {
    /// Creates a sink and the receiver that observes it
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A sink that discards every event
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: CrawlEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    /// Shorthand for a `Warning` event
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(CrawlEvent::Warning {
            message: message.into(),
        });
    }
}
