//! Background crawl tasks
//!
//! A crawl runs on its own tokio task so the caller stays responsive. The
//! returned handle streams progress events and can request cancellation.
//!
//! Cancellation is cooperative: the flag is checked between URLs. A render
//! or OCR step already in flight runs to completion before the crawl stops.

use crate::crawler::events::{CrawlEvent, EventSink};
use crate::crawler::{CrawlOutcome, CrawlRequest, Crawler};
use crate::ScribeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Shared stop request for a running crawl
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Spawns crawls onto the tokio runtime
pub struct CrawlTask;

impl CrawlTask {
    /// Starts `request` on a new task and returns its handle
    pub fn spawn(crawler: Arc<Crawler>, request: CrawlRequest) -> CrawlHandle {
        let cancel = CancelFlag::new();
        let (events, receiver) = EventSink::channel();

        let task_cancel = cancel.clone();
        let join = tokio::spawn(async move { crawler.run(&request, &events, &task_cancel).await });

        CrawlHandle {
            cancel,
            events: receiver,
            join,
        }
    }
}

/// Handle to a crawl running in the background
pub struct CrawlHandle {
    cancel: CancelFlag,
    events: mpsc::UnboundedReceiver<CrawlEvent>,
    join: JoinHandle<Result<CrawlOutcome, ScribeError>>,
}

impl CrawlHandle {
    /// Asks the crawl to stop before its next URL
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the flag, for cancelling from elsewhere (e.g. a signal handler)
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Next progress event; `None` once the crawl has ended and all events are drained
    pub async fn next_event(&mut self) -> Option<CrawlEvent> {
        self.events.recv().await
    }

    /// Waits for the crawl to end and returns its outcome
    pub async fn join(self) -> Result<CrawlOutcome, ScribeError> {
        self.join
            .await
            .map_err(|e| ScribeError::Task(e.to_string()))?
    }
}
