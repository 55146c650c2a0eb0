//! Pagescribe: capture readable web text for ad-hoc research
//!
//! This crate renders web pages, extracts their readable text (optionally with
//! OCR'd image text), saves one text file per page, and offers light analytics
//! over the saved corpus.

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Pagescribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Crawl task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pagescribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEvent, CrawlOutcome, CrawlRequest, Crawler, StopReason};
pub use output::{safe_filename, OutputWriter, PageRecord};
