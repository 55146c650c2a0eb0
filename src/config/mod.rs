//! Configuration module for Pagescribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All sections and keys are optional; anything omitted takes its default.
//!
//! # Example
//!
//! ```no_run
//! use pagescribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagescribe.toml")).unwrap();
//! println!("Render timeout: {}s", config.renderer.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OcrConfig, OutputConfig, RendererBackend, RendererConfig,
    SentimentConfig, SummaryConfig, DEFAULT_USER_AGENT, MAX_PAGE_LIMIT,
};
pub use validation::MAX_DEPTH;

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
