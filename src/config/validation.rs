use crate::config::types::{
    Config, CrawlerConfig, OcrConfig, OutputConfig, RendererConfig, SummaryConfig,
    MAX_PAGE_LIMIT,
};
use crate::ConfigError;
use url::Url;

/// Deepest crawl a request may ask for
pub const MAX_DEPTH: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_ocr_config(&config.ocr)?;
    validate_output_config(&config.output)?;
    validate_summary_config(&config.summary)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 || config.max_depth > MAX_DEPTH {
        return Err(ConfigError::Validation(format!(
            "max-depth must be between 1 and {}, got {}",
            MAX_DEPTH, config.max_depth
        )));
    }

    if config.page_limit < 1 || config.page_limit > MAX_PAGE_LIMIT {
        return Err(ConfigError::Validation(format!(
            "page-limit must be between 1 and {}, got {}",
            MAX_PAGE_LIMIT, config.page_limit
        )));
    }

    Ok(())
}

/// Validates renderer configuration
pub(crate) fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates OCR configuration
fn validate_ocr_config(config: &OcrConfig) -> Result<(), ConfigError> {
    if config.tesseract_command.trim().is_empty() {
        return Err(ConfigError::Validation(
            "tesseract-command cannot be empty".to_string(),
        ));
    }

    if config.image_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "image-timeout-secs must be >= 1, got {}",
            config.image_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates summary endpoint configuration
fn validate_summary_config(config: &SummaryConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid summary endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Summary endpoint '{}' must use http or https",
            config.endpoint
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "summary model cannot be empty".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0 and 2, got {}",
            config.temperature
        )));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "max-tokens must be >= 1".to_string(),
        ));
    }

    if config.min_words > config.max_words {
        return Err(ConfigError::Validation(format!(
            "min-words ({}) must not exceed max-words ({})",
            config.min_words, config.max_words
        )));
    }

    Ok(())
}
