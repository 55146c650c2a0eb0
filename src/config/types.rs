use serde::Deserialize;

/// Desktop Chrome user agent sent by both renderers
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Hard ceiling on files written by a single crawl
pub const MAX_PAGE_LIMIT: usize = 50;

/// Main configuration structure for Pagescribe
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub renderer: RendererConfig,
    pub ocr: OcrConfig,
    pub output: OutputConfig,
    pub summary: SummaryConfig,
    pub sentiment: SentimentConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Default number of levels when a request does not set one
    pub max_depth: u32,

    /// Files written before the crawl stops (at most 50)
    pub page_limit: usize,

    /// Render each URL a second time for link discovery
    pub separate_link_fetch: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            page_limit: MAX_PAGE_LIMIT,
            separate_link_fetch: false,
        }
    }
}

/// Which renderer fetches page markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    /// Headless browser driven over WebDriver; executes scripts
    Webdriver,
    /// Plain HTTP GET; no script execution
    Http,
}

/// Page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RendererConfig {
    pub backend: RendererBackend,

    /// WebDriver server (chromedriver, geckodriver, selenium)
    pub webdriver_url: String,

    pub user_agent: String,

    /// Upper bound on one render, navigation through idle wait
    pub timeout_secs: u64,

    pub headless: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: RendererBackend::Webdriver,
            webdriver_url: "http://localhost:4444".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 60,
            headless: true,
        }
    }
}

/// Image OCR configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OcrConfig {
    /// Tesseract executable name or path
    pub tesseract_command: String,

    /// Timeout for downloading one image
    pub image_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_command: "tesseract".to_string(),
            image_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving one text file per scraped page
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "scraped_txt".to_string(),
        }
    }
}

/// LLM summary endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummaryConfig {
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Target summary length range, in words, passed in the prompt
    pub min_words: u32,
    pub max_words: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".to_string(),
            model: "qwen2.5-coder-14b".to_string(),
            temperature: 0.2,
            max_tokens: 512,
            min_words: 60,
            max_words: 200,
        }
    }
}

/// Sentiment lexicon
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            positive: words(&[
                "good",
                "great",
                "excellent",
                "positive",
                "happy",
                "success",
                "benefit",
            ]),
            negative: words(&[
                "bad", "terrible", "sad", "negative", "failure", "harm", "angry",
            ]),
        }
    }
}
