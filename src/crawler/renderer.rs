//! Page renderers
//!
//! A renderer turns a URL into the markup a reader would see. Two
//! implementations are provided:
//! - `WebDriverRenderer`: a headless browser driven over WebDriver, so
//!   script-built pages are captured after they settle
//! - `HttpRenderer`: a plain GET for static pages or when no WebDriver
//!   server is available
//!
//! Renderers report failures as `RenderError` values. The crawl controller
//! skips the URL and carries on.

use crate::config::{RendererBackend, RendererConfig};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};

/// Delay between two network-idle probes
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that can occur while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to start browser session: {0}")]
    Session(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Failed to read page content: {0}")]
    Body(String),
}

/// Fetches fully rendered markup for a URL
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the page markup, or why it could not be produced
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Builds the renderer selected by the configuration
pub fn build_renderer(config: &RendererConfig) -> Result<Arc<dyn Renderer>, reqwest::Error> {
    Ok(match config.backend {
        RendererBackend::Webdriver => Arc::new(WebDriverRenderer::new(config)),
        RendererBackend::Http => Arc::new(HttpRenderer::new(config)?),
    })
}

/// Renders pages in a headless browser over WebDriver
///
/// Every call opens its own browser session and closes it afterwards, so a
/// crashed or wedged page never affects the next URL.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
    user_agent: String,
    timeout: Duration,
    headless: bool,
}

impl WebDriverRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            headless: config.headless,
        }
    }

    /// Chrome capabilities carrying the user agent and headless flag
    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec![
            format!("--user-agent={}", self.user_agent),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }

    async fn connect(&self) -> Result<Client, RenderError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        match timeout(self.timeout, builder.connect(&self.webdriver_url)).await {
            Ok(Ok(client)) => Ok(client),
            Ok(Err(e)) => Err(RenderError::Session(format!(
                "{} ({})",
                e, self.webdriver_url
            ))),
            Err(_) => Err(RenderError::Timeout(self.timeout)),
        }
    }

    async fn navigate_and_capture(&self, client: &Client, url: &str) -> Result<String, RenderError> {
        client
            .goto(url)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        wait_for_network_idle(client).await?;

        client
            .source()
            .await
            .map_err(|e| RenderError::Body(e.to_string()))
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let client = self.connect().await?;

        let result = match timeout(self.timeout, self.navigate_and_capture(&client, url)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.timeout)),
        };

        if let Err(e) = client.close().await {
            tracing::debug!("Failed to close browser session for {}: {}", url, e);
        }

        result
    }
}

/// Waits until the document is loaded and no new resources are requested
///
/// WebDriver has no network-idle signal, so this polls the resource timing
/// buffer until its size holds still between two probes.
async fn wait_for_network_idle(client: &Client) -> Result<(), RenderError> {
    let mut last_count: Option<u64> = None;

    loop {
        let ready_state = client
            .execute("return document.readyState", vec![])
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        let resource_count = client
            .execute(
                "return performance.getEntriesByType('resource').length",
                vec![],
            )
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?
            .as_u64();

        if ready_state.as_str() == Some("complete")
            && last_count.is_some()
            && last_count == resource_count
        {
            return Ok(());
        }

        last_count = resource_count;
        sleep(IDLE_POLL_INTERVAL).await;
    }
}

/// Fetches raw page markup with a plain HTTP GET
///
/// Scripts are not executed; pages built client-side come back mostly empty.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout(self.timeout)
            } else {
                RenderError::Navigation(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| RenderError::Body(e.to_string()))
    }
}
