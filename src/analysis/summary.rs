//! Summaries from an OpenAI-compatible chat completions endpoint

use crate::config::SummaryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Inputs shorter than this many characters are not sent to the model
pub const MIN_SUMMARY_CHARS: usize = 100;

pub const TOO_SHORT_MESSAGE: &str = "Text too short to summarize.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no choices")]
    NoChoices,
}

/// Client for the configured summary endpoint
///
/// `summarize` never fails: transport, status and decoding problems come back
/// as a human-readable message in place of the summary.
#[derive(Debug, Clone)]
pub struct SummaryClient {
    client: reqwest::Client,
    config: SummaryConfig,
}

impl SummaryClient {
    /// Creates a client for the given endpoint settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: SummaryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarizes `text`, or explains why it could not
    pub async fn summarize(&self, text: &str) -> String {
        if text.chars().count() < MIN_SUMMARY_CHARS {
            return TOO_SHORT_MESSAGE.to_string();
        }

        match self.request_summary(text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summary request to {} failed: {}", self.config.endpoint, e);
                format!("Error contacting summary service: {}", e)
            }
        }
    }

    fn prompt(&self, text: &str) -> String {
        format!(
            "Summarize the following text clearly and concisely.\n\
             Aim for {}-{} words.\n\nText:\n{}",
            self.config.min_words, self.config.max_words, text
        )
    }

    async fn request_summary(&self, text: &str) -> Result<String, SummaryError> {
        let prompt = self.prompt(text);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            "Requesting summary of {} chars from {}",
            text.len(),
            self.config.endpoint
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(SummaryError::NoChoices)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
