//! LLM API access with exponential backoff.
//!
//! The model is reached through an OpenAI-compatible `/chat/completions`
//! endpoint (DeepSeek by default). [`AskAsync`] is the seam; [`RetryAsk`]
//! decorates any implementation with retry + exponential backoff + jitter,
//! and [`ask_with_backoff`] is the entry point the analyzer uses.
//!
//! Callers are expected to convert failures into user-visible text; nothing
//! here aborts a command loop.

use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Send text to an LLM and receive a response.
pub trait AskAsync {
    type Response;

    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Endpoint root, e.g. `https://www.chataiapi.com/v1`.
    pub base_url: String,
    /// Model identifier, e.g. `deepseek-r1`.
    pub model: String,
}

/// OpenAI-compatible chat-completions client.
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl AskAsync for LlmClient {
    type Response = String;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: text.to_string(),
            }],
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let parsed: ChatResponse = response.json().await?;
        let dt = t0.elapsed();

        match parsed.choices.into_iter().next() {
            Some(choice) => {
                info!(elapsed_ms = dt.as_millis() as u64, "Completion received");
                Ok(choice.message.content)
            }
            None => Err("completion response had no choices".into()),
        }
    }
}

/// Adds retry with exponential backoff and jitter to any [`AskAsync`].
///
/// Delay: `min(base_delay * 2^(attempt-1), max_delay) + jitter(0..=250ms)`.
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T: AskAsync> RetryAsk<T> {
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Ask the model with up to 5 retries (1s base delay, 30s cap).
#[instrument(level = "info", skip_all)]
pub async fn ask_with_backoff(client: &LlmClient, prompt: &str) -> Result<String, Box<dyn Error>> {
    let api = RetryAsk::new(client, 5, StdDuration::from_secs(1));
    api.ask(prompt).await
}

impl<T: AskAsync> AskAsync for &T {
    type Response = T::Response;

    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        (**self).ask(text).await
    }
}
