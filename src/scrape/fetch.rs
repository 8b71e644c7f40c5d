//! HTTP fetch boundary for the crawl.
//!
//! [`FetchPage`] is the seam between the orchestrator and the network: the
//! real implementation is a thin reqwest wrapper, tests substitute canned
//! page maps. Implementations return the raw HTML body as a `String`;
//! parsing happens synchronously in the callers so no parsed document ever
//! lives across an await point.

use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Per-request timeout. Exceeding it is an ordinary fetch failure.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Browser-like User-Agent; the site serves reduced markup to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetch one page by URL.
///
/// Errors never cross the orchestration boundary as errors; the crawl
/// converts them into skip decisions at the smallest enclosing unit.
pub trait FetchPage {
    async fn fetch_page(&self, url: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// reqwest-backed [`FetchPage`] with a fixed timeout and User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_page(&self, url: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        info!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
