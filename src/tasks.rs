//! Background refresh of the release-notes cache.
//!
//! A refresh runs a full crawl plus cache save on its own tokio task and
//! reports the outcome through a oneshot channel handed back at submission
//! time. The caller decides what to do with the report (the chat loop turns
//! it into a message and invalidates its in-memory cache); nothing is
//! mutated behind the caller's back.

use crate::models::CacheSummary;
use crate::scrape::crawl::Crawler;
use crate::scrape::fetch::{FetchPage, HttpFetcher};
use crate::store::{self, NoteStore};
use tokio::sync::oneshot;
use tracing::{error, info, instrument};
use url::Url;

/// Outcome of one background refresh.
#[derive(Debug)]
pub struct RefreshReport {
    /// Whether the crawled collection was written to the cache file.
    pub saved: bool,
    /// Statistics over the crawled collection; `None` when the crawl
    /// produced nothing.
    pub summary: Option<CacheSummary>,
}

impl RefreshReport {
    /// User-facing completion message.
    pub fn message(&self) -> String {
        match (&self.summary, self.saved) {
            (Some(s), true) => format!(
                "Data refresh complete: {} release notes, {} characters of content, latest update {}.",
                s.total_notes, s.total_content_chars, s.latest_date
            ),
            (Some(s), false) => format!(
                "Refresh crawled {} release notes but saving the cache failed.",
                s.total_notes
            ),
            (None, _) => "Data refresh failed. Please try again later.".to_string(),
        }
    }
}

/// Start a refresh on a background task.
///
/// The returned receiver resolves exactly once, when the crawl finishes.
/// At most one refresh should be in flight at a time; the caller holds the
/// receiver and must not submit another until it resolves.
pub fn spawn_refresh(store: NoteStore, base: Url, detailed: bool) -> oneshot::Receiver<RefreshReport> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        info!(detailed, "Background refresh started");
        let report = match HttpFetcher::new() {
            Ok(fetcher) => run_refresh(&Crawler::with_base(fetcher, base), &store, detailed).await,
            Err(e) => {
                error!(error = %e, "Could not build HTTP client for refresh");
                RefreshReport { saved: false, summary: None }
            }
        };
        // Receiver may have been dropped; the refresh already persisted.
        let _ = tx.send(report);
    });
    rx
}

/// Crawl everything and persist the result.
#[instrument(level = "info", skip_all)]
pub async fn run_refresh<F: FetchPage>(
    crawler: &Crawler<F>,
    store: &NoteStore,
    detailed: bool,
) -> RefreshReport {
    let notes = crawler.scrape_all(detailed).await;
    if notes.is_empty() {
        return RefreshReport { saved: false, summary: None };
    }
    let saved = store.save(&notes).await;
    RefreshReport {
        saved,
        summary: store::summarize(&notes),
    }
}
