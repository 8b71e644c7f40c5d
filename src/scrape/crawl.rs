//! Crawl orchestration across the configured years.
//!
//! One crawl pass visits each year-index page in a fixed order, discovers
//! feature links, fetches at most a capped number of them, extracts content
//! and a canonical date per page, and finally dedups and sorts the combined
//! result newest-first. Failures never abort the run: a failed year page
//! skips that year, a failed feature page skips that item.
//!
//! The per-year cap is applied to links in document order *before* any
//! fetching, so when an index lists more links than the cap, which items
//! survive is decided by page position rather than date. Sorting only
//! happens on the combined result afterwards.

use crate::models::ReleaseNote;
use crate::scrape::content::{self, ExtractMode};
use crate::scrape::fetch::FetchPage;
use crate::scrape::{dates, links};
use itertools::Itertools;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Years with an index page, in the order they are crawled.
pub const CRAWL_YEARS: &[i32] = &[2024, 2023, 2025];

/// Per-year link caps: a bound on total requests, not a quality filter.
const STANDARD_LINK_CAP: usize = 25;
const DETAILED_LINK_CAP: usize = 20;

/// Pause between feature-page fetches.
const FETCH_DELAY: Duration = Duration::from_secs(1);

/// Drives a full crawl through a [`FetchPage`] implementation.
pub struct Crawler<F> {
    fetcher: F,
    base: Url,
    delay: Duration,
}

impl<F: FetchPage> Crawler<F> {
    pub fn with_base(fetcher: F, base: Url) -> Self {
        Self {
            fetcher,
            base,
            delay: FETCH_DELAY,
        }
    }

    #[cfg(test)]
    fn with_delay(fetcher: F, base: Url, delay: Duration) -> Self {
        Self { fetcher, base, delay }
    }

    fn year_index_url(&self, year: i32) -> String {
        format!("{}smh/fitur-pada-smh-sales-management-hub/{year}", self.base)
    }

    /// Crawl every configured year and return the combined collection,
    /// deduplicated by source URL and sorted by date descending.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape_all(&self, detailed: bool) -> Vec<ReleaseNote> {
        let mut all = Vec::new();
        for &year in CRAWL_YEARS {
            let year_notes = self.scrape_year(year, detailed).await;
            info!(year, count = year_notes.len(), "Year crawl finished");
            all.extend(year_notes);
        }

        let mut all: Vec<ReleaseNote> = all
            .into_iter()
            .unique_by(|note| note.source_url.clone())
            .collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));

        info!(total = all.len(), "Crawl complete");
        all
    }

    /// Crawl one year's index page. A fetch failure on the index yields an
    /// empty contribution; a failure on a single feature page skips only
    /// that item.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape_year(&self, year: i32, detailed: bool) -> Vec<ReleaseNote> {
        let index_url = self.year_index_url(year);
        let html = match self.fetcher.fetch_page(&index_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(year, url = %index_url, error = %e, "Year index fetch failed; skipping year");
                return Vec::new();
            }
        };

        let found = links::discover(&html, &self.base, year);
        info!(year, count = found.len(), "Found feature links");

        let cap = if detailed { DETAILED_LINK_CAP } else { STANDARD_LINK_CAP };
        let mode = if detailed { ExtractMode::Detailed } else { ExtractMode::Standard };

        let mut notes = Vec::new();
        for (i, link) in found.into_iter().take(cap).enumerate() {
            debug!(index = i, title = %link.title, url = %link.url, "Fetching feature page");
            let page = match self.fetcher.fetch_page(&link.url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %link.url, error = %e, "Feature page fetch failed; skipping item");
                    continue;
                }
            };

            let normalized = dates::normalize(&link.date_str, link.year);
            debug!(date = %normalized.date, origin = ?normalized.origin, "Normalized date");

            notes.push(ReleaseNote {
                date: normalized.date,
                title: link.title,
                content: content::extract(&page, mode),
                source_url: link.url,
            });

            sleep(self.delay).await;
        }

        notes
    }
}
