//! Crawling and extraction pipeline for the SimpliDOTS release-notes site.
//!
//! The pipeline runs in four stages, one fetch at a time:
//!
//! 1. **Discovery**: find feature-update links on a year-index page ([`links`])
//! 2. **Fetching**: download each feature page ([`fetch`])
//! 3. **Extraction**: pull body text and normalize the date ([`content`], [`dates`])
//! 4. **Orchestration**: caps, politeness delay, dedup, sorting ([`crawl`])
//!
//! The site is one fixed GitBook deployment; selectors, keywords, and URL
//! shapes here target its structure and nothing more general.

pub mod content;
pub mod crawl;
pub mod dates;
pub mod fetch;
pub mod links;

/// Root of the release-notes site; hrefs are resolved against this.
pub const BASE_URL: &str = "https://fitur-sap.simplidots.id/";
