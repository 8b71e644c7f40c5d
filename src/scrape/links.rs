//! Feature-link discovery on year-index pages.
//!
//! A year-index page lists every feature update published that year. Links
//! are kept when their visible text carries a feature-update signal: one of
//! a fixed set of Indonesian/English keywords, or one of the two decorative
//! glyphs the site uses to flag updates. Results come back in document
//! order; deduplication and sorting happen later, in the crawl.

use crate::models::FeatureLink;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Keyword fragments that mark a link as a feature update.
const FEATURE_KEYWORDS: &[&str] = &["fitur", "penambahan", "pembaharuan", "updates"];

/// Decorative glyphs the site prefixes update links with.
const FEATURE_GLYPHS: &[char] = &['🚀', '🔥'];

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

// "12 Januari 2024", "Januari 2024", or "12 Jan 2024"
static DATE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}\s+\w+\s+\d{4}|\w+\s+\d{4}|\d{1,2}\s+\w{3}\s+\d{4})").unwrap()
});

static BRACKETED_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*\[.*?\]").unwrap());

/// Scan a year-index page for feature-update links.
///
/// Every `<a href>` with non-empty text matching a feature signal becomes a
/// [`FeatureLink`] with its raw date fragment (defaulting to `01 Jan {year}`
/// when none is present), a cleaned title, and an absolute URL resolved
/// against `base`. Unresolvable hrefs are dropped.
pub fn discover(html: &str, base: &Url, year: i32) -> Vec<FeatureLink> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();

    for anchor in doc.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = anchor.text().collect::<Vec<_>>().join("");
        let text = text.trim();
        if text.is_empty() || !is_feature_signal(text) {
            continue;
        }
        let Ok(url) = base.join(href) else {
            debug!(href, "Skipping unresolvable href");
            continue;
        };

        let date_str = DATE_FRAGMENT
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| format!("01 Jan {year}"));

        links.push(FeatureLink {
            title: clean_title(text),
            url: url.to_string(),
            date_str,
            year,
        });
    }

    debug!(count = links.len(), year, "Discovered feature links");
    links
}

fn is_feature_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    FEATURE_KEYWORDS.iter().any(|kw| lower.contains(kw))
        || FEATURE_GLYPHS.iter().any(|g| text.contains(*g))
}

/// Strip decorative glyphs and any trailing bracketed date annotation, trim,
/// and cap at 100 characters.
pub fn clean_title(title: &str) -> String {
    let no_glyphs: String = title.chars().filter(|c| !FEATURE_GLYPHS.contains(c)).collect();
    let no_brackets = BRACKETED_DATE.replace_all(&no_glyphs, "");
    let trimmed = no_brackets.trim();
    match trimmed.char_indices().nth(100) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}
