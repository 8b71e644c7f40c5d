//! Body-content extraction from feature-update pages.
//!
//! The site is a GitBook deployment whose markup varies page to page, so
//! extraction works through an ordered chain of [`ContentStrategy`] values:
//! the first CSS selector that matches anything wins, the matched region's
//! text is cleaned of boilerplate (cookie banner, "Was this helpful?",
//! table-of-contents labels, copy/shortcut hints), and the result is capped.
//! When no strategy matches, an element-by-element walk keeps any fragment
//! long enough to be real prose.
//!
//! [`ExtractMode::Detailed`] adds a deeper fallback for pages where even the
//! walk finds nothing: strip script/style/nav/footer/header subtrees and
//! rebuild the page as `## heading` sections in document order, with a
//! larger length cap.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Substituted whenever no extractable text is found. Never empty output.
pub const PLACEHOLDER: &str = "Feature update details";

const STANDARD_CAP: usize = 10_000;
const DETAILED_CAP: usize = 15_000;

/// Extraction depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Selector chain plus the element-walk fallback, capped at 10,000 chars.
    Standard,
    /// Standard first; if that found nothing, the section-structured deep
    /// fallback, capped at 15,000 chars.
    Detailed,
}

/// One step of the content-discovery chain: a named CSS selector tried
/// against the whole document.
pub struct ContentStrategy {
    pub name: &'static str,
    pub selector: &'static str,
}

/// Likely main-content regions, most specific first. Extending extraction to
/// a new page layout means adding an entry here, not touching the crawl.
pub const DEFAULT_STRATEGIES: &[ContentStrategy] = &[
    ContentStrategy { name: "lexical-editor", selector: r#"div[data-lexical-editor="true"]"# },
    ContentStrategy { name: "content-body", selector: ".content-body" },
    ContentStrategy { name: "article", selector: "article" },
    ContentStrategy { name: "page-content", selector: ".page-content" },
    ContentStrategy { name: "main", selector: "main" },
    ContentStrategy { name: "markdown-body", selector: ".markdown-body" },
    ContentStrategy { name: "main-role", selector: r#"[role="main"]"# },
    ContentStrategy { name: "gitbook-content", selector: ".gitbook-content" },
];

static PARSED_STRATEGIES: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    DEFAULT_STRATEGIES
        .iter()
        .map(|s| (s.name, Selector::parse(s.selector).unwrap()))
        .collect()
});

static WALK_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, p, div, li, ul, ol").unwrap());
static DETAILED_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, p, div, li, strong, b").unwrap());

static PARAGRAPH_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Was this helpful\?|Table of contents|Copy|Ctrl|⌘K|Last updated.*ago)").unwrap()
});
static COOKIE_NOTICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)This site uses cookies.*?AcceptReject").unwrap());
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Extract body content from a fetched page.
///
/// Total: always returns a non-empty string, substituting [`PLACEHOLDER`]
/// when nothing usable is found. Output length is at most 10,000 characters
/// in standard mode and 15,000 when the detailed fallback ran.
pub fn extract(html: &str, mode: ExtractMode) -> String {
    let doc = Html::parse_document(html);
    match mode {
        ExtractMode::Standard => standard(&doc).unwrap_or_else(|| PLACEHOLDER.to_string()),
        ExtractMode::Detailed => standard(&doc)
            .or_else(|| detailed(&doc))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

/// Selector-chain extraction with the flat element-walk fallback.
fn standard(doc: &Html) -> Option<String> {
    let raw = match first_matching_region(doc) {
        Some((name, region)) => {
            debug!(strategy = name, "Content region matched");
            clean_region_text(&element_text(&region))
        }
        None => walk_fragments(doc).join("\n"),
    };

    finalize(&raw, STANDARD_CAP)
}

fn first_matching_region<'a>(doc: &'a Html) -> Option<(&'static str, ElementRef<'a>)> {
    PARSED_STRATEGIES
        .iter()
        .find_map(|(name, sel)| doc.select(sel).next().map(|el| (*name, el)))
}

/// Flat fallback: keep any heading/paragraph/list/div fragment long enough
/// to be prose and free of cookie/help-widget/TOC markers.
fn walk_fragments(doc: &Html) -> Vec<String> {
    doc.select(&WALK_ELEMENTS)
        .filter_map(|el| {
            let text = element_text(&el).trim().to_string();
            let lower = text.to_lowercase();
            let noisy = lower.contains("cookie")
                || lower.contains("was this helpful")
                || lower.contains("table of contents");
            (text.chars().count() > 15 && !noisy).then_some(text)
        })
        .collect()
}

/// Deep fallback for pages the standard pass came up empty on: drop
/// script/style/nav/footer/header subtrees, then rebuild the page as
/// heading-led sections in document order.
fn detailed(doc: &Html) -> Option<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for el in doc.select(&DETAILED_ELEMENTS) {
        if has_stripped_ancestor(&el) {
            continue;
        }
        let text = element_text(&el).trim().to_string();
        if text.chars().count() < 10 || contains_skip_marker(&text) {
            continue;
        }
        if matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            if !current.is_empty() {
                sections.push(current.join("\n"));
            }
            current = vec![format!("\n## {text}")];
        } else {
            current.push(text);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    finalize(&sections.join("\n\n"), DETAILED_CAP)
}

fn has_stripped_ancestor(el: &ElementRef) -> bool {
    el.ancestors().filter_map(ElementRef::wrap).any(|a| {
        matches!(
            a.value().name(),
            "script" | "style" | "nav" | "footer" | "header"
        )
    })
}

fn contains_skip_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["cookie", "was this helpful", "last updated", "copy", "ctrl"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<Vec<_>>().join("")
}

/// Whitespace normalization plus literal boilerplate removal for a matched
/// content region.
fn clean_region_text(text: &str) -> String {
    let text = PARAGRAPH_BREAKS.replace_all(text, "\n\n");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = BOILERPLATE.replace_all(&text, "");
    let text = COOKIE_NOTICE.replace_all(&text, "");
    text.trim().to_string()
}

/// Final cleanup shared by all paths: cap blank-line runs, trim, truncate.
/// Empty results become `None` so the caller substitutes the placeholder.
fn finalize(text: &str, cap: usize) -> Option<String> {
    let text = EXCESS_NEWLINES.replace_all(text, "\n\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(truncate_chars(text, cap))
    }
}

fn truncate_chars(s: &str, cap: usize) -> String {
    match s.char_indices().nth(cap) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_chain_picks_content_body() {
        let html = r#"<html><body>
            <div class="sidebar">Navigation stuff</div>
            <div class="content-body"><p>Penambahan fitur Collection untuk monitoring tagihan.</p></div>
        </body></html>"#;
        let out = extract(html, ExtractMode::Standard);
        assert!(out.contains("Penambahan fitur Collection"));
        assert!(!out.contains("Navigation stuff"));
    }

    #[test]
    fn test_strategy_order_prefers_lexical_editor() {
        let html = r#"<html><body>
            <article>Article text that should lose</article>
            <div data-lexical-editor="true">Lexical editor region wins here</div>
        </body></html>"#;
        let out = extract(html, ExtractMode::Standard);
        assert!(out.contains("Lexical editor region wins"));
        assert!(!out.contains("should lose"));
    }

    #[test]
    fn test_boilerplate_phrases_removed() {
        let html = r#"<html><body><article>
            Fitur baru untuk gudang.
            Was this helpful?
            Table of contents
            Last updated 3 days ago
        </article></body></html>"#;
        let out = extract(html, ExtractMode::Standard);
        assert!(out.contains("Fitur baru untuk gudang"));
        assert!(!out.contains("Was this helpful?"));
        assert!(!out.contains("Table of contents"));
        assert!(!out.contains("Last updated"));
    }

    #[test]
    fn test_cookie_notice_span_removed() {
        let html = "<html><body><main>Real content here.\nThis site uses cookies\nto do things\nAcceptReject\nMore real content.</main></body></html>";
        let out = extract(html, ExtractMode::Standard);
        assert!(out.contains("Real content here."));
        assert!(out.contains("More real content."));
        assert!(!out.contains("cookies"));
    }

    #[test]
    fn test_walk_fallback_when_no_region_matches() {
        let html = r#"<html><body>
            <p>Short</p>
            <p>A paragraph that is comfortably longer than fifteen characters.</p>
            <p>Please accept our cookie policy to continue browsing this site.</p>
        </body></html>"#;
        let out = extract(html, ExtractMode::Standard);
        assert!(out.contains("comfortably longer"));
        assert!(!out.contains("cookie policy"));
        assert!(!out.contains("Short"));
    }

    #[test]
    fn test_placeholder_on_empty_page() {
        assert_eq!(extract("<html><body></body></html>", ExtractMode::Standard), PLACEHOLDER);
        assert_eq!(extract("", ExtractMode::Standard), PLACEHOLDER);
    }

    #[test]
    fn test_standard_cap() {
        let long = "kata ".repeat(5000);
        let html = format!("<html><body><article>{long}</article></body></html>");
        let out = extract(&html, ExtractMode::Standard);
        assert!(out.chars().count() <= 10_000);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_detailed_mode_prefers_standard_result() {
        let html = r#"<html><body><article>Standard extraction found this.</article></body></html>"#;
        let out = extract(html, ExtractMode::Detailed);
        assert!(out.contains("Standard extraction found this"));
        assert!(!out.contains("##"));
    }

    #[test]
    fn test_detailed_fallback_builds_sections() {
        // Table markup: no region selector matches, the bold steps are not
        // in the flat walk's element set, and the heading is too short for
        // it, so the deep fallback runs.
        let html = r#"<html><body>
            <table><tr><td>
                <h2>Fitur Gudang</h2>
                <b>Langkah pertama: buka menu gudang di aplikasi.</b>
                <strong>Langkah kedua: pilih stok yang ingin diubah.</strong>
            </td></tr></table>
        </body></html>"#;
        let out = extract(html, ExtractMode::Detailed);
        assert!(out.contains("## Fitur Gudang"));
        assert!(out.contains("Langkah pertama"));
        assert!(out.contains("Langkah kedua"));
    }

    #[test]
    fn test_detailed_fallback_skips_chrome_subtrees() {
        let html = r#"<html><body>
            <nav><b>Menu entry long enough to otherwise qualify</b></nav>
            <footer><strong>Footer text long enough to otherwise qualify</strong></footer>
            <table><td><h3>Judul Fitur</h3><b>Isi penjelasan fitur untuk pengguna.</b></td></table>
        </body></html>"#;
        let out = extract(html, ExtractMode::Detailed);
        assert!(out.contains("Judul Fitur"));
        assert!(!out.contains("Menu entry"));
        assert!(!out.contains("Footer text"));
    }

    #[test]
    fn test_never_empty_and_within_detailed_cap() {
        let html = format!(
            "<html><body><table><td><h2>Judul Fitur</h2><b>{}</b></td></table></body></html>",
            "isi ".repeat(6000)
        );
        let out = extract(&html, ExtractMode::Detailed);
        assert!(!out.is_empty());
        assert!(out.chars().count() <= 15_000);
    }
}
