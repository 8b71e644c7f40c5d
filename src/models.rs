//! Data models for release notes and crawl intermediates.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ReleaseNote`]: One normalized record describing a single feature update
//! - [`FeatureLink`]: An in-flight discovery result, consumed within one crawl pass
//! - [`CacheSummary`]: Statistics computed over a cached record set
//!
//! `ReleaseNote` is the only persisted shape; its field names match the JSON
//! cache file exactly.

use serde::{Deserialize, Serialize};

/// A normalized release note extracted from one feature-update page.
///
/// # Invariants
///
/// - `date` is always a well-formed `YYYY-MM-DD` string (falls back to
///   `YEAR-01-01` when the raw fragment could not be parsed)
/// - `title` is at most 100 characters and carries no decorative glyphs
/// - `content` is never empty; a fixed placeholder substitutes when no
///   extractable text was found
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReleaseNote {
    /// Canonical calendar date in `YYYY-MM-DD` format.
    pub date: String,
    /// Cleaned human-readable title, capped at 100 characters.
    pub title: String,
    /// Extracted body text, whitespace-normalized and length-capped.
    pub content: String,
    /// Absolute URL the content was extracted from.
    pub source_url: String,
}

/// A candidate feature-update link discovered on a year-index page.
///
/// Not persisted: created by link discovery, consumed by the crawl
/// orchestrator within the same pass, then discarded.
#[derive(Debug, Clone)]
pub struct FeatureLink {
    /// Cleaned link text.
    pub title: String,
    /// Absolute URL of the feature page.
    pub url: String,
    /// Raw date fragment as it appeared in the link text.
    pub date_str: String,
    /// The year of the index page the link was found on.
    pub year: i32,
}

/// Summary statistics over a collection of release notes.
///
/// Computed purely in memory; an empty collection yields no summary at all
/// rather than a summary full of zeroes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSummary {
    /// Number of notes in the collection.
    pub total_notes: usize,
    /// Sum of content lengths (in characters) across all notes.
    pub total_content_chars: usize,
    /// Mean content length in characters.
    pub avg_content_length: f64,
    /// Most recent `date` value present.
    pub latest_date: String,
    /// Oldest `date` value present.
    pub oldest_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(date: &str, title: &str) -> ReleaseNote {
        ReleaseNote {
            date: date.to_string(),
            title: title.to_string(),
            content: "Some feature description".to_string(),
            source_url: "https://fitur-sap.simplidots.id/page".to_string(),
        }
    }

    #[test]
    fn test_release_note_json_shape() {
        let json = serde_json::to_string(&note("2024-05-15", "Fitur Baru")).unwrap();
        assert!(json.contains("\"date\":\"2024-05-15\""));
        assert!(json.contains("\"title\":\"Fitur Baru\""));
        assert!(json.contains("\"source_url\""));
    }

    #[test]
    fn test_release_note_roundtrip() {
        let original = note("2023-11-01", "Pembaharuan SMH");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: ReleaseNote = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_release_note_preserves_non_ascii() {
        let mut n = note("2024-01-01", "Fitur 🚀");
        n.content = "Penambahan fitur é”".to_string();
        let json = serde_json::to_string(&n).unwrap();
        // serde_json emits non-ASCII literally rather than \u escapes
        assert!(json.contains("é”"));
    }

    #[test]
    fn test_deserialize_cache_array() {
        let json = r#"[
            {
                "date": "2024-05-15",
                "title": "Fitur Collection",
                "content": "Details",
                "source_url": "https://fitur-sap.simplidots.id/a"
            }
        ]"#;
        let notes: Vec<ReleaseNote> = serde_json::from_str(json).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].date, "2024-05-15");
    }
}
