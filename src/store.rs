//! File-backed persistence for the extracted record set.
//!
//! [`NoteStore`] is the sole reader and writer of the cache file: a single
//! JSON array of release notes, written whole (last writer wins, no
//! append or partial update). A crash mid-write can corrupt the file;
//! that is acceptable because the cache is fully rebuildable by
//! re-crawling.
//!
//! [`NoteCache`] is the in-memory handle the command layer works with.
//! It loads lazily from the store and exposes an explicit `invalidate`,
//! so staleness after a refresh is a visible operation rather than a
//! hidden field going out of date.

use crate::models::{CacheSummary, ReleaseNote};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Owns the on-disk JSON cache file.
#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the full collection to the cache file.
    ///
    /// Fails closed: any serialization or I/O error is logged and reported
    /// as `false`, never raised. Output is pretty-printed with 2-space
    /// indentation; non-ASCII text is written literally.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn save(&self, notes: &[ReleaseNote]) -> bool {
        let json = match serde_json::to_string_pretty(notes) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize notes");
                return false;
            }
        };
        match fs::write(&self.path, json).await {
            Ok(()) => {
                info!(count = notes.len(), "Saved release notes");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to write cache file");
                false
            }
        }
    }

    /// Load the cached collection.
    ///
    /// A missing file is the ordinary "nothing cached yet" case; a
    /// malformed file is also treated as absent, with the difference
    /// surfaced only in the logs.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Option<Vec<ReleaseNote>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No cached notes file");
                return None;
            }
            Err(e) => {
                error!(error = %e, "Failed to read cache file");
                return None;
            }
        };
        match serde_json::from_slice::<Vec<ReleaseNote>>(&bytes) {
            Ok(notes) => {
                info!(count = notes.len(), "Loaded release notes");
                Some(notes)
            }
            Err(e) => {
                error!(error = %e, "Cache file is malformed; treating as absent");
                None
            }
        }
    }
}

/// Summary statistics over an in-memory collection. Empty input yields no
/// summary rather than a summary of zeroes.
pub fn summarize(notes: &[ReleaseNote]) -> Option<CacheSummary> {
    if notes.is_empty() {
        return None;
    }
    let total_content_chars: usize = notes.iter().map(|n| n.content.chars().count()).sum();
    let latest_date = notes.iter().map(|n| n.date.as_str()).max()?.to_string();
    let oldest_date = notes.iter().map(|n| n.date.as_str()).min()?.to_string();
    Some(CacheSummary {
        total_notes: notes.len(),
        total_content_chars,
        avg_content_length: total_content_chars as f64 / notes.len() as f64,
        latest_date,
        oldest_date,
    })
}

/// In-memory view over a [`NoteStore`], loaded lazily.
pub struct NoteCache {
    store: NoteStore,
    loaded: Option<Vec<ReleaseNote>>,
}

impl NoteCache {
    pub fn new(store: NoteStore) -> Self {
        Self { store, loaded: None }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Load from disk if nothing is held yet; returns the notes if any
    /// exist either in memory or on disk.
    pub async fn ensure_loaded(&mut self) -> Option<&[ReleaseNote]> {
        if self.loaded.is_none() {
            self.loaded = self.store.load().await;
        }
        self.loaded.as_deref()
    }

    pub fn notes(&self) -> Option<&[ReleaseNote]> {
        self.loaded.as_deref()
    }

    /// Adopt a freshly crawled collection as the in-memory view.
    pub fn replace(&mut self, notes: Vec<ReleaseNote>) {
        self.loaded = Some(notes);
    }

    /// Drop the in-memory view; the next access reloads from disk.
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_store(tag: &str) -> NoteStore {
        let path = env::temp_dir().join(format!(
            "release_notes_bot_{tag}_{}.json",
            std::process::id()
        ));
        NoteStore::new(path)
    }

    fn note(date: &str, content: &str) -> ReleaseNote {
        ReleaseNote {
            date: date.to_string(),
            title: "Fitur".to_string(),
            content: content.to_string(),
            source_url: format!("https://fitur-sap.simplidots.id/{date}"),
        }
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let store = temp_store("roundtrip");
        let notes = vec![note("2024-05-15", "Isi A"), note("2023-11-01", "Isi B é”")];
        assert!(store.save(&notes).await);
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, notes);
        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_absent_not_error() {
        let store = NoteStore::new("/nonexistent-dir/never-here.json");
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_absent() {
        let store = temp_store("malformed");
        std::fs::write(store.path(), "{ not json [").unwrap();
        assert!(store.load().await.is_none());
        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_save_to_unwritable_path_returns_false() {
        let store = NoteStore::new("/nonexistent-dir/never-here.json");
        assert!(!store.save(&[note("2024-01-01", "x")]).await);
    }

    #[test]
    fn test_summarize_empty_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_summarize_totals() {
        let notes = vec![
            note("2024-05-15", "abcde"),
            note("2023-01-02", "xyz"),
            note("2024-12-01", "12345678"),
        ];
        let s = summarize(&notes).unwrap();
        assert_eq!(s.total_notes, 3);
        assert_eq!(s.total_content_chars, 16);
        assert!((s.avg_content_length - 16.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.latest_date, "2024-12-01");
        assert_eq!(s.oldest_date, "2023-01-02");
    }

    #[test]
    fn test_summarize_counts_chars_not_bytes() {
        let notes = vec![note("2024-01-01", "héllo")];
        assert_eq!(summarize(&notes).unwrap().total_content_chars, 5);
    }

    #[tokio::test]
    async fn test_cache_invalidate_forces_reload() {
        let store = temp_store("cache");
        store.save(&[note("2024-01-01", "first")]).await;

        let mut cache = NoteCache::new(store.clone());
        assert_eq!(cache.ensure_loaded().await.unwrap().len(), 1);

        store
            .save(&[note("2024-01-01", "first"), note("2024-02-02", "second")])
            .await;
        // still the stale in-memory view
        assert_eq!(cache.ensure_loaded().await.unwrap().len(), 1);

        cache.invalidate();
        assert_eq!(cache.ensure_loaded().await.unwrap().len(), 2);
        let _ = std::fs::remove_file(store.path());
    }
}
