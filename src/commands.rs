//! Chat command parsing and dispatch.
//!
//! Input arrives as free text. [`parse`] recognizes the explicit command
//! verbs; anything it cannot place comes back as [`Command::Unknown`], and
//! the chat loop may then run the text through [`interpret_free_text`],
//! which guesses intent from keywords and question shape. Keeping the two
//! stages separate means a mistyped verb gets a correction message instead
//! of being silently treated as a question.
//!
//! [`CommandService`] holds the state a session needs: the note cache, a
//! crawler for on-demand scrapes, the LLM client, and the receiver for an
//! in-flight background refresh. Every handler returns displayable text.

use crate::api::LlmClient;
use crate::qa;
use crate::scrape::crawl::Crawler;
use crate::scrape::fetch::{FetchPage, HttpFetcher};
use crate::store::{self, NoteCache, NoteStore};
use crate::tasks::{self, RefreshReport};
use std::error::Error;
use tokio::sync::oneshot;
use tracing::{info, instrument, warn};
use url::Url;

/// Upper bound on the summary note count a user may request.
const MAX_SUMMARY_COUNT: usize = 50;

const HELP_TEXT: &str = "\
SimpliDOTS Release Notes Bot

Available commands:
  summary        Summarize the latest release notes
  summary <n>    Summarize a specific number of notes (up to 50)
  ask <question> Ask about SimpliDOTS features
  status         Show cache statistics
  refresh        Re-crawl the release notes in the background
  help           Show this message

Examples:
  ask What are the latest PPN 12% updates?
  ask How does the Collection feature work?";

/// A recognized chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Summarize the latest notes, optionally a specific count.
    Summary(Option<usize>),
    /// Answer a question against the cached notes.
    Ask(String),
    /// Show cache statistics.
    Status,
    /// Start a background re-crawl.
    Refresh,
    /// Show the help text.
    Help,
    /// First word was not a known verb; carries the original text.
    Unknown(String),
}

/// Parse explicit command syntax: a leading verb plus optional arguments.
pub fn parse(text: &str) -> Command {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Command::Help;
    }
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    match verb.to_lowercase().as_str() {
        // A non-numeric argument falls back to the default count.
        "summary" => Command::Summary(rest.parse().ok()),
        "ask" => Command::Ask(rest.to_string()),
        "status" => Command::Status,
        "refresh" => Command::Refresh,
        "help" => Command::Help,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Guess the intent of text that did not start with a command verb.
///
/// Summary keywords win over question shape, so "what's in the summary?"
/// is a summary request. Text with no recognizable intent gets the help
/// message rather than a guessed LLM call.
pub fn interpret_free_text(text: &str) -> Command {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Command::Help;
    }
    let lower = trimmed.to_lowercase();
    if ["summary", "summarize", "overview"].iter().any(|k| lower.contains(k)) {
        return Command::Summary(None);
    }
    if lower.contains("help") {
        return Command::Help;
    }
    let question_starter = ["what", "how", "when", "why", "where"]
        .iter()
        .any(|k| lower.starts_with(k));
    if question_starter || trimmed.ends_with('?') {
        return Command::Ask(trimmed.to_string());
    }
    Command::Help
}

fn clamp_summary_count(requested: Option<usize>) -> usize {
    requested.unwrap_or(qa::SUMMARY_NOTE_LIMIT).min(MAX_SUMMARY_COUNT)
}

/// Per-session command state and dispatch.
pub struct CommandService<F> {
    cache: NoteCache,
    crawler: Crawler<F>,
    llm: LlmClient,
    base: Url,
    detailed: bool,
    pending_refresh: Option<oneshot::Receiver<RefreshReport>>,
}

impl CommandService<HttpFetcher> {
    /// Build a service over the real HTTP fetcher.
    pub fn new(
        store: NoteStore,
        base: Url,
        llm: LlmClient,
        detailed: bool,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let fetcher = HttpFetcher::new()?;
        Ok(Self::with_parts(
            NoteCache::new(store),
            Crawler::with_base(fetcher, base.clone()),
            llm,
            base,
            detailed,
        ))
    }
}

impl<F: FetchPage> CommandService<F> {
    pub fn with_parts(
        cache: NoteCache,
        crawler: Crawler<F>,
        llm: LlmClient,
        base: Url,
        detailed: bool,
    ) -> Self {
        Self {
            cache,
            crawler,
            llm,
            base,
            detailed,
            pending_refresh: None,
        }
    }

    /// Execute one command and return the response text.
    #[instrument(level = "info", skip(self))]
    pub async fn handle(&mut self, command: Command) -> String {
        match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Unknown(text) => format!(
                "Unknown command: `{text}`. Use `help` to see available commands."
            ),
            Command::Status => self.status().await,
            Command::Refresh => self.start_refresh(),
            Command::Summary(count) => self.summary(clamp_summary_count(count)).await,
            Command::Ask(question) => self.ask(question).await,
        }
    }

    /// Check the in-flight refresh, if any. Returns a completion message
    /// once and drops the in-memory cache so the next command reloads the
    /// fresh file.
    pub fn poll_refresh(&mut self) -> Option<String> {
        let rx = self.pending_refresh.as_mut()?;
        match rx.try_recv() {
            Ok(report) => {
                self.pending_refresh = None;
                self.cache.invalidate();
                Some(report.message())
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending_refresh = None;
                warn!("Refresh task dropped its channel without reporting");
                Some("Data refresh failed. Please try again later.".to_string())
            }
        }
    }

    pub fn refresh_in_progress(&self) -> bool {
        self.pending_refresh.is_some()
    }

    /// Block on the in-flight refresh, if any, and return its message.
    /// Used at shutdown so a running refresh is not cancelled mid-crawl.
    pub async fn wait_refresh(&mut self) -> Option<String> {
        let rx = self.pending_refresh.take()?;
        match rx.await {
            Ok(report) => {
                self.cache.invalidate();
                Some(report.message())
            }
            Err(_) => {
                warn!("Refresh task dropped its channel without reporting");
                Some("Data refresh failed. Please try again later.".to_string())
            }
        }
    }

    async fn status(&self) -> String {
        // Read from disk rather than the in-memory view so status reflects
        // what a restart would see.
        let Some(notes) = self.cache.store().load().await else {
            return "No cached release notes found. Use `refresh` to scrape fresh data."
                .to_string();
        };
        match store::summarize(&notes) {
            Some(s) => format!(
                "Cache status:\n  Notes: {}\n  Content: {} characters (avg {:.0} per note)\n  Date range: {} to {}",
                s.total_notes, s.total_content_chars, s.avg_content_length, s.oldest_date, s.latest_date
            ),
            None => "The cache file is empty. Use `refresh` to scrape fresh data.".to_string(),
        }
    }

    fn start_refresh(&mut self) -> String {
        if self.pending_refresh.is_some() {
            return "A refresh is already running. I will post the result when it finishes."
                .to_string();
        }
        self.pending_refresh = Some(tasks::spawn_refresh(
            self.cache.store().clone(),
            self.base.clone(),
            self.detailed,
        ));
        "Refreshing SimpliDOTS data in the background. This may take a few minutes.".to_string()
    }

    async fn summary(&mut self, count: usize) -> String {
        if !self.ensure_notes().await {
            return no_notes_message();
        }
        let notes = self.cache.notes().unwrap_or(&[]);
        let body = qa::summarize_notes(&self.llm, notes, count).await;
        format!("SimpliDOTS release notes summary (latest {count} notes):\n\n{body}")
    }

    async fn ask(&mut self, question: String) -> String {
        let question = question.trim().to_string();
        if question.is_empty() {
            return "Please provide a question about SimpliDOTS features. \
                    Example: `ask What are the latest PPN updates?`"
                .to_string();
        }
        if !self.ensure_notes().await {
            return no_notes_message();
        }
        let notes = self.cache.notes().unwrap_or(&[]);
        let answer = qa::ask_question(&self.llm, &question, notes).await;
        format!("Question: {question}\n\nAnswer:\n{answer}")
    }

    /// Make sure the cache holds notes, crawling on demand when nothing is
    /// cached yet. Returns whether any notes are now available.
    async fn ensure_notes(&mut self) -> bool {
        if self.cache.ensure_loaded().await.is_some() {
            return true;
        }
        info!("No cached notes; crawling fresh data");
        let notes = self.crawler.scrape_all(self.detailed).await;
        if notes.is_empty() {
            return false;
        }
        if !self.cache.store().save(&notes).await {
            warn!("Crawled notes could not be saved; continuing with the in-memory copy");
        }
        self.cache.replace(notes);
        true
    }
}

fn no_notes_message() -> String {
    "No release notes available. The site may be unreachable; try `refresh` later.".to_string()
}
