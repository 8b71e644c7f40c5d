//! Prompt assembly and LLM-backed analysis of cached release notes.
//!
//! Context windows are bounded twice: by a note-count cap and by a
//! per-note content slice, keeping prompts under the model's token budget.
//! Every function here returns displayable text; LLM failures come back as
//! visible `Error ...` strings rather than propagated errors, so a failed
//! call never breaks a command loop.

use crate::api::{ask_with_backoff, LlmClient};
use crate::models::ReleaseNote;
use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

/// Default number of notes included in a summary prompt.
pub const SUMMARY_NOTE_LIMIT: usize = 20;
/// Number of notes included in a question-answering prompt.
pub const QA_NOTE_LIMIT: usize = 25;

const SUMMARY_SLICE: usize = 500;
const QA_SLICE: usize = 800;
const ANALYSIS_CONCURRENCY: usize = 3;

/// Canned analysis questions for the full feature review.
pub const ANALYSIS_QUESTIONS: &[&str] = &[
    "What are the most recent features added to SimpliDOTS?",
    "What improvements have been made to the Sales Management Hub (SMH)?",
    "Are there any new integrations or API features?",
    "What tax-related updates (PPN) have been implemented?",
    "What warehouse and inventory management features were added?",
    "Are there any collection or payment-related features?",
    "What dashboard or interface improvements were made?",
];

/// Summarize the newest notes in five bullet points.
#[instrument(level = "info", skip_all, fields(notes = notes.len(), max_notes))]
pub async fn summarize_notes(llm: &LlmClient, notes: &[ReleaseNote], max_notes: usize) -> String {
    if notes.is_empty() {
        return "No notes to summarize.".to_string();
    }
    let prompt = format!(
        "Summarize these SimpliDOTS release notes in 5 key bullet points:\n{}",
        summary_context(notes, max_notes)
    );
    match ask_with_backoff(llm, &prompt).await {
        Ok(answer) => answer,
        Err(e) => format!("Error generating summary: {e}"),
    }
}

/// Answer a free-form question against the cached notes.
#[instrument(level = "info", skip_all, fields(notes = notes.len()))]
pub async fn ask_question(llm: &LlmClient, question: &str, notes: &[ReleaseNote]) -> String {
    if notes.is_empty() {
        return "No notes available to answer questions.".to_string();
    }
    let prompt = format!(
        "Answer this question based on SimpliDOTS release notes:\n\nContext:\n{}\n\nQuestion: {}",
        question_context(notes, QA_NOTE_LIMIT),
        question
    );
    match ask_with_backoff(llm, &prompt).await {
        Ok(answer) => answer,
        Err(e) => format!("Error answering question: {e}"),
    }
}

/// Run every canned analysis question, a few at a time, preserving
/// question order in the result.
#[instrument(level = "info", skip_all)]
pub async fn analyze_features(
    llm: &LlmClient,
    notes: &[ReleaseNote],
) -> Vec<(String, String)> {
    let results: Vec<(String, String)> = stream::iter(ANALYSIS_QUESTIONS)
        .map(|question| async move {
            let answer = ask_question(llm, question, notes).await;
            (question.to_string(), answer)
        })
        .buffered(ANALYSIS_CONCURRENCY)
        .collect()
        .await;
    info!(questions = results.len(), "Feature analysis complete");
    results
}

fn summary_context(notes: &[ReleaseNote], max_notes: usize) -> String {
    notes
        .iter()
        .take(max_notes)
        .map(|n| format!("{} - {}: {}...", n.date, n.title, slice_chars(&n.content, SUMMARY_SLICE)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn question_context(notes: &[ReleaseNote], max_notes: usize) -> String {
    notes
        .iter()
        .take(max_notes)
        .map(|n| format!("{}: {} - {}...", n.date, n.title, slice_chars(&n.content, QA_SLICE)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn slice_chars(s: &str, cap: usize) -> &str {
    match s.char_indices().nth(cap) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
