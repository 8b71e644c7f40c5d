//! Command-line interface.

use clap::{Parser, Subcommand};

/// Scrapes SimpliDOTS GitBook release notes into a JSON cache and answers
/// questions about them through an LLM.
#[derive(Parser, Debug)]
#[command(name = "release_notes_bot", version, about)]
pub struct Cli {
    /// Path of the JSON cache file.
    #[arg(long, default_value = "release_notes.json")]
    pub cache_file: String,

    /// Root URL of the release-notes site.
    #[arg(long, default_value = crate::scrape::BASE_URL)]
    pub base_url: String,

    /// API key for the completion endpoint.
    #[arg(long, env = "DEEPSEEK_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the OpenAI-compatible completion endpoint.
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://www.chataiapi.com/v1")]
    pub llm_base_url: String,

    /// Model identifier sent with each completion request.
    #[arg(long, env = "LLM_MODEL", default_value = "deepseek-r1")]
    pub model: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the site and write the cache file.
    Crawl {
        /// Extract richer per-page content (fewer pages per year).
        #[arg(long)]
        detailed: bool,
    },
    /// Summarize the latest cached notes.
    Summary {
        /// How many notes to include, up to 50.
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Answer one question against the cached notes.
    Ask {
        /// The question text.
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Run the full canned feature analysis.
    Analyze,
    /// Show cache statistics.
    Status,
    /// Interactive chat session.
    Chat,
}
