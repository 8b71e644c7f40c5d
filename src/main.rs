//! # SimpliDOTS Release Notes Bot
//!
//! Crawls the SimpliDOTS GitBook release-notes site, caches the extracted
//! notes as a JSON file, and answers questions about them through an
//! OpenAI-compatible LLM endpoint.
//!
//! ## Usage
//!
//! ```sh
//! release_notes_bot crawl --detailed
//! release_notes_bot ask "Apa update PPN terbaru?"
//! release_notes_bot chat
//! ```
//!
//! ## Architecture
//!
//! 1. **Crawling**: discover feature links on per-year index pages and
//!    fetch each feature page
//! 2. **Extraction**: pull readable content and a canonical date out of
//!    each page
//! 3. **Caching**: persist the combined collection as one JSON array
//! 4. **Q&A**: build bounded prompts from the cache and query the LLM

use clap::Parser;
use std::error::Error;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};
use url::Url;

mod api;
mod cli;
mod commands;
mod models;
mod qa;
mod scrape;
mod store;
mod tasks;

use api::{LlmClient, LlmConfig};
use cli::{Cli, Commands};
use commands::{Command, CommandService};
use scrape::crawl::Crawler;
use scrape::fetch::HttpFetcher;
use store::NoteStore;

const EXIT_WORDS: &[&str] = &["quit", "exit", "q", "stop", "bye"];

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("release_notes_bot starting up");

    let args = Cli::parse();
    debug!(?args.cache_file, ?args.base_url, "Parsed CLI arguments");

    let base = Url::parse(&args.base_url)?;
    let store = NoteStore::new(&args.cache_file);
    info!(cache = %store.path().display(), "Using cache file");
    let llm = LlmClient::new(LlmConfig {
        api_key: args.api_key.clone(),
        base_url: args.llm_base_url.clone(),
        model: args.model.clone(),
    });

    match args.command {
        Commands::Crawl { detailed } => run_crawl(store, base, detailed).await?,
        Commands::Summary { count } => {
            let mut service = CommandService::new(store, base, llm, true)?;
            println!("{}", service.handle(Command::Summary(count)).await);
        }
        Commands::Ask { question } => {
            let mut service = CommandService::new(store, base, llm, true)?;
            println!("{}", service.handle(Command::Ask(question.join(" "))).await);
        }
        Commands::Status => {
            let mut service = CommandService::new(store, base, llm, true)?;
            println!("{}", service.handle(Command::Status).await);
        }
        Commands::Analyze => run_analyze(store, base, llm).await?,
        Commands::Chat => run_chat(store, base, llm).await?,
    }

    Ok(())
}

/// One-shot crawl: scrape everything, write the cache, print what happened.
async fn run_crawl(
    store: NoteStore,
    base: Url,
    detailed: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let crawler = Crawler::with_base(HttpFetcher::new()?, base);
    let report = tasks::run_refresh(&crawler, &store, detailed).await;
    println!("{}", report.message());
    Ok(())
}

/// Run every canned analysis question against the cached notes.
async fn run_analyze(
    store: NoteStore,
    base: Url,
    llm: LlmClient,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let notes = match store.load().await {
        Some(notes) if !notes.is_empty() => notes,
        _ => {
            info!("No cached notes; crawling before analysis");
            let crawler = Crawler::with_base(HttpFetcher::new()?, base);
            let notes = crawler.scrape_all(true).await;
            if notes.is_empty() {
                println!("No release notes available. The site may be unreachable.");
                return Ok(());
            }
            store.save(&notes).await;
            notes
        }
    };

    for (question, answer) in qa::analyze_features(&llm, &notes).await {
        println!("Q: {question}");
        println!("A: {answer}");
        println!();
    }
    Ok(())
}

/// Interactive loop: read a line, run it as a command, print the response.
/// Background refresh results are surfaced between prompts.
async fn run_chat(
    store: NoteStore,
    base: Url,
    llm: LlmClient,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut service = CommandService::new(store, base, llm, true)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("SimpliDOTS release notes chat. Type `help` for commands, `quit` to leave.");
    loop {
        if let Some(message) = service.poll_refresh() {
            println!("{message}");
        }

        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        let command = match commands::parse(line) {
            Command::Unknown(text) => commands::interpret_free_text(&text),
            command => command,
        };
        println!("{}", service.handle(command).await);
    }

    if service.refresh_in_progress() {
        println!("Waiting for the background refresh to finish...");
        if let Some(message) = service.wait_refresh().await {
            println!("{message}");
        }
    }
    println!("Sampai jumpa!");
    Ok(())
}
