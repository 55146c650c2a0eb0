//! Pagescribe main entry point
//!
//! This is the command-line interface for crawling pages into text files and
//! analyzing the saved corpus.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagescribe::analysis::{Analyzer, Lexicon};
use pagescribe::config::{load_or_default, Config, RendererBackend, MAX_DEPTH};
use pagescribe::corpus::Corpus;
use pagescribe::crawler::{CrawlRequest, CrawlTask, Crawler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Pagescribe: capture readable web text for research
///
/// Pagescribe renders web pages, saves their title, article text and
/// (optionally) OCR'd image text as plain text files, and offers sentiment,
/// keyword and summary analysis over the saved files.
#[derive(Parser, Debug)]
#[command(name = "pagescribe")]
#[command(version = "1.0.0")]
#[command(about = "Capture readable web text for research", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from a start URL and save one text file per page
    Crawl {
        /// Page to start from
        url: String,

        /// Number of link levels to follow, the start page being level 1
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=MAX_DEPTH as i64))]
        depth: Option<u32>,

        /// OCR images found on each page
        #[arg(long)]
        ocr: bool,

        /// Keyword of interest (repeatable; recorded but not used for filtering)
        #[arg(short, long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,

        /// Fetch pages over plain HTTP instead of a headless browser
        #[arg(long)]
        http: bool,
    },

    /// List saved files with their sentiment score
    Files,

    /// List saved files containing a keyword
    Search {
        keyword: String,
    },

    /// Show sentiment, top keywords and a summary for a saved file
    Analyze {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to prepare default configuration".to_string(),
    })?;

    match cli.command {
        Command::Crawl {
            url,
            depth,
            ocr,
            keywords,
            http,
        } => {
            if http {
                config.renderer.backend = RendererBackend::Http;
            }
            let request = CrawlRequest::new(url)
                .with_depth(depth.unwrap_or(config.crawler.max_depth))
                .with_keywords(keywords)
                .with_ocr(ocr);
            handle_crawl(&config, request).await
        }
        Command::Files => handle_files(&config).await,
        Command::Search { keyword } => handle_search(&config, &keyword).await,
        Command::Analyze { file } => handle_analyze(&config, &file).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only command output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagescribe=info,warn"),
            1 => EnvFilter::new("pagescribe=debug,info"),
            2 => EnvFilter::new("pagescribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn corpus(config: &Config) -> Corpus {
    Corpus::new(&config.output.directory).with_lexicon(Lexicon::from_config(&config.sentiment))
}

/// Runs a crawl in the background, printing progress until it ends
///
/// Ctrl-C requests cancellation; the crawl stops before its next URL. A
/// second Ctrl-C exits at once with status 130.
async fn handle_crawl(config: &Config, request: CrawlRequest) -> Result<()> {
    let crawler = Crawler::from_config(config).context("failed to set up crawler")?;
    let mut handle = CrawlTask::spawn(Arc::new(crawler), request);
    let cancel = handle.cancel_flag();

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(event) => println!("{}", event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                if cancel.is_cancelled() {
                    tracing::warn!("Second interrupt received, exiting without waiting for the crawl");
                    std::process::exit(130);
                }
                tracing::info!("Interrupt received, stopping after the current page (Ctrl-C again to quit)");
                cancel.cancel();
            }
        }
    }

    let outcome = handle.join().await.context("crawl failed")?;
    println!(
        "{} files written to {}",
        outcome.files_written, config.output.directory
    );
    Ok(())
}

/// Lists saved files and their sentiment weights
async fn handle_files(config: &Config) -> Result<()> {
    let entries = corpus(config)
        .entries()
        .await
        .with_context(|| format!("failed to list {}", config.output.directory))?;

    if entries.is_empty() {
        println!("No saved files in {}", config.output.directory);
        return Ok(());
    }

    for entry in entries {
        let sentiment = entry
            .sentiment
            .map(|score| score.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!("{:>6}  {}", sentiment, entry.name);
    }
    Ok(())
}

/// Prints the saved files that mention a keyword
async fn handle_search(config: &Config, keyword: &str) -> Result<()> {
    let matches = corpus(config)
        .search(keyword)
        .await
        .with_context(|| format!("search for '{}' failed", keyword))?;

    if matches.is_empty() {
        println!("No matches found.");
    }
    for name in matches {
        println!("{}: FOUND", name);
    }
    Ok(())
}

/// Prints the analysis report for one saved file
async fn handle_analyze(config: &Config, file: &Path) -> Result<()> {
    let analyzer = Analyzer::from_config(config).context("failed to set up analyzer")?;
    let report = analyzer
        .analyze_file(file)
        .await
        .with_context(|| format!("failed to analyze {}", file.display()))?;
    println!("{}", report);
    Ok(())
}
