//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod search;
mod serve;
mod summarize;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::models::ProviderKind;
use crate::services::DEFAULT_MAX_SENTENCES;

#[derive(Parser)]
#[command(name = "finnews")]
#[command(about = "Financial news aggregator with summaries and sentiment")]
#[command(version)]
pub struct Cli {
    /// TOML config file (environment variables still take precedence)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind: PORT, HOST, or HOST:PORT
        #[arg(default_value = "127.0.0.1:8000")]
        bind: String,
    },

    /// Summarize text from a file or stdin and score its sentiment
    Summarize {
        /// File to read (stdin when omitted)
        file: Option<PathBuf>,
        /// Maximum sentences in the summary
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_SENTENCES)]
        sentences: usize,
    },

    /// Run one search and print the response as JSON
    Search {
        /// Search query, e.g. "AAPL, MSFT" or "fed rate cut"
        query: String,
        /// Upstream provider
        #[arg(short, long, value_enum, default_value_t = ProviderKind::Rss)]
        provider: ProviderKind,
        /// Maximum number of articles
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Maximum sentences per summary
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_SENTENCES)]
        sentences: usize,
    },
}

/// Parse arguments, load settings and run the chosen command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Summarize { file, sentences } => {
            summarize::cmd_summarize(file.as_deref(), sentences).await
        }
        Commands::Search {
            query,
            provider,
            limit,
            sentences,
        } => search::cmd_search(&settings, &query, provider, limit, sentences).await,
    }
}
