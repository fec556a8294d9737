// Vocab Quiz - German vocabulary trainer backend
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vocab_quiz::config::load_config;
use vocab_quiz::corpus::load_corpus;
use vocab_quiz::server::{AppState, QuizServer};

#[derive(Parser, Debug)]
#[command(name = "vocab-quiz")]
#[command(about = "Verb, noun and sentence quizzes for German learners", version)]
struct Cli {
    /// Path to config file (default: ~/.vocab-quiz/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address, overrides [server] bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Load the workbook and print what it contains
    Check,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
                config.validate().context("Invalid --bind address")?;
            }

            let corpus = load_corpus(&config.data.workbook_path);
            if corpus.verbs.is_empty() {
                tracing::warn!(
                    "No verbs loaded from {}; the verb quiz will be empty",
                    config.data.workbook_path.display()
                );
            }

            let state = AppState::from_config(&config, corpus)?;
            QuizServer::new(&config, state).serve().await
        }
        Command::Check => {
            let corpus = load_corpus(&config.data.workbook_path);
            let stats = corpus.stats();
            println!("Workbook: {}", config.data.workbook_path.display());
            println!("  verbs:     {}", stats.verbs);
            println!("  sentences: {}", stats.sentences);
            println!("  nouns:     {}", stats.nouns);
            Ok(())
        }
    }
}
