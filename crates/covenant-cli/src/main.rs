//! Covenant CLI - run the obligation extraction pipeline from the command line.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use covenant_domain::CompletionProvider;
use covenant_extractor::{ExtractorConfig, ExtractorError, ObligationExtractor};
use covenant_llm::{AnthropicProvider, MockProvider};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "covenant", about = "Extract contractual obligations from plain-text documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Replay a canned response from this file instead of calling the API
    #[arg(long, global = true)]
    mock: Option<PathBuf>,

    /// API key for the completion service
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract all obligations from a document
    Extract {
        /// Plain-text contract file
        file: PathBuf,

        /// Document identifier recorded on each obligation
        #[arg(long, default_value = "cli")]
        document_id: String,
    },

    /// Analyze a single clause in isolation
    Analyze {
        /// Plain-text clause file
        file: PathBuf,
    },

    /// Check that the completion service is reachable
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ExtractorConfig::from_toml(&raw)?
        }
        None => ExtractorConfig::default(),
    };
    config.validate()?;

    match &cli.mock {
        Some(response_file) => {
            let response = std::fs::read_to_string(response_file)
                .with_context(|| format!("reading mock response {}", response_file.display()))?;
            let provider = MockProvider::new(response);
            dispatch(cli.command, provider, config).await
        }
        None => {
            let Some(api_key) = cli.api_key else {
                bail!("no API key: set ANTHROPIC_API_KEY or pass --mock for offline runs");
            };
            let provider = AnthropicProvider::new(api_key, config.model.clone());
            dispatch(cli.command, provider, config).await
        }
    }
}

async fn dispatch<P>(command: Command, provider: P, config: ExtractorConfig) -> anyhow::Result<()>
where
    P: CompletionProvider + Send + Sync + 'static,
{
    match command {
        Command::Status => {
            let result = tokio::task::spawn_blocking(move || provider.check_status()).await?;
            match result {
                Ok(()) => {
                    println!("completion service reachable");
                    Ok(())
                }
                Err(e) => bail!("completion service check failed: {e}"),
            }
        }
        Command::Extract { file, document_id } => {
            let extractor = ObligationExtractor::new(provider, config);
            let text = read_document(&file)?;
            let report = match extractor.extract(&text, &document_id).await {
                Ok(report) => report,
                Err(ExtractorError::RateLimited { retry_after_secs }) => {
                    bail!("rate limited by the completion service; retry in {retry_after_secs}s")
                }
                Err(e) => return Err(e.into()),
            };

            println!("{}", serde_json::to_string_pretty(&report.obligations)?);
            eprintln!(
                "{} obligations from {} chunks ({} skipped) in {}ms",
                report.obligations.len(),
                report.metadata.chunk_count,
                report.metadata.chunks_skipped,
                report.metadata.processing_time_ms
            );
            Ok(())
        }
        Command::Analyze { file } => {
            let extractor = ObligationExtractor::new(provider, config);
            let text = read_document(&file)?;
            let analysis = match extractor.analyze_clause(&text).await {
                Ok(analysis) => analysis,
                Err(ExtractorError::RateLimited { retry_after_secs }) => {
                    bail!("rate limited by the completion service; retry in {retry_after_secs}s")
                }
                Err(e) => return Err(e.into()),
            };

            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading document {}", path.display()))
}
