//! précis CLI: extractive-then-abstractive document summarizer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use precis::document;
use precis::embed::{Embedder, HashedEmbedder, OllamaConfig, OllamaEmbedder};
use precis::refine::{CompletionConfig, OpenAiCompatClient};
use precis::summarizer::{Summarizer, SummarizerConfig};

#[derive(Parser)]
#[command(name = "precis", version, about = "Extractive-then-abstractive text summarizer")]
struct Cli {
    /// Seed for the clustering RNG (fixed for reproducible runs).
    #[arg(long, global = true, default_value = "42")]
    seed: u64,

    /// Upper bound on the cluster-count search.
    #[arg(long, global = true, default_value = "9")]
    max_clusters: usize,

    /// Maximum sentences kept per cluster.
    #[arg(long, global = true, default_value = "10")]
    top_k: usize,

    /// Use the offline hashed embedder instead of an embedding server.
    #[arg(long, global = true)]
    offline: bool,

    /// Base URL of the Ollama embedding API.
    #[arg(long, global = true, default_value = "http://localhost:11434")]
    embed_url: String,

    /// Embedding model name.
    #[arg(long, global = true, default_value = "nomic-embed-text")]
    embed_model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print the refined `{title, summary}` JSON.
    Summarize {
        /// Document to summarize (.txt, .md, or .pdf). Reads stdin if omitted.
        file: Option<PathBuf>,

        /// Base URL of an OpenAI-compatible chat-completion API.
        #[arg(long, default_value = "http://localhost:11434/v1")]
        llm_url: String,

        /// Completion model name.
        #[arg(long, default_value = "llama3.2")]
        llm_model: String,

        /// Environment variable holding the API bearer token, if the
        /// endpoint requires one.
        #[arg(long, default_value = "PRECIS_API_KEY")]
        api_key_env: String,
    },

    /// Print the extractive draft only (no language-model call).
    Draft {
        /// Document to summarize (.txt, .md, or .pdf). Reads stdin if omitted.
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let embedder: Arc<dyn Embedder> = if cli.offline {
        Arc::new(HashedEmbedder::default())
    } else {
        Arc::new(OllamaEmbedder::new(OllamaConfig {
            base_url: cli.embed_url.clone(),
            model: cli.embed_model.clone(),
            ..Default::default()
        }))
    };

    let mut config = SummarizerConfig::default();
    config.cluster.seed = cli.seed;
    config.cluster.max_clusters = cli.max_clusters;
    config.rank.top_k = cli.top_k;
    let summarizer = Summarizer::new(embedder, config);

    match cli.command {
        Commands::Summarize {
            file,
            llm_url,
            llm_model,
            api_key_env,
        } => {
            let text = read_document(file.as_deref())?;
            let client = OpenAiCompatClient::new(CompletionConfig {
                base_url: llm_url,
                model: llm_model,
                api_key: std::env::var(&api_key_env).ok(),
                ..Default::default()
            });
            let summary = summarizer.summarize(&text, &client)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).into_diagnostic()?
            );
        }

        Commands::Draft { file } => {
            let text = read_document(file.as_deref())?;
            let draft = summarizer.extractive_draft(&text)?;
            println!("{draft}");
        }
    }

    Ok(())
}

/// Read the input document from a file (extension-dispatched extraction)
/// or, with no path, from stdin as plain text.
fn read_document(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => Ok(document::extract_text(path)?),
        None => {
            use std::io::Read;
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()?;
            Ok(text)
        }
    }
}
