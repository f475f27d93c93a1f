//! Command-line access to the laws index
//!
//! Run with: cargo run -p laws-rag --features cli --bin laws-rag -- ask "What is guest right?"

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use laws_rag::{
    config::RagConfig,
    service::{build_index, load_sections},
    QueryService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "laws-rag",
    version,
    about = "Inspect and query the Laws of the Seven Kingdoms"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the document's sections as JSON
    Sections {
        /// Document to split (defaults to DOCUMENT_PATH or the configured path)
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Build the index and answer one question
    Ask {
        /// The question
        question: String,

        /// Number of sections to retrieve
        #[arg(short, long)]
        k: Option<usize>,

        /// Document to index (defaults to DOCUMENT_PATH or the configured path)
        #[arg(long)]
        document: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laws_rag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = RagConfig::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Sections { document } => {
            if let Some(path) = document {
                config.document.path = path;
            }
            let sections = load_sections(&config.document.path).await?;
            println!("{}", serde_json::to_string_pretty(&sections)?);
        }
        Command::Ask {
            question,
            k,
            document,
        } => {
            if let Some(path) = document {
                config.document.path = path;
            }
            let index = build_index(&config)
                .await
                .with_context(|| format!("failed to index {}", config.document.path.display()))?;

            let service = QueryService::new(config.retrieval.clone());
            service.install(index).await;

            let result = service.handle_query(&question, k).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
