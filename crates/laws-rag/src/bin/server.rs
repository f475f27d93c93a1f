//! Laws RAG server binary
//!
//! Run with: cargo run -p laws-rag --bin laws-rag-server

use laws_rag::{config::RagConfig, server::RagServer, service::build_index, QueryService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laws_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                  Westeros Laws RAG API                    ║
║      Questions on the Laws of the Seven Kingdoms          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Document: {}", config.document.path.display());
    tracing::info!("  - Embedding model: {} ({:?})", config.embeddings.model, config.embeddings.backend);
    tracing::info!("  - LLM model: {} ({:?})", config.llm.model, config.llm.backend);
    tracing::info!("  - Default k: {}", config.retrieval.top_k);

    let service = QueryService::new(config.retrieval.clone());
    let server = RagServer::new(config.clone(), service.clone());

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  Ready: http://{}/ready", server.address());
    println!("\nEndpoints:");
    println!("  GET  /query?q=...&k=N  - Ask a question");
    println!("  POST /query            - Ask a question (JSON body)");
    println!("\nPress Ctrl+C to stop\n");

    let startup = async {
        let index = build_index(&config).await.map_err(|e| {
            tracing::error!("Startup failed: {}", e);
            e
        })?;
        service.install(index).await;
        Ok::<_, laws_rag::Error>(())
    };

    tokio::try_join!(server.start(), startup)?;

    Ok(())
}
