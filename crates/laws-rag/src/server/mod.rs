//! HTTP server for the laws RAG service

pub mod routes;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::service::QueryService;

/// Laws RAG HTTP server
pub struct RagServer {
    config: RagConfig,
    service: QueryService,
}

impl RagServer {
    /// Create a server around a (possibly not yet ready) query service
    pub fn new(config: RagConfig, service: QueryService) -> Self {
        Self { config, service }
    }

    /// Start serving; returns only on bind or serve failure
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.service, self.config.server.enable_cors);

        tracing::info!("Starting laws RAG server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        self.config.address()
    }
}

/// Build the router with all routes and middleware
pub fn build_router(service: QueryService, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health_check))
        .route("/ready", get(routes::readiness))
        .route("/query", get(routes::query::query_get).post(routes::query::query_post))
        .with_state(service)
        // applied bottom to top
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
