//! Error types for the laws RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for laws RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Laws RAG errors
#[derive(Debug, Error)]
pub enum Error {
    /// Source document could not be opened or decoded (startup-fatal)
    #[error("Document '{path}' is unreadable: {reason}")]
    DocumentUnreadable { path: String, reason: String },

    /// Index used before `connect` was called
    #[error("Index is not connected; call connect() before load()")]
    NotConnected,

    /// Embedding or generation backend failed
    #[error("{backend} backend failed: {message}")]
    BackendFailure { backend: String, message: String },

    /// Blank question
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Index not built yet
    #[error("Service not initialized")]
    ServiceNotReady,

    /// Catch-all wrapper for failures while answering a query
    #[error("Query processing failed: {0}")]
    QueryProcessingFailed(String),

    /// Query string or body that could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Result count outside the accepted range
    #[error("Result count must be at least 1 (got {0})")]
    InvalidTopK(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a document unreadable error
    pub fn document_unreadable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DocumentUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a backend failure error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Stable, snake_case error kind exposed to clients
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DocumentUnreadable { .. } => "document_unreadable",
            Error::NotConnected => "not_connected",
            Error::BackendFailure { .. } => "backend_failure",
            Error::EmptyQuery => "empty_query",
            Error::ServiceNotReady => "service_not_ready",
            Error::QueryProcessingFailed(_) => "query_processing_failed",
            Error::InvalidRequest(_) => "invalid_request",
            Error::InvalidTopK(_) => "invalid_top_k",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
        }
    }

    /// HTTP status for this error at the service boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyQuery | Error::InvalidRequest(_) | Error::InvalidTopK(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            Error::BackendFailure { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::DocumentUnreadable { .. }
            | Error::NotConnected
            | Error::QueryProcessingFailed(_)
            | Error::Config(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let body = Json(json!({
            "detail": message,
            "error": {
                "type": self.kind(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::EmptyQuery.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::ServiceNotReady.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            Error::QueryProcessingFailed("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(Error::InvalidTopK(0).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidRequest("bad k".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::InvalidRequest("bad k".into()).kind(), "invalid_request");
    }

    #[test]
    fn test_processing_failure_keeps_cause() {
        let err = Error::QueryProcessingFailed(Error::backend("groq", "rate limited").to_string());
        assert_eq!(err.kind(), "query_processing_failed");
        assert!(err.to_string().contains("groq backend failed: rate limited"));
    }
}
