//! Query endpoints with citations

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::service::QueryService;
use crate::types::{QueryRequest, QueryResult};

/// GET /query?q=...&k=...
pub async fn query_get(
    State(service): State<QueryService>,
    request: std::result::Result<Query<QueryRequest>, QueryRejection>,
) -> Result<Json<QueryResult>> {
    let Query(request) = request.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    answer(&service, request).await
}

/// POST /query with a JSON body
pub async fn query_post(
    State(service): State<QueryService>,
    request: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResult>> {
    let Json(request) = request.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    answer(&service, request).await
}

async fn answer(service: &QueryService, request: QueryRequest) -> Result<Json<QueryResult>> {
    let start = Instant::now();
    let result = service.handle_query(&request.q, request.k).await?;

    tracing::info!(
        "Answered with {} citations in {}ms",
        result.citations.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(result))
}
