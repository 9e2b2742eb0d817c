use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::{api_error, ApiError};
use crate::models::{StatusResponse, SystemStats};
use crate::state::AppState;

/// GET / - Liveness
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse::new("healthy", "RAG System API is running"))
}

/// GET /health - 503 unless collection stats and generator health can be collected
pub async fn health(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    match state.rag.stats().await {
        Ok(_) => Ok(Json(StatusResponse::new(
            "healthy",
            "All services are operational",
        ))),
        Err(e) => {
            tracing::error!("Health check failed: {e:#}");
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, format!("{e:#}")))
        }
    }
}

/// GET /stats - Collection size and answer generator health
pub async fn stats(State(state): State<AppState>) -> Result<Json<SystemStats>, ApiError> {
    state.rag.stats().await.map(Json).map_err(|e| {
        tracing::error!("Failed to get stats: {e:#}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
    })
}
