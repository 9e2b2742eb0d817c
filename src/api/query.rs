use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::extract::ApiJson;
use crate::api::{api_error, ApiError};
use crate::models::{QueryAnswer, QueryRequest};
use crate::state::AppState;

/// POST /query - Retrieve the nearest chunks and answer from them.
///
/// Only validation is reported as an HTTP error; retrieval and generation
/// failures come back as a normal answer explaining what went wrong.
pub async fn query(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<QueryRequest>,
) -> Result<Json<QueryAnswer>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Query cannot be empty"));
    }

    let top_k = req.top_k.unwrap_or(state.config.default_top_k);
    if top_k == 0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "top_k must be greater than zero",
        ));
    }

    Ok(Json(state.rag.answer(&req.query, top_k).await))
}
