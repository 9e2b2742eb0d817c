//! Axum HTTP surface.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/` | [`system::root`] |
//! | `GET` | `/health` | [`system::health`] |
//! | `GET` | `/stats` | [`system::stats`] |
//! | `POST` | `/documents` | [`documents::add_document`] |
//! | `POST` | `/documents/batch` | [`documents::add_documents_batch`] |
//! | `POST` | `/documents/upload` | [`documents::upload_document`] |
//! | `DELETE` | `/documents` | [`documents::clear_documents`] |
//! | `POST` | `/query` | [`query::query`] |

pub mod documents;
pub mod extract;
pub mod query;
pub mod system;

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::StatusResponse;
use crate::state::AppState;

/// Error half of every handler result: a status code and `{status: "error", message}`.
pub type ApiError = (StatusCode, Json<StatusResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(StatusResponse::error(message)))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/stats", get(system::stats))
        .route("/documents", post(documents::add_document))
        .route("/documents", delete(documents::clear_documents))
        .route("/documents/batch", post(documents::add_documents_batch))
        .route("/documents/upload", post(documents::upload_document))
        .route("/query", post(query::query))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
