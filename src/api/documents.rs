use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};

use crate::api::extract::{ApiJson, ApiMultipart};
use crate::api::{api_error, ApiError};
use crate::models::{AddDocumentResponse, BatchAddResponse, DocumentUpload, StatusResponse};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// POST /documents - Chunk, embed and store a single document
pub async fn add_document(
    State(state): State<AppState>,
    ApiJson(doc): ApiJson<DocumentUpload>,
) -> Result<Json<AddDocumentResponse>, ApiError> {
    let metadata = doc.metadata.unwrap_or_default();
    ingest_one(&state, &doc.content, &metadata).await.map(Json)
}

/// POST /documents/batch - Ingest several documents; ids are concatenated in order
pub async fn add_documents_batch(
    State(state): State<AppState>,
    ApiJson(docs): ApiJson<Vec<DocumentUpload>>,
) -> Result<Json<BatchAddResponse>, ApiError> {
    if docs.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No documents provided"));
    }

    let ids = state.rag.ingest_batch(&docs).await.map_err(|e| {
        tracing::error!("Failed to add documents batch: {e:#}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to add documents: {e:#}"),
        )
    })?;

    Ok(Json(BatchAddResponse {
        status: "success".to_string(),
        message: format!("Added {} documents successfully", docs.len()),
        total_chunks_created: ids.len(),
        document_ids: ids,
    }))
}

/// POST /documents/upload - Ingest a `text/*` file sent as multipart field `file`
pub async fn upload_document(
    State(state): State<AppState>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<Json<AddDocumentResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("text/") {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Only text files are supported",
            ));
        }
        let filename = field.file_name().map(str::to_string);

        let bytes = field.bytes().await.map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}"))
        })?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Uploaded file is not valid UTF-8"))?;

        let mut metadata = Map::new();
        metadata.insert("filename".into(), filename.map_or(Value::Null, Value::from));
        metadata.insert("content_type".into(), Value::from(content_type));
        metadata.insert("size".into(), Value::from(bytes.len()));

        return ingest_one(&state, text, &metadata).await.map(Json);
    }

    Err(api_error(StatusCode::BAD_REQUEST, "No file provided"))
}

/// DELETE /documents - Drop every stored chunk
pub async fn clear_documents(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.rag.clear().map_err(|e| {
        tracing::error!("Failed to clear knowledge base: {e:#}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to clear knowledge base: {e:#}"),
        )
    })?;
    Ok(Json(StatusResponse::success(
        "Knowledge base cleared successfully",
    )))
}

async fn ingest_one(
    state: &AppState,
    content: &str,
    metadata: &Map<String, Value>,
) -> Result<AddDocumentResponse, ApiError> {
    let ids = state.rag.ingest(content, metadata).await.map_err(|e| {
        tracing::error!("Failed to add document: {e:#}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to add document: {e:#}"),
        )
    })?;

    Ok(AddDocumentResponse {
        status: "success".to_string(),
        message: "Document added successfully".to_string(),
        chunks_created: ids.len(),
        document_ids: ids,
    })
}
