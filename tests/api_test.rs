//! HTTP surface tests against a live server on an ephemeral port.

mod common;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use common::{service, service_with, BrokenIndex, FixedEmbedder, UnreachableEmbedder};
use rag_server::api;
use rag_server::config::Config;
use rag_server::rag::RagService;
use rag_server::search::vector::LocalVectorStore;
use rag_server::state::AppState;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let rag = service(dir.path(), FixedEmbedder::default());
        Self::start_with(dir, rag).await
    }

    async fn start_with(dir: TempDir, rag: RagService) -> Self {
        let config = Config {
            storage_path: dir.path().to_path_buf(),
            ..Config::default()
        };
        let state = AppState::from_parts(config, rag);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api::router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn total_documents(&self) -> u64 {
        let stats: Value = self
            .client
            .get(self.url("/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        stats["vector_store"]["total_documents"].as_u64().unwrap()
    }
}

#[tokio::test]
async fn test_root_reports_liveness() {
    let server = TestServer::start().await;
    let resp = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_is_ok_when_index_is_reachable() {
    let server = TestServer::start().await;
    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "All services are operational");
}

#[tokio::test]
async fn test_add_document_and_query() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/documents"))
        .json(&json!({
            "content": "Rust guarantees memory safety without a garbage collector.",
            "metadata": {"topic": "rust"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["chunks_created"], 1);
    assert_eq!(body["document_ids"].as_array().unwrap().len(), 1);

    let resp = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": "memory safety"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["query"], "memory safety");
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["metadata"]["topic"], "rust");
    assert_eq!(sources[0]["metadata"]["chunk_index"], 0);
    assert!(sources[0]["score"].is_number());
}

#[tokio::test]
async fn test_batch_ingest_counts_chunks() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/documents/batch"))
        .json(&json!([
            {"content": "first document"},
            {"content": "second document", "metadata": {"n": 2}}
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Added 2 documents successfully");
    assert_eq!(body["total_chunks_created"], 2);
    assert_eq!(server.total_documents().await, 2);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/documents/batch"))
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "No documents provided");
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_top_k_is_rejected() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": "anything", "top_k": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_on_empty_collection() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": "where are the docs?", "top_k": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["sources"].as_array().unwrap().is_empty());
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("no relevant documents"));
    assert!(answer.contains("where are the docs?"));
}

#[tokio::test]
async fn test_upload_rejects_non_text_content() {
    let server = TestServer::start().await;
    let part = Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("diagram.png")
        .mime_str("image/png")
        .unwrap();
    let resp = server
        .client
        .post(server.url("/documents/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Only text files are supported");
    assert_eq!(server.total_documents().await, 0);
}

#[tokio::test]
async fn test_upload_text_file_records_file_metadata() {
    let server = TestServer::start().await;
    let contents = "Plain text notes about vector search.";
    let part = Part::bytes(contents.as_bytes().to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let resp = server
        .client
        .post(server.url("/documents/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["chunks_created"], 1);

    let body: Value = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": "vector search", "top_k": 1}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let metadata = &body["sources"][0]["metadata"];
    assert_eq!(metadata["filename"], "notes.txt");
    assert_eq!(metadata["content_type"], "text/plain");
    assert_eq!(metadata["size"], contents.len());
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/documents/upload"))
        .multipart(Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_clears_collection() {
    let server = TestServer::start().await;
    server
        .client
        .post(server.url("/documents"))
        .json(&json!({"content": "to be removed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(server.total_documents().await, 1);

    let resp = server.client.delete(server.url("/documents")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Knowledge base cleared successfully");
    assert_eq!(server.total_documents().await, 0);
}

#[tokio::test]
async fn test_stats_reports_degraded_generator() {
    let server = TestServer::start().await;
    let body: Value = server
        .client
        .get(server.url("/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["vector_store"]["collection_name"], "documents");
    assert_eq!(body["llm_service"]["status"], "degraded");
}

#[tokio::test]
async fn test_mistyped_json_gets_error_body() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        resp.headers()[reqwest::header::CONTENT_TYPE],
        "application/json"
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("deserialize"));
}

#[tokio::test]
async fn test_body_without_json_content_type_gets_error_body() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/documents"))
        .body("just some text")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_upload_without_multipart_body_gets_error_body() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(server.url("/documents/upload"))
        .json(&json!({"content": "not a form"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_storage_failure_on_ingest_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let rag = service_with(FixedEmbedder::default(), BrokenIndex::default());
    let server = TestServer::start_with(dir, rag).await;

    let resp = server
        .client
        .post(server.url("/documents"))
        .json(&json!({"content": "cannot be stored"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Failed to add document"));
    assert!(message.contains("disk full"));
}

#[tokio::test]
async fn test_embedding_failure_in_batch_is_500_and_stores_nothing_after_it() {
    let dir = tempfile::tempdir().unwrap();
    let index = LocalVectorStore::open_or_create(dir.path(), "documents").unwrap();
    let rag = service_with(UnreachableEmbedder, index);
    let server = TestServer::start_with(dir, rag).await;

    let resp = server
        .client
        .post(server.url("/documents/batch"))
        .json(&json!([{"content": "one"}, {"content": "two"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("connection refused"));
    assert_eq!(server.total_documents().await, 0);
}

#[tokio::test]
async fn test_clear_failure_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let rag = service_with(FixedEmbedder::default(), BrokenIndex::default());
    let server = TestServer::start_with(dir, rag).await;

    let resp = server.client.delete(server.url("/documents")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to clear knowledge base"));
}

#[tokio::test]
async fn test_unreachable_index_fails_health_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let rag = service_with(FixedEmbedder::default(), BrokenIndex::default());
    let server = TestServer::start_with(dir, rag).await;

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("index offline"));

    let resp = server.client.get(server.url("/stats")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_query_failure_is_answered_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let rag = service_with(FixedEmbedder::default(), BrokenIndex::default());
    let server = TestServer::start_with(dir, rag).await;

    let resp = server
        .client
        .post(server.url("/query"))
        .json(&json!({"query": "anything"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["sources"].as_array().unwrap().is_empty());
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .starts_with("Sorry, I encountered an error while processing your query"));
}
