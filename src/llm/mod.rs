//! Model-backed collaborators: embeddings and answer generation.

pub mod answer;
pub mod embeddings;
pub mod generate;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// POST `body` as JSON and decode the reply, turning non-2xx statuses into errors
/// that carry the response text.
pub(crate) async fn post_json<Req: Serialize + ?Sized, Resp: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    body: &Req,
    api: &str,
) -> Result<Resp> {
    let resp = request
        .json(body)
        .send()
        .await
        .with_context(|| format!("Failed to call {api}"))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("{api} returned {status}: {text}");
    }

    resp.json()
        .await
        .with_context(|| format!("Failed to parse {api} response"))
}
