use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::llm::answer::AnswerGenerator;
use crate::llm::post_json;

/// How long the startup probe waits for the generator endpoint.
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Completes a prompt with a language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Non-streaming completions from Ollama or an OpenAI-compatible endpoint.
pub struct HttpGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpGenerator {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    fn model_name(&self) -> &str {
        &self.config.chat_model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.config.provider.as_str() {
            "ollama" => call_ollama(&self.client, &self.config, prompt).await,
            "openai" => call_openai(&self.client, &self.config, prompt).await,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
    }
}

/// Decide once, at startup, whether answers come from the generator or from
/// the local fallback. An unreachable endpoint is logged and degrades the
/// service; it never aborts startup.
pub async fn resolve_generator(client: &reqwest::Client, config: &LlmConfig) -> AnswerGenerator {
    if !config.generation_enabled {
        tracing::info!("Answer generation disabled, using fallback responses");
        return AnswerGenerator::unavailable(&config.chat_model);
    }

    match probe(client, config).await {
        Ok(()) => {
            tracing::info!(
                "Answer generator ready: {} ({})",
                config.chat_model,
                config.base_url
            );
            AnswerGenerator::Available(Arc::new(HttpGenerator::new(client.clone(), config.clone())))
        }
        Err(e) => {
            tracing::warn!("Answer generator unavailable, using fallback responses: {e:#}");
            AnswerGenerator::unavailable(&config.chat_model)
        }
    }
}

async fn probe(client: &reqwest::Client, config: &LlmConfig) -> Result<()> {
    let url = match config.provider.as_str() {
        "ollama" => format!("{}/api/tags", config.base_url),
        "openai" => format!("{}/v1/models", config.base_url),
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    };

    let mut req = client
        .get(&url)
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS));
    if let Some(key) = &config.api_key {
        req = req.bearer_auth(key);
    }

    let resp = req
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;
    if !resp.status().is_success() {
        anyhow::bail!("{url} returned {}", resp.status());
    }
    Ok(())
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

async fn call_ollama(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    let url = format!("{}/api/generate", config.base_url);

    let req = OllamaGenerateRequest {
        model: config.chat_model.clone(),
        prompt: prompt.to_string(),
        stream: false,
        options: OllamaOptions {
            temperature: config.temperature,
        },
    };

    let body: OllamaGenerateResponse =
        post_json(client.post(&url), &req, "Ollama generate API").await?;
    Ok(body.response)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

async fn call_openai(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let mut request = client.post(&url);
    if let Some(key) = &config.api_key {
        request = request.bearer_auth(key);
    }

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages: vec![OpenAiMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: config.temperature,
    };

    let body: OpenAiChatResponse = post_json(request, &req, "OpenAI chat API").await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI chat API returned no content")
}
