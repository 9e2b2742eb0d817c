//! Turning retrieved chunks into an answer.
//!
//! The generator capability is resolved once at startup (see
//! [`crate::llm::generate::resolve_generator`]). When it is unavailable, or a
//! generation call fails, an extractive answer is built from the best hit.

use std::sync::Arc;

use crate::llm::generate::TextGenerator;
use crate::models::{GeneratorHealth, RetrievedResult};

/// Characters of the best hit quoted in a fallback answer.
const FALLBACK_SNIPPET_CHARS: usize = 500;

const NO_CONTEXT: &str = "No relevant context found.";

/// Answer source, fixed for the lifetime of the process.
#[derive(Clone)]
pub enum AnswerGenerator {
    Available(Arc<dyn TextGenerator>),
    Unavailable { model: String },
}

impl AnswerGenerator {
    pub fn unavailable(model: &str) -> Self {
        Self::Unavailable {
            model: model.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn model_name(&self) -> &str {
        match self {
            Self::Available(generator) => generator.model_name(),
            Self::Unavailable { model } => model,
        }
    }

    /// Answer `query` from `results` (ranked best first). Never fails.
    pub async fn answer(&self, query: &str, results: &[RetrievedResult]) -> String {
        match self {
            Self::Available(generator) => {
                let prompt = build_prompt(query, &build_context(results));
                match generator.generate(&prompt).await {
                    Ok(text) => text.trim().to_string(),
                    Err(e) => {
                        tracing::warn!("Answer generation failed, using fallback: {e:#}");
                        fallback_answer(query, results, generator.model_name())
                    }
                }
            }
            Self::Unavailable { model } => fallback_answer(query, results, model),
        }
    }

    /// Probe the generator with a trivial prompt.
    pub async fn health(&self) -> GeneratorHealth {
        match self {
            Self::Available(generator) => match generator.generate("Hello").await {
                Ok(text) => GeneratorHealth::Healthy {
                    model: generator.model_name().to_string(),
                    test_response_length: text.chars().count(),
                },
                Err(e) => GeneratorHealth::Unhealthy {
                    error: format!("{e:#}"),
                },
            },
            Self::Unavailable { .. } => GeneratorHealth::Degraded {
                model: "fallback".to_string(),
                message: "LLM not available, using fallback responses".to_string(),
            },
        }
    }
}

/// Ranked context blocks, or a fixed marker when nothing was retrieved.
pub fn build_context(results: &[RetrievedResult]) -> String {
    if results.is_empty() {
        return NO_CONTEXT.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Document {} (relevance: {:.2}):\n{}", i + 1, r.score, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are a helpful AI assistant. Use the following context to answer the user's question. \
         If the context doesn't contain relevant information, say so clearly.\n\n\
         Context:\n{context}\n\n\
         Question: {query}\n\n\
         Answer: Provide a comprehensive answer based on the context above. \
         If the context is not sufficient to answer the question, explain what information is missing."
    )
}

/// Extractive answer quoting the first 500 characters of the best hit.
pub fn fallback_answer(query: &str, results: &[RetrievedResult], model: &str) -> String {
    let Some(best) = results.first() else {
        return format!(
            "I found no relevant documents to answer your question: '{query}'. \
             Please try rephrasing your question or add more documents to the knowledge base."
        );
    };

    let snippet: String = best.text.chars().take(FALLBACK_SNIPPET_CHARS).collect();
    let ellipsis = if best.text.chars().count() > FALLBACK_SNIPPET_CHARS {
        "..."
    } else {
        ""
    };

    format!(
        "Based on the most relevant document (similarity: {:.2}), here's what I found:\n\n\
         {snippet}{ellipsis}\n\n\
         Note: This is a simplified response. For better answers, please ensure \
         the language model service is running with the '{model}' model.",
        best.score
    )
}
