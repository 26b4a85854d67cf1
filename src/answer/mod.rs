//! Answer Client: forwards a question to an LLM backend and returns a
//! structured [`Answer`].
//!
//! Every backend is asked for the same JSON shape and the completion text is
//! parsed by [`crate::model::parse_answer`].

pub mod anthropic;
pub mod ollama;
pub mod openai;

use crate::config::{BackendConfig, Config};
use crate::error::RequestError;
use crate::model::{parse_answer, Answer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

/// Instructions shared by all backends.
pub const SYSTEM_PROMPT: &str = r#"You are Maggie, a warm and friendly guide who answers Bible questions.
Answer from the perspective of the New Testament covenant of grace and God's love,
as taught by Tim Keller, Andrew Farley and others.

Respond with a single JSON object and nothing else:
{
  "text": "<your answer in plain prose, no Markdown>",
  "references": [
    {
      "type": "verse" | "book" | "commentary" | "article",
      "title": "<for verses, a reference such as John 3:16 or Romans 8:1-4>",
      "link": "<https URL where the reference can be read>",
      "description": "<optional one-line description>"
    }
  ]
}

Include the key Bible verses you relied on as "verse" references, and
recommend books, commentaries or articles where helpful."#;

/// Anything that can turn a question into an [`Answer`].
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn ask(&self, question: &str) -> Result<Answer, RequestError>;
}

/// Enum-based backend for the answer providers.
pub enum Backend {
    OpenAI(openai::OpenAIBackend),
    Anthropic(anthropic::AnthropicBackend),
    Ollama(ollama::OllamaBackend),
}

impl Backend {
    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::OpenAI(_) => "openai",
            Backend::Anthropic(_) => "anthropic",
            Backend::Ollama(_) => "ollama",
        }
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        match self {
            Backend::OpenAI(b) => &b.model,
            Backend::Anthropic(b) => &b.model,
            Backend::Ollama(b) => &b.model,
        }
    }

    /// Raw completion text for `question`.
    async fn complete(&self, question: &str) -> Result<String, RequestError> {
        match self {
            Backend::OpenAI(b) => b.complete(SYSTEM_PROMPT, question).await,
            Backend::Anthropic(b) => b.complete(SYSTEM_PROMPT, question).await,
            Backend::Ollama(b) => b.complete(SYSTEM_PROMPT, question).await,
        }
    }
}

#[async_trait]
impl AnswerSource for Backend {
    async fn ask(&self, question: &str) -> Result<Answer, RequestError> {
        if question.trim().is_empty() {
            return Err(RequestError::EmptyQuestion);
        }

        debug!(backend = self.name(), model = self.model(), "Sending question");
        let raw = self.complete(question).await?;
        let answer = parse_answer(&raw).inspect_err(|e| {
            warn!(backend = self.name(), error = %e, "Unusable completion");
        })?;
        debug!(references = answer.references.len(), "Answer received");
        Ok(answer)
    }
}

/// Create a backend from configuration.
pub fn create_backend(config: &Config) -> Result<Backend> {
    let client = http_client(config.network.timeout())?;
    let backend = match &config.backend {
        BackendConfig::OpenAI {
            model,
            api_key,
            base_url,
        } => Backend::OpenAI(openai::OpenAIBackend::new(
            client,
            model.clone(),
            api_key.clone(),
            base_url.clone(),
        )),
        BackendConfig::Anthropic {
            model,
            api_key,
            base_url,
        } => Backend::Anthropic(anthropic::AnthropicBackend::new(
            client,
            model.clone(),
            api_key.clone(),
            base_url.clone(),
        )),
        BackendConfig::Ollama { model, host } => {
            Backend::Ollama(ollama::OllamaBackend::new(client, model.clone(), host.clone()))
        }
    };
    Ok(backend)
}

/// Build the shared HTTP client.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Turn a non-success response into [`RequestError::Status`], pulling the
/// provider's `error.message` out of the body when there is one.
async fn status_error(response: Response) -> RequestError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    RequestError::Status {
        status: status.as_u16(),
        message,
    }
}
