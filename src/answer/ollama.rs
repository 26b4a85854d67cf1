//! Ollama backend implementation.
//!
//! Ollama is a local LLM server; `format: "json"` constrains the output to a
//! JSON document.

use super::status_error;
use crate::error::RequestError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Ollama backend for local LLM inference.
pub struct OllamaBackend {
    pub model: String,
    host: String,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    pub fn new(client: Client, model: String, host: String) -> Self {
        Self {
            model,
            host: host.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Raw completion text for a question.
    pub async fn complete(&self, system_prompt: &str, question: &str) -> Result<String, RequestError> {
        let url = format!("{}/api/generate", self.host);

        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: question.to_string(),
            system: system_prompt.to_string(),
            stream: false,
            format: "json".to_string(),
            options: OllamaOptions { temperature: 0.7 },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| match RequestError::network(e) {
                RequestError::Network(msg) => {
                    RequestError::Network(format!("{msg}. Is Ollama running? Try: ollama serve"))
                }
                other => other,
            })?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| RequestError::Parse(e.to_string()))?;

        Ok(ollama_response.response)
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    system: String,
    stream: bool,
    format: String,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}
