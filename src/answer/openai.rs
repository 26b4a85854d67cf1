//! OpenAI backend implementation.
//!
//! Uses the chat completions API in JSON mode.

use super::status_error;
use crate::error::RequestError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI backend for GPT API.
pub struct OpenAIBackend {
    pub model: String,
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend.
    pub fn new(client: Client, model: String, api_key: Option<String>, base_url: String) -> Self {
        Self {
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the API key from config or environment.
    fn get_api_key(&self) -> Result<String, RequestError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(RequestError::MissingApiKey {
                provider: "OpenAI",
                env_var: "OPENAI_API_KEY",
            })
    }

    /// Raw completion text for a question.
    pub async fn complete(&self, system_prompt: &str, question: &str) -> Result<String, RequestError> {
        let api_key = self.get_api_key()?;

        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            temperature: 0.7,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(RequestError::network)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| RequestError::Parse(e.to_string()))?;

        openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(RequestError::Empty)
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}
