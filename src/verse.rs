//! Verse Lookup Client.
//!
//! Fetches the text of a verse reference (e.g. `Romans 8:1-4`) from a
//! bible-api.com compatible service.

use crate::config::VerseConfig;
use crate::error::VerseError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Anything that can resolve a verse title to its text.
#[async_trait]
pub trait VerseSource: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<String, VerseError>;
}

/// HTTP client for the verse-content service.
pub struct VerseClient {
    base_url: String,
    translation: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct VerseResponse {
    text: Option<String>,
}

impl VerseClient {
    pub fn new(client: Client, config: &VerseConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            translation: config.translation.clone(),
            client,
        }
    }

    /// URL for `title`, with the title as a single percent-encoded path segment.
    fn lookup_url(&self, title: &str) -> Result<Url, VerseError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| VerseError::Config(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| VerseError::Config(format!("{} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .push(title.trim());
        url.query_pairs_mut()
            .append_pair("translation", &self.translation);
        Ok(url)
    }
}

#[async_trait]
impl VerseSource for VerseClient {
    async fn lookup(&self, title: &str) -> Result<String, VerseError> {
        let url = self.lookup_url(title)?;
        debug!(%url, "Looking up verse");

        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(VerseError::NotFound(title.to_string())),
            status if !status.is_success() => return Err(VerseError::Status(status.as_u16())),
            _ => {}
        }

        let body: VerseResponse = response.json().await?;
        match body.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(VerseError::NotFound(title.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(base_url: String) -> VerseClient {
        VerseClient::new(
            Client::new(),
            &VerseConfig {
                base_url,
                translation: "kjv".to_string(),
            },
        )
    }

    #[test]
    fn test_lookup_url_encodes_title() {
        let client = client("https://bible-api.com".to_string());
        let url = client.lookup_url("1 John 4:7-8").unwrap();
        assert_eq!(
            url.as_str(),
            "https://bible-api.com/1%20John%204:7-8?translation=kjv"
        );
    }

    #[test]
    fn test_lookup_url_keeps_base_path() {
        let client = client("http://localhost:8080/api/".to_string());
        let url = client.lookup_url("John 3:16").unwrap();
        assert_eq!(url.path(), "/api/John%203:16");
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_config_error() {
        let err = client("not a url".to_string()).lookup("John 3:16").await.unwrap_err();
        assert!(matches!(err, VerseError::Config(_)));

        let err = client("mailto:someone@example.com".to_string())
            .lookup("John 3:16")
            .await
            .unwrap_err();
        assert!(matches!(err, VerseError::Config(_)));
    }

    #[tokio::test]
    async fn test_lookup_returns_text_verbatim() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_includes("3:16")
                    .query_param("translation", "kjv");
                then.status(200).json_body(serde_json::json!({
                    "reference": "John 3:16",
                    "text": "For God so loved the world,\n",
                    "translation_id": "kjv"
                }));
            })
            .await;

        let text = client(server.base_url()).lookup("John 3:16").await.unwrap();
        mock.assert_async().await;
        assert_eq!(text, "For God so loved the world,\n");
    }

    #[tokio::test]
    async fn test_unknown_reference() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(404).json_body(serde_json::json!({ "error": "not found" }));
            })
            .await;

        let err = client(server.base_url()).lookup("Hezekiah 1:1").await.unwrap_err();
        assert_eq!(err, VerseError::NotFound("Hezekiah 1:1".to_string()));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503);
            })
            .await;

        let err = client(server.base_url()).lookup("John 1:1").await.unwrap_err();
        assert_eq!(err, VerseError::Status(503));
    }
}
