//! Error types for the answer and verse services.
//!
//! The `Display` text of each variant is what the user sees, so messages are
//! written as complete sentences.

use thiserror::Error;

/// Failure of the Answer Client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The question was blank or whitespace-only.
    #[error("Please enter a question first.")]
    EmptyQuestion,

    /// No API key was configured for the selected backend.
    #[error("{provider} API key not found. Set {env_var} or add api_key to the config file.")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The service could not be reached.
    #[error("Could not reach the answer service: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("The answer service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not contain a usable answer.
    #[error("The answer could not be read: {0}")]
    Parse(String),

    /// The service returned no content at all.
    #[error("The answer service returned an empty response.")]
    Empty,
}

impl RequestError {
    /// Map a transport-level reqwest error.
    pub fn network(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Network("the request timed out".to_string())
        } else {
            RequestError::Network(err.to_string())
        }
    }
}

/// Failure of the Verse Lookup Client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerseError {
    #[error("Could not reach the verse service: {0}")]
    Network(String),

    #[error("The verse service returned {0}.")]
    Status(u16),

    #[error("No verse text was found for \"{0}\".")]
    NotFound(String),

    #[error("The verse text could not be read: {0}")]
    Parse(String),

    #[error("The verse service URL is invalid: {0}")]
    Config(String),
}

impl From<reqwest::Error> for VerseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VerseError::Parse(err.to_string())
        } else {
            VerseError::Network(err.to_string())
        }
    }
}
