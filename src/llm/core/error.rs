//! Error types for the LLM layer

use std::time::Duration;
use thiserror::Error;

/// Substrings that mark a provider failure as rate limiting when no
/// structured signal is available.
const RATE_LIMIT_MARKERS: [&str; 3] = ["rate limit", "quota", "429"];

/// Errors that can occur when using LLM providers
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Rejected credentials
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// SSE stream parsing failures
    #[error("Stream error: {0}")]
    StreamError(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded (retry after {retry_after:?})")]
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Provider-specific errors
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: String, message: String },

    /// Every credential in the pool was rate limited during one request
    #[error("All API keys have reached their rate limit")]
    AllKeysExhausted,

    /// The credential pool was configured empty
    #[error("No API keys configured")]
    NoCredentials,
}

impl LlmError {
    /// Whether this failure should trigger a key rotation.
    ///
    /// Structured signals win; the text match only covers errors that
    /// carry the provider's message verbatim.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            LlmError::RateLimitExceeded { .. } => true,
            LlmError::HttpError { status: 429, .. } => true,
            LlmError::AllKeysExhausted | LlmError::NoCredentials => false,
            other => {
                let text = other.to_string().to_lowercase();
                RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker))
            }
        }
    }

    /// Text that is safe to forward to a browser.
    ///
    /// Upstream response bodies stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            LlmError::HttpError { status, .. } => {
                format!("The language model service returned an error (status {})", status)
            }
            LlmError::AuthenticationError(_) => {
                "The language model service rejected the API key".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}
