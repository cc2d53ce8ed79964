//! Groq client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{GenerateRequest, StreamEvent},
};

use super::mapper::{from_groq_chunk, from_groq_completion, to_groq_request};
use super::sse::parse_sse_stream;
use super::types::{ChatCompletion, ErrorEnvelope};

/// Default OpenAI-compatible endpoint root
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Client bound to a single API key
pub struct GroqClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Bearer credential
    api_key: String,
    /// Endpoint root without trailing slash
    base_url: String,
}

impl GroqClient {
    /// Create a client against the public Groq endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against any OpenAI-compatible endpoint
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidRequest("API key must not be empty".to_string()));
        }

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_endpoint_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn make_request(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        let streaming = request.stream;
        let body = to_groq_request(request);

        let response = self
            .http_client
            .post(self.build_endpoint_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, body));
        }

        if !streaming {
            let completion: ChatCompletion = response.json().await?;
            let events = from_groq_completion(completion);
            return Ok(Box::pin(futures::stream::iter(
                events.into_iter().map(Ok::<StreamEvent, LlmError>),
            )));
        }

        let sse_stream = parse_sse_stream(Box::pin(response.bytes_stream()));
        let event_stream = sse_stream.flat_map(|result| match result {
            Ok(chunk) => futures::stream::iter(
                from_groq_chunk(chunk)
                    .into_iter()
                    .map(Ok)
                    .collect::<Vec<Result<StreamEvent, LlmError>>>(),
            ),
            Err(e) => futures::stream::iter(vec![Err(e)]),
        });

        Ok(Box::pin(event_stream))
    }
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_request(request).await
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Turn a non-2xx response into a structured error
fn classify_failure(status: StatusCode, retry_after: Option<Duration>, body: String) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { retry_after },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::AuthenticationError(error_message(&body))
        }
        _ => match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => LlmError::ProviderError {
                code: envelope
                    .error
                    .code
                    .or(envelope.error.error_type)
                    .unwrap_or_else(|| status.as_u16().to_string()),
                message: envelope.error.message,
            },
            Err(_) => LlmError::HttpError {
                status: status.as_u16(),
                body,
            },
        },
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}
