//! Provider trait for LLM implementations

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use super::{error::LlmError, types::{GenerateRequest, StreamEvent}};

/// Boxed stream of provider events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream generate content from the LLM
    ///
    /// An `Err` here means the request itself was refused (bad credentials,
    /// rate limiting, HTTP failure). Failures after the first byte arrive as
    /// `Err` items inside the returned stream.
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError>;
}
