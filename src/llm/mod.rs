//! LLM Abstraction Layer
//!
//! A provider trait over chat-completion backends, a Groq client, and the
//! key pool that rotates credentials when a key is rate limited.

pub mod core;
pub mod groq;
pub mod rotation;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{FinishReason, GenerateRequest, Message, MessageRole, StreamEvent, UsageMetadata},
};

pub use groq::{GroqClient, DEFAULT_BASE_URL};
pub use rotation::{KeyPool, KeyStatus};
