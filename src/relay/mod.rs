//! Chat streaming relay
//!
//! Turns a provider's token stream into framed [`ChatEvent`]s for the
//! browser while accumulating the full answer:
//! - each non-empty delta becomes one `Content` event, followed by a pause
//!   set by the [`PacingPolicy`]
//! - when the provider stream ends the turn is persisted, then `Done` is sent
//! - any provider failure ends the stream with one `Error` event and
//!   nothing is persisted
//!
//! Persistence failures are logged and never abort the stream.

mod error;
pub mod prompt;

pub use error::ChatError;
pub use prompt::{build_messages, knowledge_context, HistoryTurn, FORMAT_INSTRUCTIONS};

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::{GenerateRequest, GenerationConfig, LlmProvider, StreamEvent};
use crate::sse::ChatEvent;
use crate::store::ConversationStore;

/// Artificial delay inserted after every emitted token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub per_token: Duration,
}

impl PacingPolicy {
    pub fn new(per_token: Duration) -> Self {
        Self { per_token }
    }

    /// Emit tokens as fast as the provider produces them
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn pause(&self) {
        if !self.per_token.is_zero() {
            tokio::time::sleep(self.per_token).await;
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(30))
    }
}

/// Model parameters and prompt shaping for every chat turn
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub generation: GenerationConfig,
    pub pacing: PacingPolicy,
    /// How many earlier exchanges are replayed to the model
    pub history_turns: usize,
    /// Named in the system prompt preamble
    pub institution: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            generation: GenerationConfig::default(),
            pacing: PacingPolicy::default(),
            history_turns: 10,
            institution: "NCIRL (National College of Ireland)".to_string(),
        }
    }
}

/// Stream one answer from `provider`, persisting it through `store`
///
/// `request` must already contain the full message list.
pub fn relay(
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn ConversationStore>,
    user_message: String,
    request: GenerateRequest,
    pacing: PacingPolicy,
) -> impl Stream<Item = ChatEvent> + Send + 'static {
    stream! {
        let mut tokens = match provider.stream_generate(request).await {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::error!(error = %err, "Chat request failed");
                yield ChatEvent::Error(err.public_message());
                return;
            }
        };

        let mut full_response = String::new();
        while let Some(item) = tokens.next().await {
            match item {
                Ok(StreamEvent::ContentDelta { text }) => {
                    if text.is_empty() {
                        continue;
                    }
                    full_response.push_str(&text);
                    yield ChatEvent::Content(text);
                    pacing.pause().await;
                }
                Ok(StreamEvent::MessageEnd { finish_reason, usage }) => {
                    tracing::debug!(?finish_reason, ?usage, "Model finished");
                }
                Err(err) => {
                    tracing::error!(error = %err, "Chat stream failed");
                    yield ChatEvent::Error(err.public_message());
                    return;
                }
            }
        }

        if let Err(err) = store.insert_conversation(&user_message, &full_response).await {
            tracing::warn!(error = %err, "Failed to save conversation");
        }

        yield ChatEvent::Done;
    }
}

/// Entry point used by the `/chat` route
#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn ConversationStore>,
    settings: Arc<ChatSettings>,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn ConversationStore>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Validate the message, load the knowledge context and start streaming
    ///
    /// Nothing reaches the provider when this returns an error.
    pub async fn start(
        &self,
        user_message: String,
        history: Vec<HistoryTurn>,
    ) -> Result<impl Stream<Item = ChatEvent> + Send + 'static, ChatError> {
        if user_message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let knowledge = self.store.select_all_knowledge().await?;
        let context = knowledge_context(&self.settings.institution, &knowledge);
        let messages = build_messages(
            &context,
            &history,
            &user_message,
            self.settings.history_turns,
        );

        tracing::info!(
            knowledge_entries = knowledge.len(),
            history_turns = history.len().min(self.settings.history_turns),
            "Starting chat turn"
        );

        let request = GenerateRequest::new(
            self.settings.model.clone(),
            messages,
            self.settings.generation.clone(),
        );

        Ok(relay(
            self.provider.clone(),
            self.store.clone(),
            user_message,
            request,
            self.settings.pacing,
        ))
    }
}
