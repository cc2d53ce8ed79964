//! Mapping between abstraction types and chat-completions types

use crate::llm::core::types::{
    FinishReason, GenerateRequest, Message, StreamEvent, UsageMetadata,
};

use super::types::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, ChatMessage, CompletionUsage,
};

/// Convert our abstraction request to the wire request
pub fn to_groq_request(request: GenerateRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: request.model,
        messages: request.messages.into_iter().map(to_groq_message).collect(),
        max_tokens: request.config.max_tokens,
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        stop: request.config.stop_sequences,
        stream: request.stream,
    }
}

fn to_groq_message(message: Message) -> ChatMessage {
    ChatMessage {
        role: message.role.as_str().to_string(),
        content: message.content,
    }
}

fn to_usage(usage: CompletionUsage) -> UsageMetadata {
    UsageMetadata::new(usage.prompt_tokens, usage.completion_tokens)
}

/// Convert one streamed chunk into zero or more abstraction events
///
/// Only the first choice is read; the relay never asks for `n > 1`.
pub fn from_groq_chunk(chunk: ChatCompletionChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let usage = chunk
        .usage
        .or_else(|| chunk.x_groq.and_then(|x| x.usage))
        .map(to_usage);

    let Some(choice) = chunk.choices.into_iter().next() else {
        if usage.is_some() {
            events.push(StreamEvent::MessageEnd {
                finish_reason: None,
                usage,
            });
        }
        return events;
    };

    if let Some(text) = choice.delta.content {
        if !text.is_empty() {
            events.push(StreamEvent::ContentDelta { text });
        }
    }

    if let Some(reason) = choice.finish_reason {
        events.push(StreamEvent::MessageEnd {
            finish_reason: Some(FinishReason::from_wire(&reason)),
            usage,
        });
    }

    events
}

/// Convert a non-streaming completion into the same event shape
pub fn from_groq_completion(completion: ChatCompletion) -> Vec<StreamEvent> {
    let usage = completion.usage.map(to_usage);
    let Some(choice) = completion.choices.into_iter().next() else {
        return vec![StreamEvent::MessageEnd {
            finish_reason: None,
            usage,
        }];
    };

    let mut events = Vec::new();
    if !choice.message.content.is_empty() {
        events.push(StreamEvent::ContentDelta {
            text: choice.message.content,
        });
    }
    events.push(StreamEvent::MessageEnd {
        finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_wire),
        usage,
    });
    events
}
