//! Server-Sent Events (SSE) parser for chat-completion streams

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::{ChatCompletionChunk, ErrorBody};

/// Sentinel payload that terminates an OpenAI-style stream
const DONE_SENTINEL: &str = "[DONE]";

/// Parse a stream of bytes as chat-completion chunks
///
/// The format is `data: <json>` lines separated by blank lines, ending with
/// `data: [DONE]`. Lines may be split across network chunks, so bytes are
/// buffered until a newline arrives; a last line without one is parsed when
/// the body ends. An `{"error": ...}` payload becomes a
/// [`LlmError::ProviderError`]. Anything after the sentinel is ignored.
pub fn parse_sse_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, LlmError>> + Send>> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut finished = false;

    // `None` marks the end of the body
    let chunks = byte_stream
        .map(Some)
        .chain(futures::stream::iter([None]));

    let event_stream = chunks.flat_map(move |chunk_result| {
        if finished {
            return futures::stream::iter(Vec::new());
        }

        match chunk_result {
            // Multi-byte characters may straddle chunks; decode whole lines only
            Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
            Some(Err(e)) => {
                return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
            }
            None => {
                if buffer.is_empty() {
                    return futures::stream::iter(Vec::new());
                }
                buffer.push(b'\n');
            }
        }

        let mut events = Vec::new();
        while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
            let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
            let line = match std::str::from_utf8(&line_bytes) {
                Ok(line) => line.trim(),
                Err(e) => {
                    events.push(Err(LlmError::StreamError(format!(
                        "Invalid UTF-8 in stream: {}",
                        e
                    ))));
                    continue;
                }
            };

            if let Some(event) = parse_line(line) {
                match event {
                    LineEvent::Chunk(result) => events.push(result),
                    LineEvent::Done => {
                        finished = true;
                        buffer.clear();
                        break;
                    }
                }
            }
        }

        futures::stream::iter(events)
    });

    Box::pin(event_stream)
}

enum LineEvent {
    Chunk(Result<ChatCompletionChunk, LlmError>),
    Done,
}

fn parse_line(line: &str) -> Option<LineEvent> {
    // Comments (": keep-alive") and event/id fields carry nothing we need
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == DONE_SENTINEL {
        return Some(LineEvent::Done);
    }

    Some(LineEvent::Chunk(parse_data(data)))
}

fn parse_data(data: &str) -> Result<ChatCompletionChunk, LlmError> {
    let serialization_error = |e: serde_json::Error| {
        LlmError::SerializationError(format!("Failed to parse SSE data: {}. Data: {}", e, data))
    };

    let value: serde_json::Value = serde_json::from_str(data).map_err(serialization_error)?;

    // Chunk fields all default, so an error payload would otherwise parse as empty
    if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
        return Err(stream_error(error));
    }

    serde_json::from_value(value).map_err(serialization_error)
}

fn stream_error(error: &serde_json::Value) -> LlmError {
    match serde_json::from_value::<ErrorBody>(error.clone()) {
        Ok(body) => LlmError::ProviderError {
            code: body
                .code
                .or(body.error_type)
                .unwrap_or_else(|| "stream_error".to_string()),
            message: body.message,
        },
        Err(_) => LlmError::ProviderError {
            code: "stream_error".to_string(),
            message: match error.as_str() {
                Some(text) => text.to_string(),
                None => error.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn bytes_stream(
        chunks: Vec<&'static [u8]>,
    ) -> Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>> {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    #[tokio::test]
    async fn test_parse_content_chunk() {
        let data: &'static [u8] =
            b"data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n\n";
        let mut sse_stream = parse_sse_stream(bytes_stream(vec![data]));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hello"));
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_line_split_across_chunks() {
        let part1: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"del";
        let part2: &'static [u8] = b"ta\":{\"content\":\"Hi\"}}]}\n\n";
        let mut sse_stream = parse_sse_stream(bytes_stream(vec![part1, part2]));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_chunks() {
        let part1: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"caf\xC3";
        let part2: &'static [u8] = b"\xA9\"}}]}\n\n";
        let mut sse_stream = parse_sse_stream(bytes_stream(vec![part1, part2]));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("café"));
    }

    #[tokio::test]
    async fn test_done_sentinel_stops_parsing() {
        let data: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"a\"}}]}\n\ndata: [DONE]\n\ndata: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"late\"}}]}\n\n";
        let sse_stream = parse_sse_stream(bytes_stream(vec![data]));

        let chunks: Vec<_> = sse_stream.collect().await;
        assert_eq!(chunks.len(), 1);
        let chunk = chunks.into_iter().next().unwrap().unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_comments_are_ignored() {
        let data: &'static [u8] =
            b": keep-alive\n\ndata: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"x\"}}]}\n\n";
        let sse_stream = parse_sse_stream(bytes_stream(vec![data]));
        let chunks: Vec<_> = sse_stream.collect().await;
        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_invalid_json() {
        let data: &'static [u8] = b"data: {invalid json}\n\n";
        let mut sse_stream = parse_sse_stream(bytes_stream(vec![data]));
        let result = sse_stream.next().await.unwrap();
        assert!(matches!(result, Err(LlmError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_error_payload_mid_stream() {
        let data: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n\n\
data: {\"error\":{\"message\":\"Rate limit reached for model\",\"type\":\"tokens\",\"code\":\"rate_limit_exceeded\"}}\n\n";
        let chunks: Vec<_> = parse_sse_stream(bytes_stream(vec![data])).collect().await;

        assert_eq!(chunks.len(), 2);
        let first = chunks[0].as_ref().unwrap();
        assert_eq!(first.choices[0].delta.content.as_deref(), Some("Hi"));

        match &chunks[1] {
            Err(err @ LlmError::ProviderError { code, message }) => {
                assert_eq!(code, "rate_limit_exceeded");
                assert_eq!(message, "Rate limit reached for model");
                assert!(err.is_rate_limit());
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_payload_without_code() {
        let data: &'static [u8] = b"data: {\"error\":{\"message\":\"Internal server error\"}}\n\n";
        let mut sse_stream = parse_sse_stream(bytes_stream(vec![data]));

        match sse_stream.next().await.unwrap() {
            Err(LlmError::ProviderError { code, message }) => {
                assert_eq!(code, "stream_error");
                assert_eq!(message, "Internal server error");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_last_line_without_trailing_newline() {
        let part1: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"a\"}}]}\n\n";
        let part2: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"b\"}}]}";
        let chunks: Vec<_> = parse_sse_stream(bytes_stream(vec![part1, part2]))
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        let last = chunks[1].as_ref().unwrap();
        assert_eq!(last.choices[0].delta.content.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_done_without_trailing_newline() {
        let data: &'static [u8] = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"a\"}}]}\n\ndata: [DONE]";
        let chunks: Vec<_> = parse_sse_stream(bytes_stream(vec![data])).collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_ok());
    }
}
