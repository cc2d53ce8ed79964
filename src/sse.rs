use serde_json::Value;
use std::convert::Infallible;
use warp::sse::Event;

/// One framed event of the chat stream
///
/// Each variant serializes to a JSON object with exactly one key:
/// `content`, `done` or `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A non-empty token delta from the model
    Content(String),
    /// The answer is complete
    Done,
    /// The stream failed; no further events follow
    Error(String),
}

impl ChatEvent {
    pub fn payload(&self) -> Value {
        match self {
            ChatEvent::Content(text) => serde_json::json!({ "content": text }),
            ChatEvent::Done => serde_json::json!({ "done": true }),
            ChatEvent::Error(message) => serde_json::json!({ "error": message }),
        }
    }

    /// Wire form: `data: <json>` followed by a blank line
    pub fn to_frame(&self) -> String {
        format!("data: {}\n\n", self.payload())
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChatEvent::Content(_))
    }

    /// Convert into a warp SSE event carrying only a `data` field
    pub fn into_event(self) -> Result<Event, Infallible> {
        Ok(Event::default().data(self.payload().to_string()))
    }
}
