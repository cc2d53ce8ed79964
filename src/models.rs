// Request and response bodies for the HTTP routes

use serde::{Deserialize, Serialize};

use crate::relay::HistoryTurn;
use crate::store::{NewKnowledge, DEFAULT_SOURCE};

/// Body of `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

/// Body of `POST /admin/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /add_knowledge`; every field is optional on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct AddKnowledgeRequest {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

impl From<AddKnowledgeRequest> for NewKnowledge {
    fn from(req: AddKnowledgeRequest) -> Self {
        NewKnowledge::new(req.category, req.question, req.answer).with_source(req.source)
    }
}

/// Body of `PUT /update_knowledge/{id}`; every field is required
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateKnowledgeRequest {
    pub category: String,
    pub question: String,
    pub answer: String,
    pub source: String,
}

impl From<UpdateKnowledgeRequest> for NewKnowledge {
    fn from(req: UpdateKnowledgeRequest) -> Self {
        NewKnowledge::new(req.category, req.question, req.answer).with_source(req.source)
    }
}

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generic `{error}` body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Reply of `POST /rotate-key`
#[derive(Debug, Clone, Serialize)]
pub struct RotateKeyResponse {
    pub message: String,
    pub current_key: usize,
    pub total_keys: usize,
}
