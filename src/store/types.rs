use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label for entries added one at a time from the admin panel
pub const DEFAULT_SOURCE: &str = "User Input";

/// Source label for CSV rows that do not name one
pub const CSV_SOURCE: &str = "CSV Import";

/// A stored knowledge base row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: i32,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields written on insert or update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewKnowledge {
    pub category: String,
    pub question: String,
    pub answer: String,
    pub source: String,
}

impl NewKnowledge {
    pub fn new(
        category: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            question: question.into(),
            answer: answer.into(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    /// Set the provenance label (builder pattern)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// The part of a knowledge entry that goes into the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSnippet {
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// One completed chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub user_message: String,
    pub bot_response: String,
    pub timestamp: Option<DateTime<Utc>>,
}
