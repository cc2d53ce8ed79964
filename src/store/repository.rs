//! Storage seams used by the chat relay and the admin handlers

use async_trait::async_trait;

use crate::store::error::Result;
use crate::store::types::{ConversationRecord, KnowledgeEntry, KnowledgeSnippet, NewKnowledge};

/// What the chat relay needs from storage
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one completed chat turn
    async fn insert_conversation(&self, user_message: &str, bot_response: &str) -> Result<()>;

    /// Every knowledge entry, unordered
    async fn select_all_knowledge(&self) -> Result<Vec<KnowledgeSnippet>>;
}

/// Full storage surface behind the admin panel
#[async_trait]
pub trait Repository: ConversationStore {
    async fn insert_knowledge(&self, entry: NewKnowledge) -> Result<i32>;

    /// All-or-nothing bulk insert; returns the number of rows stored
    async fn insert_knowledge_batch(&self, entries: Vec<NewKnowledge>) -> Result<u64>;

    /// Newest first
    async fn list_knowledge(&self) -> Result<Vec<KnowledgeEntry>>;

    /// Fails with `StoreError::NotFound` when `id` does not exist
    async fn update_knowledge(&self, id: i32, entry: NewKnowledge) -> Result<()>;

    /// Fails with `StoreError::NotFound` when `id` does not exist
    async fn delete_knowledge(&self, id: i32) -> Result<()>;

    /// At most `limit` conversations, newest first
    async fn recent_conversations(&self, limit: i64) -> Result<Vec<ConversationRecord>>;
}
