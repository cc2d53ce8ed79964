pub mod conversations;
pub mod knowledge;

pub use conversations::{insert_conversation, recent_conversations, HISTORY_LIMIT};
pub use knowledge::{
    delete_knowledge, insert_knowledge, insert_knowledge_batch, list_knowledge,
    select_all_knowledge, update_knowledge,
};
