//! Knowledge base and conversation storage
//!
//! Two PostgreSQL tables accessed through a `deadpool-postgres` pool:
//! `knowledge_base`, curated by administrators and read in full on every
//! chat turn, and `conversations`, an append-only log of completed turns.

pub mod client;
pub mod connection;
pub mod error;
pub mod operations;
pub mod repository;
pub mod schema;
pub mod types;

// Re-export main types for convenience
pub use client::Store;
pub use connection::StoreConfig;
pub use error::{Result, StoreError};
pub use repository::{ConversationStore, Repository};
pub use types::{
    ConversationRecord, KnowledgeEntry, KnowledgeSnippet, NewKnowledge, CSV_SOURCE,
    DEFAULT_SOURCE,
};
