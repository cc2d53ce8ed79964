use crate::store::StoreError;

/// Errors raised before a chat stream starts
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The request carried no message text
    #[error("No message provided")]
    EmptyMessage,

    /// The knowledge context could not be loaded
    #[error("Failed to load knowledge base: {0}")]
    Knowledge(#[from] StoreError),
}
