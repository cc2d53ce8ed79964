// Shared application state handed to the route filters

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::llm::KeyPool;
use crate::relay::{ChatService, ChatSettings};
use crate::store::Repository;

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub repository: Arc<dyn Repository>,
    pub keys: Arc<KeyPool>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire one repository into both the chat relay and the admin routes
    pub fn new<R: Repository + 'static>(
        repository: Arc<R>,
        keys: Arc<KeyPool>,
        sessions: SessionStore,
        settings: ChatSettings,
    ) -> Self {
        let chat = ChatService::new(keys.clone(), repository.clone(), settings);
        Self {
            chat,
            repository,
            keys,
            sessions,
        }
    }
}
