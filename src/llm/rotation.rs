//! API key rotation
//!
//! A [`KeyPool`] owns one provider client per credential plus the shared
//! rotation index. It implements [`LlmProvider`] itself: a request is sent
//! with the client at the current index and, when the provider reports rate
//! limiting, the index advances and the request is retried on the next key.
//! Each key is tried at most once per request.
//!
//! The index lives in an atomic and is shared by every request. Concurrent
//! requests that rotate at the same time both advance it, so a request may
//! land on a key another request just found exhausted. That is accepted:
//! rotations never tear, they only interleave.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::GenerateRequest,
};

/// Characters of a key shown in status output
const VISIBLE_KEY_PREFIX: usize = 10;

/// One credential and the client bound to it
struct PooledKey {
    credential: String,
    client: Box<dyn LlmProvider>,
}

/// Snapshot of the pool for the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    /// 1-based position of the active key
    pub current_key: usize,
    pub total_keys: usize,
    /// Leading characters of the active key followed by `...`
    pub active_key_partial: String,
}

/// Ordered pool of credentials with a process-wide rotation cursor
pub struct KeyPool {
    keys: Vec<PooledKey>,
    current: AtomicUsize,
}

impl KeyPool {
    /// Build a pool from `(credential, client)` pairs, in order
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NoCredentials`] when `entries` is empty, so a
    /// misconfigured deployment fails at startup instead of on first chat.
    pub fn new(entries: Vec<(String, Box<dyn LlmProvider>)>) -> Result<Self, LlmError> {
        if entries.is_empty() {
            return Err(LlmError::NoCredentials);
        }

        let keys = entries
            .into_iter()
            .map(|(credential, client)| PooledKey { credential, client })
            .collect::<Vec<_>>();

        tracing::info!(total_keys = keys.len(), "Loaded API key pool");

        Ok(Self {
            keys,
            current: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 0-based index of the active key
    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Advance to the next key, wrapping at the end of the pool
    ///
    /// Returns the new 0-based index.
    pub fn rotate(&self) -> usize {
        let len = self.keys.len();
        let previous = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| Some((i + 1) % len))
            .unwrap_or_else(|i| i);
        let next = (previous + 1) % len;

        tracing::info!(
            current_key = next + 1,
            total_keys = len,
            "Rotated API key"
        );
        next
    }

    pub fn status(&self) -> KeyStatus {
        let index = self.current_index();
        let credential = &self.keys[index].credential;
        let prefix: String = credential.chars().take(VISIBLE_KEY_PREFIX).collect();

        KeyStatus {
            current_key: index + 1,
            total_keys: self.keys.len(),
            active_key_partial: format!("{}...", prefix),
        }
    }
}

#[async_trait]
impl LlmProvider for KeyPool {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        let attempts = self.keys.len();

        for attempt in 0..attempts {
            let index = self.current_index();
            let key = &self.keys[index];

            match key.client.stream_generate(request.clone()).await {
                Ok(stream) => return Ok(stream),
                Err(err) if err.is_rate_limit() => {
                    tracing::warn!(
                        key = index + 1,
                        attempt = attempt + 1,
                        error = %err,
                        "Rate limit hit, rotating API key"
                    );
                    if attempt + 1 < attempts {
                        self.rotate();
                    }
                }
                Err(err) => return Err(err),
            }
        }

        tracing::error!(total_keys = attempts, "All API keys exhausted");
        Err(LlmError::AllKeysExhausted)
    }
}
