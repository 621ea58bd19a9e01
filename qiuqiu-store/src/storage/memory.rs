//! In-memory storage backend.

use super::DeviceStore;
use crate::error::StorageError;
use async_trait::async_trait;
use qiuqiu_types::{MessageRecord, PushMessage};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The only device key the memory backend accepts.
pub const MEMORY_DEVICE_KEY: &str = "MemoryBaseKey";

/// Single-device store held in process memory.
///
/// Holds at most one token, bound to [`MEMORY_DEVICE_KEY`]. Messages are
/// accepted and dropped: `messages_by_token` is always empty. Nothing
/// survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    token: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn binding(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key == MEMORY_DEVICE_KEY {
            Ok(())
        } else {
            Err(StorageError::KeyNotFound {
                key: key.to_string(),
            })
        }
    }
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn count_all(&self) -> Result<u64, StorageError> {
        Ok(1)
    }

    async fn token_by_key(&self, key: &str) -> Result<String, StorageError> {
        match self.binding().as_ref() {
            Some(token) if key == MEMORY_DEVICE_KEY => Ok(token.clone()),
            _ => Err(StorageError::KeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    async fn save_token_by_key(&self, key: &str, token: &str) -> Result<String, StorageError> {
        Self::check_key(key)?;
        *self.binding() = Some(token.to_string());
        Ok(MEMORY_DEVICE_KEY.to_string())
    }

    async fn delete_by_key(&self, key: &str) -> Result<(), StorageError> {
        Self::check_key(key)?;
        self.binding().take();
        Ok(())
    }

    async fn key_by_token(&self, token: &str) -> Result<String, StorageError> {
        match self.binding().as_deref() {
            Some(bound) if bound == token => Ok(MEMORY_DEVICE_KEY.to_string()),
            _ => Err(StorageError::TokenNotFound {
                token: token.to_string(),
            }),
        }
    }

    async fn append_message(&self, message: PushMessage) -> Result<(), StorageError> {
        tracing::debug!("Memory store dropping message {}", message.id());
        Ok(())
    }

    async fn messages_by_token(&self, _token: &str) -> Result<Vec<MessageRecord>, StorageError> {
        Ok(Vec::new())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
