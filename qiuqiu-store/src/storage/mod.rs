//! Storage layer for qiuqiu-store.
//!
//! Provides the device token registry and the per-token message log.

mod durable;
mod memory;

pub use durable::RedbStore;
pub use memory::{MemoryStore, MEMORY_DEVICE_KEY};

use crate::config::{BackendKind, StorageConfig};
use crate::error::StorageError;
use async_trait::async_trait;
use qiuqiu_types::{MessageRecord, PushMessage};
use std::sync::Arc;

/// Trait for device registry backends.
///
/// Every read returns owned data; callers never hold references into the
/// backend's state.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Count stored entities.
    ///
    /// The durable backend counts bound devices. The memory backend always
    /// reports 1.
    async fn count_all(&self) -> Result<u64, StorageError>;

    /// Get the push token bound to a device key.
    ///
    /// Returns `KeyNotFound` if the key has no binding.
    async fn token_by_key(&self, key: &str) -> Result<String, StorageError>;

    /// Bind `token` to `key`, replacing any previous token.
    ///
    /// The forward and reverse entries are written together. Returns the
    /// key actually used, which differs from `key` when `key` is empty.
    async fn save_token_by_key(&self, key: &str, token: &str) -> Result<String, StorageError>;

    /// Remove a device binding and its reverse entry.
    ///
    /// Deleting a key with no binding succeeds.
    async fn delete_by_key(&self, key: &str) -> Result<(), StorageError>;

    /// Reverse lookup of the device key for a push token.
    ///
    /// Returns `TokenNotFound` if no device is registered for the token.
    async fn key_by_token(&self, token: &str) -> Result<String, StorageError>;

    /// Append a message to the log under `"{token}-{timestamp}"`.
    ///
    /// A later message with the same id replaces the earlier one.
    async fn append_message(&self, message: PushMessage) -> Result<(), StorageError>;

    /// Get all logged messages whose token equals `token`.
    ///
    /// Scans the whole log. Records that fail to decode are skipped.
    async fn messages_by_token(&self, token: &str) -> Result<Vec<MessageRecord>, StorageError>;

    /// Release the backend's resources.
    async fn close(&self) -> Result<(), StorageError>;
}

/// Open the backend selected by `config`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn DeviceStore>, StorageError> {
    match config.backend {
        BackendKind::Durable => {
            let store = RedbStore::open(&config.database).await?;
            Ok(Arc::new(store))
        }
        BackendKind::Memory => {
            tracing::info!("Using in-memory device store (messages are not retained)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
