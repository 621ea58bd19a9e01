//! redb storage backend for qiuqiu-store.

use super::DeviceStore;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use qiuqiu_types::{MessageRecord, PushMessage};
use redb::backends::InMemoryBackend;
use redb::{
    Database, Key, ReadOnlyTable, ReadTransaction, ReadableTable, ReadableTableMetadata,
    TableDefinition, TableError, Value,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Forward index: device key -> push token.
const DEVICE_TOKENS: TableDefinition<&str, &str> = TableDefinition::new("device_tokens");

/// Reverse index: push token -> device key.
const DEVICE_TOKENS_REVERSE: TableDefinition<&str, &str> =
    TableDefinition::new("device_tokens_reverse");

/// Message log: `"{token}-{timestamp}"` -> JSON-encoded [`MessageRecord`].
const MESSAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("qiuqiu_messages");

/// redb-based device store.
///
/// redb runs one write transaction at a time while readers see the last
/// committed snapshot. Every call runs its transaction on the blocking pool
/// while holding a read lock on the handle, so [`close`](DeviceStore::close)
/// waits for in-flight transactions before releasing the file.
pub struct RedbStore {
    db: RwLock<Option<Arc<Database>>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .field(
                "open",
                &self.db.try_read().map(|db| db.is_some()).unwrap_or(true),
            )
            .finish()
    }
}

impl RedbStore {
    /// Open (or create) the database file at `path`.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        if path.as_os_str().is_empty() || path.is_dir() {
            return Err(StorageError::InvalidPath {
                path: path.to_path_buf(),
            });
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = path.to_path_buf();
        let db = tokio::task::spawn_blocking(move || Database::create(file)).await??;
        tracing::info!("Opened device store at {}", path.display());

        Ok(Self {
            db: RwLock::new(Some(Arc::new(db))),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a store backed by memory instead of a file (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Ok(Self {
            db: RwLock::new(Some(Arc::new(db))),
            path: None,
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `op` against the database on the blocking pool.
    ///
    /// The read guard is held until the blocking task finishes.
    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StorageError> + Send + 'static,
    {
        let guard = self.db.read().await;
        let db = guard.clone().ok_or(StorageError::Closed)?;
        let result = tokio::task::spawn_blocking(move || op(&db)).await?;
        drop(guard);
        result
    }
}

/// Open a table for reading; a table that was never created reads as `None`.
fn open_read_table<K: Key + 'static, V: Value + 'static>(
    txn: &ReadTransaction,
    table: TableDefinition<K, V>,
) -> Result<Option<ReadOnlyTable<K, V>>, StorageError> {
    match txn.open_table(table) {
        Ok(table) => Ok(Some(table)),
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn lookup(
    db: &Database,
    table: TableDefinition<'static, &'static str, &'static str>,
    key: &str,
) -> Result<Option<String>, StorageError> {
    let txn = db.begin_read()?;
    let Some(table) = open_read_table(&txn, table)? else {
        return Ok(None);
    };
    let value = table.get(key)?.map(|v| v.value().to_string());
    Ok(value)
}

fn save_binding(db: &Database, key: &str, token: &str) -> Result<(), StorageError> {
    let txn = db.begin_write()?;
    {
        let mut forward = txn.open_table(DEVICE_TOKENS)?;
        let mut reverse = txn.open_table(DEVICE_TOKENS_REVERSE)?;

        // A token belongs to one device: unbind whichever key held it before.
        let holder = reverse.get(token)?.map(|v| v.value().to_string());
        if let Some(other) = holder.filter(|other| other != key) {
            forward.remove(other.as_str())?;
            tracing::debug!("Token moved from device {} to {}", other, key);
        }

        let previous = forward.insert(key, token)?.map(|v| v.value().to_string());

        // Evict the old token's reverse entry unless another key has claimed it since.
        if let Some(old) = previous.filter(|old| old != token) {
            let owned = reverse.get(old.as_str())?.is_some_and(|v| v.value() == key);
            if owned {
                reverse.remove(old.as_str())?;
            }
        }

        reverse.insert(token, key)?;
    }
    txn.commit()?;
    Ok(())
}

fn delete_binding(db: &Database, key: &str) -> Result<Option<String>, StorageError> {
    let txn = db.begin_write()?;
    let removed = {
        let mut forward = txn.open_table(DEVICE_TOKENS)?;
        let mut reverse = txn.open_table(DEVICE_TOKENS_REVERSE)?;

        let removed = forward.remove(key)?.map(|v| v.value().to_string());
        if let Some(token) = &removed {
            let owned = reverse.get(token.as_str())?.is_some_and(|v| v.value() == key);
            if owned {
                reverse.remove(token.as_str())?;
            }
        }
        removed
    };
    txn.commit()?;
    Ok(removed)
}

fn scan_messages(db: &Database, token: &str) -> Result<Vec<MessageRecord>, StorageError> {
    let txn = db.begin_read()?;
    let Some(table) = open_read_table(&txn, MESSAGES)? else {
        return Ok(Vec::new());
    };

    let mut messages = Vec::new();
    let mut skipped = 0usize;
    for entry in table.iter()? {
        let (id, value) = entry?;
        match serde_json::from_slice::<MessageRecord>(value.value()) {
            Ok(record) if record.token == token => messages.push(record),
            Ok(_) => {}
            Err(e) => {
                skipped += 1;
                tracing::debug!("Skipping malformed message {}: {}", id.value(), e);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} malformed message records during scan", skipped);
    }
    Ok(messages)
}

#[async_trait]
impl DeviceStore for RedbStore {
    async fn count_all(&self) -> Result<u64, StorageError> {
        self.run(|db| {
            let txn = db.begin_read()?;
            match open_read_table(&txn, DEVICE_TOKENS)? {
                Some(table) => Ok(table.len()?),
                None => Ok(0),
            }
        })
        .await
    }

    async fn token_by_key(&self, key: &str) -> Result<String, StorageError> {
        let key = key.to_string();
        self.run(move |db| {
            lookup(db, DEVICE_TOKENS, &key)?.ok_or(StorageError::KeyNotFound { key })
        })
        .await
    }

    async fn save_token_by_key(&self, key: &str, token: &str) -> Result<String, StorageError> {
        let key = if key.is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            key.to_string()
        };
        let token = token.to_string();

        self.run(move |db| {
            save_binding(db, &key, &token)?;
            tracing::debug!("Saved token for device {}", key);
            Ok(key)
        })
        .await
    }

    async fn delete_by_key(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.run(move |db| {
            match delete_binding(db, &key)? {
                Some(_) => tracing::debug!("Deleted device {}", key),
                None => tracing::debug!("Delete of unbound device {} is a no-op", key),
            }
            Ok(())
        })
        .await
    }

    async fn key_by_token(&self, token: &str) -> Result<String, StorageError> {
        let token = token.to_string();
        self.run(move |db| {
            lookup(db, DEVICE_TOKENS_REVERSE, &token)?
                .ok_or(StorageError::TokenNotFound { token })
        })
        .await
    }

    async fn append_message(&self, message: PushMessage) -> Result<(), StorageError> {
        let record = MessageRecord::from_message(message, Utc::now());
        let data = serde_json::to_vec(&record)?;

        self.run(move |db| {
            let txn = db.begin_write()?;
            {
                let mut table = txn.open_table(MESSAGES)?;
                table.insert(record.id.as_str(), data.as_slice())?;
            }
            txn.commit()?;
            tracing::debug!("Appended message {}", record.id);
            Ok(())
        })
        .await
    }

    async fn messages_by_token(&self, token: &str) -> Result<Vec<MessageRecord>, StorageError> {
        let token = token.to_string();
        self.run(move |db| scan_messages(db, &token)).await
    }

    async fn close(&self) -> Result<(), StorageError> {
        let db = self.db.write().await.take();
        if db.is_some() {
            match &self.path {
                Some(path) => tracing::info!("Closed device store at {}", path.display()),
                None => tracing::info!("Closed in-memory device store"),
            }
        }
        Ok(())
    }
}
