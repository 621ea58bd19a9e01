//! Error types for qiuqiu-store.

use std::path::PathBuf;

use qiuqiu_types::ValidationError;

/// Top-level error for accepting and dispatching a message.
#[derive(Debug, thiserror::Error)]
pub enum QiuQiuError {
    /// Submission rejected at the boundary.
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No binding exists for the device key.
    #[error("device key not found: {key}")]
    KeyNotFound {
        /// The device key that was looked up.
        key: String,
    },

    /// No device is registered for the push token.
    #[error("device token not found: {token}")]
    TokenNotFound {
        /// The token that was looked up.
        token: String,
    },

    /// A message record could not be encoded.
    #[error("malformed message record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Embedded database error.
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    /// I/O error while preparing the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database path error.
    #[error("invalid database path: {path}")]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
    },

    /// The store was closed.
    #[error("store is closed")]
    Closed,

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Coarse classification of a [`StorageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Key, token or bucket absent.
    NotFound,
    /// Record could not be encoded or decoded.
    Malformed,
    /// The engine could not open or complete a transaction.
    BackendUnavailable,
}

impl StorageError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::KeyNotFound { .. } | StorageError::TokenNotFound { .. } => {
                ErrorKind::NotFound
            }
            StorageError::Malformed(_) => ErrorKind::Malformed,
            StorageError::Database(_)
            | StorageError::Io(_)
            | StorageError::InvalidPath { .. }
            | StorageError::Closed
            | StorageError::Task(_) => ErrorKind::BackendUnavailable,
        }
    }

    /// Whether this is a missing key or token.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<redb::DatabaseError> for StorageError {
    fn from(err: redb::DatabaseError) -> Self {
        StorageError::Database(err.into())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(err: redb::TransactionError) -> Self {
        StorageError::Database(err.into())
    }
}

impl From<redb::TableError> for StorageError {
    fn from(err: redb::TableError) -> Self {
        StorageError::Database(err.into())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(err: redb::CommitError) -> Self {
        StorageError::Database(err.into())
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        StorageError::Database(err.into())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds() {
        let err = StorageError::KeyNotFound {
            key: "dev1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "device key not found: dev1");

        let err = StorageError::TokenNotFound {
            token: "tok".to_string(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn closed_is_backend_unavailable() {
        assert_eq!(StorageError::Closed.kind(), ErrorKind::BackendUnavailable);
    }

    #[test]
    fn decode_error_is_malformed() {
        let err: StorageError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn redb_errors_convert() {
        let err: StorageError =
            redb::TableError::TableDoesNotExist("qiuqiu_messages".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
    }

    #[test]
    fn top_level_error_wraps_each_layer() {
        let err: QiuQiuError = ValidationError::MissingToken.into();
        assert!(matches!(err, QiuQiuError::Validation(_)));

        let err: QiuQiuError = StorageError::Closed.into();
        assert!(matches!(err, QiuQiuError::Storage(StorageError::Closed)));
        assert_eq!(err.to_string(), "storage error: store is closed");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
        assert_send_sync::<QiuQiuError>();
    }
}
