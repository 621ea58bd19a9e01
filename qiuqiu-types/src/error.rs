//! Error types for message validation.

use thiserror::Error;

/// Reasons a [`MessageSubmission`](crate::MessageSubmission) is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The target device token is missing or blank.
    #[error("token is required")]
    MissingToken,

    /// The message body is missing or blank.
    #[error("message is required")]
    MissingMessage,

    /// Timestamp is before the unix epoch.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(ValidationError::MissingToken.to_string(), "token is required");
        assert_eq!(
            ValidationError::InvalidTimestamp(-5).to_string(),
            "invalid timestamp: -5"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationError>();
    }
}
