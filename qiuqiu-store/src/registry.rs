//! Message intake and device resolution for the push path.
//!
//! A webhook submission is validated, logged, and turned into a
//! [`PushPayload`] addressed to the device that owns the token. Tokens
//! that have never been seen are registered on the fly.

use crate::error::{QiuQiuError, StorageError};
use crate::storage::DeviceStore;
use qiuqiu_types::{MessageSubmission, PushMessage, PushPayload};

/// Find the device key for `token`, registering the token if it is unknown.
pub async fn resolve_device_key(
    store: &dyn DeviceStore,
    token: &str,
) -> Result<String, StorageError> {
    match store.key_by_token(token).await {
        Ok(key) => Ok(key),
        Err(StorageError::TokenNotFound { .. }) => {
            let key = store.save_token_by_key("", token).await?;
            tracing::info!("Registered device {} for unseen token", key);
            Ok(key)
        }
        Err(e) => Err(e),
    }
}

/// Resolve the device for `message` and build its push payload.
pub async fn prepare_push(
    store: &dyn DeviceStore,
    message: &PushMessage,
) -> Result<PushPayload, StorageError> {
    let device_key = resolve_device_key(store, &message.token).await?;
    Ok(PushPayload::from_message(message, device_key))
}

/// Validate, log and prepare a webhook submission.
///
/// `now` (unix seconds) stands in for a missing timestamp. The message is
/// persisted before device resolution, so a failed resolution still leaves
/// it in the log.
pub async fn accept_submission(
    store: &dyn DeviceStore,
    submission: MessageSubmission,
    now: i64,
) -> Result<PushPayload, QiuQiuError> {
    let message = submission.validate(now)?;
    store.append_message(message.clone()).await?;
    Ok(prepare_push(store, &message).await?)
}
