//! Message log commands.

use anyhow::{Context, Result};
use qiuqiu_store::{accept_submission, DeviceStore};
use qiuqiu_types::MessageSubmission;

/// Log a message and print the payload that would go to the push transport.
pub async fn send(store: &dyn DeviceStore, submission: MessageSubmission) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    let payload = accept_submission(store, submission, now).await?;
    tracing::debug!("Prepared push for device {}", payload.device_key);

    let json = serde_json::to_string_pretty(&payload).context("Failed to encode payload")?;
    println!("{}", json);
    Ok(())
}

/// Print every logged message for `token` as JSON.
pub async fn list(store: &dyn DeviceStore, token: &str) -> Result<()> {
    let messages = store.messages_by_token(token).await?;
    let json = serde_json::to_string_pretty(&messages).context("Failed to encode messages")?;
    println!("{}", json);
    Ok(())
}
