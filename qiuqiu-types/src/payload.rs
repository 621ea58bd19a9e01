//! Outbound push payload handed to the notification transport.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::message::PushMessage;

/// Notification sound requested for QiuQiu pushes.
pub const DEFAULT_SOUND: &str = "1107";

/// A push request for one device, keyed by its resolved device key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushPayload {
    /// Device key resolved (or registered) for the token.
    pub device_key: String,
    /// Push token the transport delivers to.
    pub device_token: String,
    /// Notification title.
    pub title: String,
    /// Notification subtitle (unused by QiuQiu, always empty).
    pub subtitle: String,
    /// Notification body.
    pub body: String,
    /// Sound name.
    pub sound: String,
    /// Extra key/value pairs delivered alongside the alert.
    pub ext_params: Map<String, Value>,
}

impl PushPayload {
    /// Build the payload for `message`, addressed to `device_key`.
    pub fn from_message(message: &PushMessage, device_key: impl Into<String>) -> Self {
        let mut ext_params = Map::new();
        if let Some(url) = &message.url {
            ext_params.insert("url".to_string(), Value::String(url.clone()));
        }
        ext_params.insert("timestamp".to_string(), Value::from(message.timestamp));

        Self {
            device_key: device_key.into(),
            device_token: message.token.clone(),
            title: message.title.clone(),
            subtitle: String::new(),
            body: message.message.clone(),
            sound: DEFAULT_SOUND.to_string(),
            ext_params,
        }
    }
}
