//! Message submission and log record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Title used when a submission does not carry one.
pub const DEFAULT_TITLE: &str = "Alert";

/// Build the log key for a message: `"{token}-{timestamp}"`.
///
/// Two messages for the same token within the same second share an id, and
/// the later one replaces the earlier in the log.
pub fn message_id(token: &str, timestamp: i64) -> String {
    format!("{}-{}", token, timestamp)
}

/// A message as submitted by a webhook caller.
///
/// Every field is optional on the wire so that missing required fields are
/// reported by [`validate`](Self::validate) rather than by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSubmission {
    /// Target device token.
    #[serde(default)]
    pub token: String,
    /// Notification title.
    #[serde(default)]
    pub title: Option<String>,
    /// Notification body.
    #[serde(default)]
    pub message: String,
    /// Link opened when the notification is tapped.
    #[serde(default)]
    pub url: Option<String>,
    /// Caller-supplied unix timestamp in seconds; 0 means "now".
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl MessageSubmission {
    /// Create a submission carrying only the required fields.
    pub fn new(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate and normalize into a [`PushMessage`].
    ///
    /// `now` (unix seconds) fills in an absent or zero timestamp. A blank
    /// title becomes [`DEFAULT_TITLE`] and a blank url is dropped.
    pub fn validate(self, now: i64) -> Result<PushMessage, ValidationError> {
        if self.token.trim().is_empty() {
            return Err(ValidationError::MissingToken);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::MissingMessage);
        }

        let timestamp = match self.timestamp {
            None | Some(0) => now,
            Some(ts) if ts < 0 => return Err(ValidationError::InvalidTimestamp(ts)),
            Some(ts) => ts,
        };

        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let url = self.url.filter(|u| !u.trim().is_empty());

        Ok(PushMessage {
            token: self.token,
            title,
            message: self.message,
            url,
            timestamp,
        })
    }
}

/// A validated message, ready to be logged and pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Target device token.
    pub token: String,
    /// Notification title.
    pub title: String,
    /// Notification body (never empty).
    pub message: String,
    /// Optional link.
    pub url: Option<String>,
    /// Unix timestamp in seconds (never zero).
    pub timestamp: i64,
}

impl PushMessage {
    /// The log id this message will be stored under.
    pub fn id(&self) -> String {
        message_id(&self.token, self.timestamp)
    }
}

/// A message as persisted in the log. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// `"{token}-{timestamp}"`.
    pub id: String,
    /// Device token the message targeted.
    pub token: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Optional link, omitted from the encoding when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Caller timestamp (unix seconds).
    pub timestamp: i64,
    /// When the store persisted the record.
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Stamp a validated message with its id and persistence time.
    pub fn from_message(message: PushMessage, created_at: DateTime<Utc>) -> Self {
        Self {
            id: message.id(),
            token: message.token,
            title: message.title,
            message: message.message,
            url: message.url,
            timestamp: message.timestamp,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn message_id_format() {
        assert_eq!(message_id("tok-abc", 1000), "tok-abc-1000");
    }

    #[test]
    fn validate_applies_defaults() {
        let msg = MessageSubmission::new("tok", "hello").validate(NOW).unwrap();

        assert_eq!(msg.title, DEFAULT_TITLE);
        assert_eq!(msg.timestamp, NOW);
        assert_eq!(msg.url, None);
        assert_eq!(msg.id(), format!("tok-{}", NOW));
    }

    #[test]
    fn validate_keeps_caller_fields() {
        let msg = MessageSubmission::new("tok", "hello")
            .with_title("Deploy")
            .with_url("https://example.com/run/1")
            .with_timestamp(1000)
            .validate(NOW)
            .unwrap();

        assert_eq!(msg.title, "Deploy");
        assert_eq!(msg.url.as_deref(), Some("https://example.com/run/1"));
        assert_eq!(msg.timestamp, 1000);
    }

    #[test]
    fn zero_timestamp_means_now() {
        let msg = MessageSubmission::new("tok", "hi")
            .with_timestamp(0)
            .validate(NOW)
            .unwrap();
        assert_eq!(msg.timestamp, NOW);
    }

    #[test]
    fn negative_timestamp_rejected() {
        let err = MessageSubmission::new("tok", "hi")
            .with_timestamp(-1)
            .validate(NOW)
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidTimestamp(-1));
    }

    #[test]
    fn blank_token_rejected() {
        let err = MessageSubmission::new("  ", "hi").validate(NOW).unwrap_err();
        assert_eq!(err, ValidationError::MissingToken);
    }

    #[test]
    fn blank_message_rejected() {
        let err = MessageSubmission::new("tok", "").validate(NOW).unwrap_err();
        assert_eq!(err, ValidationError::MissingMessage);
    }

    #[test]
    fn blank_title_and_url_normalized() {
        let msg = MessageSubmission::new("tok", "hi")
            .with_title(" ")
            .with_url("")
            .validate(NOW)
            .unwrap();
        assert_eq!(msg.title, DEFAULT_TITLE);
        assert_eq!(msg.url, None);
    }

    #[test]
    fn submission_decodes_with_missing_fields() {
        let sub: MessageSubmission = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(sub.token, "");
        assert_eq!(sub.validate(NOW).unwrap_err(), ValidationError::MissingToken);
    }

    #[test]
    fn record_encoding_omits_absent_url() {
        let msg = MessageSubmission::new("tok", "hi")
            .with_timestamp(1000)
            .validate(NOW)
            .unwrap();
        let record = MessageRecord::from_message(msg, DateTime::<Utc>::UNIX_EPOCH);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""id":"tok-1000""#));
        assert!(json.contains(r#""created_at":"1970-01-01T00:00:00Z""#));
        assert!(!json.contains("url"));

        let decoded: MessageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
