//! # qiuqiu-types
//!
//! Types shared between the QiuQiu webhook boundary, the device store and
//! the push dispatcher:
//! - [`MessageSubmission`] - Inbound webhook shape, validated into a [`PushMessage`]
//! - [`MessageRecord`] - The immutable unit appended to the message log
//! - [`PushPayload`] - What the push transport receives for a resolved device
//! - [`ValidationError`] - Boundary validation failures

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod message;
mod payload;

pub use error::ValidationError;
pub use message::{message_id, MessageRecord, MessageSubmission, PushMessage, DEFAULT_TITLE};
pub use payload::{PushPayload, DEFAULT_SOUND};
