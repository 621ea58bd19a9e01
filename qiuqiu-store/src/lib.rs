//! # qiuqiu-store
//!
//! Persistent device registry and message log for QiuQiu push.
//!
//! This crate keeps:
//! - A device key → push token binding, with a token → key reverse index
//! - An append-only log of messages submitted for each token
//!
//! Two interchangeable backends implement [`DeviceStore`]:
//!
//! ```text
//!            ┌──────────────────────────────┐
//! webhook ──►│         DeviceStore          │◄── push dispatch
//!            └──────┬────────────────┬──────┘
//!                   │                │
//!        ┌──────────┴───────┐  ┌─────┴───────────┐
//!        │    RedbStore     │  │   MemoryStore   │
//!        │ device_tokens    │  │ one fixed key,  │
//!        │ device_tokens_   │  │ messages are    │
//!        │   reverse        │  │ not retained    │
//!        │ qiuqiu_messages  │  │                 │
//!        └──────────────────┘  └─────────────────┘
//! ```
//!
//! The backend is chosen once at startup with [`open_store`] and shared as
//! an `Arc<dyn DeviceStore>`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod registry;
pub mod storage;

pub use config::{BackendKind, Config, StorageConfig};
pub use error::{ErrorKind, QiuQiuError, StorageError};
pub use registry::{accept_submission, prepare_push, resolve_device_key};
pub use storage::{open_store, DeviceStore, MemoryStore, RedbStore, MEMORY_DEVICE_KEY};
