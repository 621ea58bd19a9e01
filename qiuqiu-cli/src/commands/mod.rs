//! CLI command implementations.

pub mod device;
pub mod message;
