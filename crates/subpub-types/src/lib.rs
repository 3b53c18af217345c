//! SubPub Types - Shared domain types for the topic broker
//!
//! This crate contains the types used across SubPub components.

pub mod broker;
pub mod error;
pub mod subscriber;

// Re-export commonly used types
pub use broker::{BrokerConfig, BrokerStats};
pub use error::{Error, Result};
pub use subscriber::{SubscriberId, Topic};
