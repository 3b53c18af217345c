//! SubPub Core - In-process topic broker
//!
//! This crate contains the broker implementation:
//! - Registry: topic → subscriber callbacks, guarded by one lock
//! - Broker: subscribe / publish / close with in-flight drain tracking
//! - Subscription: revocable handle returned by subscribe

pub mod broker;
mod in_flight;
pub mod registry;
pub mod subscription;
pub mod traits;

// Re-exports
pub use broker::Broker;
pub use registry::Handler;
pub use subscription::Subscription;
pub use traits::SubPub;
