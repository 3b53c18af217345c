//! Broker trait definition
//!
//! Defines the interface adapters depend on, so they can be handed any broker
//! implementation behind an `Arc<dyn SubPub<M>>`.

use async_trait::async_trait;
use subpub_types::{BrokerStats, Result};
use tokio::time::Instant;

use crate::broker::Broker;
use crate::registry::Handler;
use crate::subscription::Subscription;

/// Publish/subscribe broker - all brokers implement this
#[async_trait]
pub trait SubPub<M>: Send + Sync {
    /// Register a callback on a topic
    fn subscribe(&self, topic: &str, handler: Handler<M>) -> Result<Subscription>;

    /// Schedule delivery of a message to the topic's current subscribers
    fn publish(&self, topic: &str, msg: M) -> Result<()>;

    /// Stop accepting work and wait for in-flight deliveries until `deadline`
    async fn close(&self, deadline: Instant) -> Result<()>;

    /// Point-in-time statistics
    fn stats(&self) -> BrokerStats;
}

#[async_trait]
impl<M> SubPub<M> for Broker<M>
where
    M: Clone + Send + 'static,
{
    fn subscribe(&self, topic: &str, handler: Handler<M>) -> Result<Subscription> {
        Broker::subscribe(self, topic, handler)
    }

    fn publish(&self, topic: &str, msg: M) -> Result<()> {
        Broker::publish(self, topic, msg)
    }

    async fn close(&self, deadline: Instant) -> Result<()> {
        Broker::close(self, deadline).await
    }

    fn stats(&self) -> BrokerStats {
        Broker::stats(self)
    }
}
