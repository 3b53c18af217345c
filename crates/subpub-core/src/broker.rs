//! Broker - topic publish/subscribe facade
//!
//! The Broker owns the registry and coordinates the `Open -> Closed` lifecycle
//! plus in-flight delivery accounting.
//!
//! Each publish snapshots the topic's subscribers and schedules one
//! independent task per callback, then returns without waiting. Deliveries of
//! one publish race each other, and two publishes to the same subscriber may
//! complete in either order.

use std::sync::Arc;
use std::time::Duration;

use subpub_types::{BrokerConfig, BrokerStats, Error, Result};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::in_flight::{InFlight, InFlightGuard};
use crate::registry::{Handler, Registry};
use crate::subscription::{Revoke, Subscription};

/// State shared between broker clones and subscription handles
struct Shared<M> {
    registry: Registry<M>,
    in_flight: InFlight,
    /// Present when `max_concurrent_deliveries > 0`
    limiter: Option<Arc<Semaphore>>,
    runtime: Handle,
    config: BrokerConfig,
}

impl<M> Revoke for Shared<M> {
    fn revoke(&self, topic: &str, id: subpub_types::SubscriberId) {
        if self.registry.unregister(topic, id) {
            debug!(topic = %topic, subscriber = %id, "Unsubscribed");
        }
    }
}

/// In-process topic broker.
///
/// Cheap to clone; clones share one registry. Construct one per process (or
/// per test) and pass it to whatever needs it.
pub struct Broker<M> {
    shared: Arc<Shared<M>>,
}

impl<M> Clone for Broker<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<M> Broker<M>
where
    M: Clone + Send + 'static,
{
    /// Create a broker with default configuration on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Create a broker with custom configuration on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_config(config: BrokerConfig) -> Self {
        Self::with_runtime(config, Handle::current())
    }

    /// Create a broker that dispatches callbacks on the given runtime
    pub fn with_runtime(config: BrokerConfig, runtime: Handle) -> Self {
        let limiter = match config.max_concurrent_deliveries {
            0 => None,
            limit => Some(Arc::new(Semaphore::new(limit))),
        };

        debug!(
            max_concurrent_deliveries = config.max_concurrent_deliveries,
            "Initializing SubPub broker"
        );

        Self {
            shared: Arc::new(Shared {
                registry: Registry::new(),
                in_flight: InFlight::new(),
                limiter,
                runtime,
                config,
            }),
        }
    }

    /// Broker configuration
    pub fn config(&self) -> &BrokerConfig {
        &self.shared.config
    }

    // ==================== Subscriptions ====================

    /// Register `handler` on `topic`.
    ///
    /// Fails with [`Error::Closed`] after close.
    pub fn subscribe(&self, topic: &str, handler: Handler<M>) -> Result<Subscription> {
        let id = self.shared.registry.register(topic, handler)?;
        debug!(topic = %topic, subscriber = %id, "Subscribed");

        let owner: Arc<dyn Revoke> = self.shared.clone();
        Ok(Subscription::new(
            topic.to_string(),
            id,
            Arc::downgrade(&owner),
        ))
    }

    /// Register a closure on `topic`
    pub fn subscribe_fn<F>(&self, topic: &str, f: F) -> Result<Subscription>
    where
        F: Fn(M) + Send + Sync + 'static,
    {
        self.subscribe(topic, Arc::new(f))
    }

    // ==================== Publishing ====================

    /// Deliver `msg` to every subscriber currently registered on `topic`.
    ///
    /// Returns once every delivery is scheduled. Publishing to a topic with no
    /// subscribers succeeds and does nothing. After close the whole publish
    /// is rejected with [`Error::Closed`]; nothing is dispatched.
    pub fn publish(&self, topic: &str, msg: M) -> Result<()> {
        let deliveries = self
            .shared
            .registry
            .checkout(topic, &self.shared.in_flight)?;

        if deliveries.is_empty() {
            trace!(topic = %topic, "No subscribers");
            return Ok(());
        }

        trace!(topic = %topic, subscribers = deliveries.len(), "Dispatching message");

        let topic: Arc<str> = Arc::from(topic);
        for (handler, guard) in deliveries {
            self.dispatch(Arc::clone(&topic), handler, guard, msg.clone());
        }

        Ok(())
    }

    /// Run one callback on the blocking pool.
    ///
    /// The guard moves into the task and is released when the task ends,
    /// whether the callback returned, panicked, or the runtime shut down.
    fn dispatch(&self, topic: Arc<str>, handler: Handler<M>, guard: InFlightGuard, msg: M) {
        let limiter = self.shared.limiter.clone();

        self.shared.runtime.spawn(async move {
            let _guard = guard;
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };

            if let Err(err) = tokio::task::spawn_blocking(move || handler(msg)).await {
                if err.is_panic() {
                    warn!(topic = %topic, "Subscriber callback panicked");
                }
            }
        });
    }

    // ==================== Lifecycle ====================

    /// Close the broker and wait for in-flight deliveries until `deadline`.
    ///
    /// The first call rejects all further subscribes and publishes, drops
    /// every subscriber entry, then waits. It returns `Ok` once nothing is in
    /// flight, or [`Error::DeadlineExceeded`] if the deadline fires first; the
    /// broker stays closed either way and running callbacks are never
    /// interrupted.
    ///
    /// Later calls do not wait: they report the current in-flight count.
    pub async fn close(&self, deadline: Instant) -> Result<()> {
        match self.shared.registry.close() {
            Some(removed) => {
                debug!(
                    subscribers = removed,
                    in_flight = self.shared.in_flight.count(),
                    "Closing broker"
                );
                self.drain(deadline).await
            }
            None => match self.shared.in_flight.count() {
                0 => Ok(()),
                in_flight => Err(Error::DeadlineExceeded { in_flight }),
            },
        }
    }

    /// [`Broker::close`] with a deadline `timeout` from now
    pub async fn close_timeout(&self, timeout: Duration) -> Result<()> {
        self.close(Instant::now() + timeout).await
    }

    async fn drain(&self, deadline: Instant) -> Result<()> {
        let in_flight = &self.shared.in_flight;
        if in_flight.count() == 0 {
            debug!("Broker closed");
            return Ok(());
        }

        match tokio::time::timeout_at(deadline, in_flight.wait_idle()).await {
            Ok(()) => {
                debug!("Broker drained and closed");
                Ok(())
            }
            Err(_) => match in_flight.count() {
                0 => Ok(()),
                remaining => {
                    warn!(in_flight = remaining, "Close deadline exceeded");
                    Err(Error::DeadlineExceeded {
                        in_flight: remaining,
                    })
                }
            },
        }
    }

    // ==================== Introspection ====================

    /// Whether close has been called
    pub fn is_closed(&self) -> bool {
        self.shared.registry.is_closed()
    }

    /// Callback invocations scheduled but not finished
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.count()
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.shared.registry.topic_count()
    }

    /// Number of subscribers on `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.shared.registry.subscriber_count(topic)
    }

    /// Point-in-time statistics
    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            topic_count: self.shared.registry.topic_count(),
            subscriber_count: self.shared.registry.total_subscribers(),
            in_flight: self.shared.in_flight.count(),
            closed: self.shared.registry.is_closed(),
        }
    }
}

impl<M> Default for Broker<M>
where
    M: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
