//! Topic registry
//!
//! Maps a topic to the callbacks currently subscribed to it. A single
//! [`parking_lot::Mutex`] guards the whole map together with the closed flag,
//! so checking the flag and taking a snapshot happen in one critical section.
//! The lock is only held for the map operation itself; callbacks never run
//! under it.
//!
//! A topic key exists only while it has at least one subscriber.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use subpub_types::{Error, Result, SubscriberId, Topic};

use crate::in_flight::{InFlight, InFlightGuard};

/// Subscriber callback.
///
/// Shared between the registry entry and any deliveries already scheduled,
/// and invoked from worker threads other than the one that registered it.
pub type Handler<M> = Arc<dyn Fn(M) + Send + Sync>;

struct State<M> {
    closed: bool,
    next_id: u64,
    topics: HashMap<Topic, HashMap<SubscriberId, Handler<M>>>,
}

/// Thread-safe map of topic → subscribers
pub struct Registry<M> {
    state: Mutex<State<M>>,
}

impl<M> Registry<M> {
    /// Create an empty, open registry
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                closed: false,
                next_id: 1,
                topics: HashMap::new(),
            }),
        }
    }

    /// Add `handler` under `topic` with a freshly allocated id.
    ///
    /// Fails with [`Error::Closed`] once [`Registry::close`] has run.
    pub fn register(&self, topic: &str, handler: Handler<M>) -> Result<SubscriberId> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        let id = SubscriberId(state.next_id);
        state.next_id += 1;
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .insert(id, handler);

        Ok(id)
    }

    /// Remove a subscriber. Returns whether anything was removed; removing an
    /// absent topic or id is a no-op.
    pub fn unregister(&self, topic: &str, id: SubscriberId) -> bool {
        let removed = {
            let mut state = self.state.lock();
            let Some(subscribers) = state.topics.get_mut(topic) else {
                return false;
            };

            let removed = subscribers.remove(&id);
            if subscribers.is_empty() {
                state.topics.remove(topic);
            }
            removed
        };

        // The handler is dropped here, outside the lock.
        removed.is_some()
    }

    /// Copy of the callbacks currently registered for `topic` (empty if none).
    pub fn snapshot(&self, topic: &str) -> Vec<Handler<M>> {
        let state = self.state.lock();
        state
            .topics
            .get(topic)
            .map(|subscribers| subscribers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot `topic` for dispatch.
    ///
    /// The closed check, the snapshot and the in-flight registration of every
    /// returned callback all happen under one lock acquisition, so a close
    /// that wins the lock afterwards is guaranteed to wait for these
    /// invocations, and a close that won it before rejects the whole publish.
    pub(crate) fn checkout(
        &self,
        topic: &str,
        in_flight: &InFlight,
    ) -> Result<Vec<(Handler<M>, InFlightGuard)>> {
        let state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        Ok(state
            .topics
            .get(topic)
            .map(|subscribers| {
                subscribers
                    .values()
                    .map(|handler| (Arc::clone(handler), in_flight.enter()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Mark the registry closed and drop every subscriber entry.
    ///
    /// Returns the number of entries removed on the first call and `None` on
    /// every later call.
    pub fn close(&self) -> Option<usize> {
        let topics = {
            let mut state = self.state.lock();
            if state.closed {
                return None;
            }
            state.closed = true;
            std::mem::take(&mut state.topics)
        };

        Some(topics.values().map(HashMap::len).sum())
    }

    /// Whether [`Registry::close`] has run
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.state.lock().topics.len()
    }

    /// Number of subscribers on `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .lock()
            .topics
            .get(topic)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Number of subscribers across all topics
    pub fn total_subscribers(&self) -> usize {
        self.state.lock().topics.values().map(HashMap::len).sum()
    }
}

impl<M> Default for Registry<M> {
    fn default() -> Self {
        Self::new()
    }
}
