//! Subscription handle
//!
//! Returned by subscribe; its only operation is revocation. The handle keeps a
//! weak reference to the broker, so it never extends the broker's lifetime and
//! revoking after the broker is gone is a no-op.

use std::sync::Weak;

use subpub_types::{SubscriberId, Topic};

/// Anything a subscription can be revoked from
pub(crate) trait Revoke: Send + Sync {
    fn revoke(&self, topic: &str, id: SubscriberId);
}

/// Revocable handle for one registered callback.
///
/// Dropping the handle does not unsubscribe; call
/// [`Subscription::unsubscribe`] explicitly.
pub struct Subscription {
    topic: Topic,
    id: SubscriberId,
    owner: Weak<dyn Revoke>,
}

impl Subscription {
    pub(crate) fn new(topic: Topic, id: SubscriberId, owner: Weak<dyn Revoke>) -> Self {
        Self { topic, id, owner }
    }

    /// Remove the callback from its topic.
    ///
    /// Idempotent, and safe to call after the broker has been closed or dropped.
    pub fn unsubscribe(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.revoke(&self.topic, self.id);
        }
    }

    /// Topic this subscription is registered on
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Identifier allocated for this subscription
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}
