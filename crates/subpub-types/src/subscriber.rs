//! Subscriber identity types

/// Topic name. Any string is a valid topic, including the empty string;
/// no validation or normalization is applied.
pub type Topic = String;

/// Unique identifier for a subscriber.
///
/// Allocated by the broker from a monotonically increasing counter, so an id
/// is never handed out twice over the lifetime of one broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl SubscriberId {
    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}
