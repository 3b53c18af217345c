//! Broker configuration and statistics types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Broker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BrokerConfig {
    /// Maximum number of subscriber callbacks running at once (0 = unlimited)
    ///
    /// Deliveries over the limit wait inside their dispatched task, never in
    /// `publish`, and count as in flight while they wait.
    #[serde(default)]
    pub max_concurrent_deliveries: usize,
}

impl BrokerConfig {
    /// Set the concurrent delivery limit (0 = unlimited)
    pub fn with_max_concurrent_deliveries(mut self, limit: usize) -> Self {
        self.max_concurrent_deliveries = limit;
        self
    }

    /// Whether callbacks are dispatched without a concurrency cap
    pub fn is_unbounded(&self) -> bool {
        self.max_concurrent_deliveries == 0
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deliveries: 0,
        }
    }
}

/// Point-in-time broker statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BrokerStats {
    /// Number of topics with at least one subscriber
    pub topic_count: usize,

    /// Total number of registered subscribers across all topics
    pub subscriber_count: usize,

    /// Callback invocations dispatched but not yet finished
    pub in_flight: usize,

    /// Whether the broker has been closed
    pub closed: bool,
}
