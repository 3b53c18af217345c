//! Request/response types for the HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Publish request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Topic to publish to (any string, including empty)
    pub key: String,
    /// Message payload
    #[serde(default)]
    pub data: String,
}

/// Publish acknowledgement (an empty object)
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {}

/// Subscribe query parameters
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeQuery {
    /// Topic to subscribe to (any string, including empty)
    #[serde(default)]
    pub key: String,
}

/// One delivered message, sent as the data of a server-sent event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Message payload
    pub data: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Health status (`healthy` or `closing`)
    pub status: String,
    /// Server version
    pub version: String,
    /// Topics with at least one subscriber
    pub topics: usize,
    /// Registered subscribers across all topics
    pub subscribers: usize,
    /// Deliveries scheduled but not finished
    pub in_flight: usize,
}
