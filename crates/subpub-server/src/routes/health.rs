//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::api::HealthResponse;
use crate::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server health and broker statistics", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.broker.stats();

    Json(HealthResponse {
        status: if stats.closed { "closing" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        topics: stats.topic_count,
        subscribers: stats.subscriber_count,
        in_flight: stats.in_flight,
    })
}
