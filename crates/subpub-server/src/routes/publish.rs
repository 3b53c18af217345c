//! Publish endpoint.

use axum::{extract::State, routing::post, Json, Router};
use bytes::Bytes;
use tracing::debug;

use crate::api::{PublishRequest, PublishResponse};
use crate::error::{ApiErrorBody, AppError};
use crate::AppState;

/// Publish routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/publish", post(publish))
}

/// Publish a message to a topic
///
/// Returns once delivery to the topic's current subscribers is scheduled.
/// Publishing to a topic with no subscribers succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/publish",
    tag = "messages",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Message accepted", body = PublishResponse),
        (status = 400, description = "Broker is closed", body = ApiErrorBody)
    )
)]
pub async fn publish(
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, AppError> {
    debug!(topic = %req.key, bytes = req.data.len(), "Publishing message");
    state.broker.publish(&req.key, Bytes::from(req.data))?;
    Ok(Json(PublishResponse {}))
}
