//! Subscribe endpoint (server-sent events).

use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use subpub_types::Error;
use tracing::info;

use crate::api::{Event, SubscribeQuery};
use crate::error::{ApiErrorBody, AppError};
use crate::stream::EventStream;
use crate::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Subscribe routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/subscribe", get(subscribe))
}

/// Subscribe to a topic
///
/// Streams every message published to the topic as a server-sent event
/// until the client disconnects or the broker shuts down.
#[utoipa::path(
    get,
    path = "/api/v1/subscribe",
    tag = "messages",
    params(
        ("key" = Option<String>, Query, description = "Topic to subscribe to")
    ),
    responses(
        (status = 200, description = "Stream of events", body = Event, content_type = "text/event-stream"),
        (status = 400, description = "Broker is closed", body = ApiErrorBody)
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Error>>>, AppError> {
    let events = EventStream::subscribe(state.broker.as_ref(), &query.key)?;
    info!(topic = %events.topic(), "Client subscribed");

    let stream = events.map(encode_event);
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

/// Frame one delivered payload as an SSE event carrying `{"data": ...}`.
fn encode_event(payload: Bytes) -> Result<SseEvent, Error> {
    let data = String::from_utf8(payload.to_vec())
        .map_err(|e| Error::Internal(format!("payload is not UTF-8: {e}")))?;
    let json = serde_json::to_string(&Event { data })
        .map_err(|e| Error::Internal(format!("failed to encode event: {e}")))?;
    Ok(SseEvent::default().data(json))
}
