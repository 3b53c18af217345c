//! SubPub Server - HTTP front end for the topic broker
//!
//! Exposes the broker's two remote operations:
//! - `POST /api/v1/publish` publishes `{ key, data }` and acks with `{}`
//! - `GET /api/v1/subscribe?key=...` streams deliveries as server-sent events

pub mod api;
pub mod config;
pub mod error;
pub mod routes;
pub mod shutdown;
pub mod stream;

pub use config::{Args, ServerConfig};
pub use error::AppError;

use std::sync::Arc;

use axum::Router;
use bytes::Bytes;
use subpub_core::SubPub;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{Event, HealthResponse, PublishRequest, PublishResponse, SubscribeQuery};
use crate::error::ApiErrorBody;

// ==================== App State ====================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Broker behind the API
    pub broker: Arc<dyn SubPub<Bytes>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(broker: Arc<dyn SubPub<Bytes>>) -> Self {
        Self { broker }
    }
}

// ==================== OpenAPI Documentation ====================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SubPub API",
        version = "0.1.0",
        description = "SubPub - topic publish/subscribe API",
        license(name = "MIT OR Apache-2.0")
    ),
    paths(
        routes::health::health,
        routes::publish::publish,
        routes::subscribe::subscribe,
    ),
    components(
        schemas(
            HealthResponse,
            PublishRequest,
            PublishResponse,
            SubscribeQuery,
            Event,
            ApiErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "messages", description = "Publish and subscribe endpoints")
    )
)]
pub struct ApiDoc;

// ==================== Router ====================

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::routes())
        .merge(routes::publish::routes())
        .merge(routes::subscribe::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use futures::StreamExt;
    use std::time::Duration;
    use subpub_core::Broker;
    use tower::ServiceExt;

    const WAIT: Duration = Duration::from_millis(500);

    fn create_test_app() -> (Broker<Bytes>, Router) {
        let broker = Broker::<Bytes>::new();
        let app = create_router(AppState::new(Arc::new(broker.clone())));
        (broker, app)
    }

    fn publish_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/publish")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn subscribe_request(key: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/v1/subscribe?key={key}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_broker, app) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["topics"], 0);
    }

    #[tokio::test]
    async fn test_publish_acks() {
        for body in [
            r#"{"key":"test-topic","data":"test message"}"#,
            r#"{"key":"","data":"test message"}"#,
            r#"{"key":"test-topic","data":""}"#,
        ] {
            let (_broker, app) = create_test_app();
            let response = app.oneshot(publish_request(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, serde_json::json!({}));
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let (broker, app) = create_test_app();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        broker
            .subscribe_fn("t", move |msg: Bytes| {
                let _ = tx.send(msg);
            })
            .unwrap();

        let response = app
            .oneshot(publish_request(r#"{"key":"t","data":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let got = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(&got[..], b"hello");
    }

    #[tokio::test]
    async fn test_publish_after_close_is_invalid_argument() {
        let (broker, app) = create_test_app();
        broker.close_timeout(Duration::from_millis(100)).await.unwrap();

        let response = app
            .oneshot(publish_request(r#"{"key":"t","data":"x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_publish_malformed_body() {
        let (_broker, app) = create_test_app();

        let response = app.oneshot(publish_request("not json")).await.unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_subscribe_streams_events() {
        let (broker, app) = create_test_app();

        let response = app.oneshot(subscribe_request("test-key")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        assert_eq!(broker.subscriber_count("test-key"), 1);

        broker
            .publish("test-key", Bytes::from("тестовое сообщение"))
            .unwrap();

        let mut body = response.into_body().into_data_stream();
        let frame = tokio::time::timeout(WAIT, body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let frame = String::from_utf8(frame.to_vec()).unwrap();
        assert!(
            frame.contains(r#"data: {"data":"тестовое сообщение"}"#),
            "{frame}"
        );

        drop(body);
        assert_eq!(broker.subscriber_count("test-key"), 0);
    }

    #[tokio::test]
    async fn test_subscribe_empty_key() {
        let (broker, app) = create_test_app();

        let response = app.oneshot(subscribe_request("")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(broker.subscriber_count(""), 1);
    }

    #[tokio::test]
    async fn test_subscribe_stream_ends_on_close() {
        let (broker, app) = create_test_app();
        let response = app.oneshot(subscribe_request("t")).await.unwrap();

        broker.close_timeout(Duration::from_millis(100)).await.unwrap();

        let mut body = response.into_body().into_data_stream();
        let next = tokio::time::timeout(WAIT, body.next()).await.unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_subscribe_after_close_is_invalid_argument() {
        let (broker, app) = create_test_app();
        broker.close_timeout(Duration::from_millis(100)).await.unwrap();

        let response = app.oneshot(subscribe_request("t")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (_broker, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/api/v1/publish"].is_object());
        assert!(body["paths"]["/api/v1/subscribe"].is_object());
    }
}
