//! HTTP surface: route table, handlers and server startup.
//!
//! Every card-producing route runs the same pipeline: check method and
//! content type, decode the body, render the card, relay it, then echo the
//! exact relayed bytes back to the caller.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cards::{CardSchema, RenderCard};
use crate::config::Config;
use crate::error::RelayServiceError;
use crate::events::{Event, EventKind};
use crate::relay::Relay;

/// State shared by all handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<dyn Relay>,
}

impl AppState {
    pub fn new(config: Config, relay: Arc<dyn Relay>) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}

/// One card-producing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub event: EventKind,
    pub schema: CardSchema,
}

/// Card-producing endpoints. `/` takes build events from senders that predate
/// the per-kind paths.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/alert",
        event: EventKind::Incident,
        schema: CardSchema::Legacy,
    },
    Route {
        path: "/alert/workflow",
        event: EventKind::Incident,
        schema: CardSchema::Adaptive,
    },
    Route {
        path: "/cicd",
        event: EventKind::Build,
        schema: CardSchema::Legacy,
    },
    Route {
        path: "/cicd/workflow",
        event: EventKind::Build,
        schema: CardSchema::Adaptive,
    },
    Route {
        path: "/",
        event: EventKind::Build,
        schema: CardSchema::Legacy,
    },
];

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    let mut router = Router::new().route("/health", get(health_handler));
    for &route in ROUTES {
        router = router.route(
            route.path,
            any(
                move |State(state): State<AppState>,
                      method: Method,
                      headers: HeaderMap,
                      body: Bytes| async move {
                    relay_handler(state, route, method, headers, body).await
                },
            ),
        );
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Card relay listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Card relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn relay_handler(
    state: AppState,
    route: Route,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayServiceError> {
    let span = info_span!(
        "relay",
        request_id = %Uuid::new_v4(),
        path = route.path,
        event = route.event.as_str(),
        schema = route.schema.as_str(),
    );

    async {
        relay_card(&state, route, &method, &headers, &body)
            .await
            .inspect_err(|e| warn!(kind = e.kind(), error = %e, "Relay request failed"))
    }
    .instrument(span)
    .await
}

async fn relay_card(
    state: &AppState,
    route: Route,
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, RelayServiceError> {
    if *method != Method::POST || !is_json(headers) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        warn!(%method, content_type, "Invalid method or content type");
        return Err(RelayServiceError::InvalidRequest);
    }

    let event = Event::decode(route.event, body)?;
    let card = event.render(route.schema)?;
    let payload = card.to_json().map_err(RelayServiceError::Encode)?;

    state
        .relay
        .deliver(state.config.destination(route.schema), payload.clone())
        .await?;

    info!(relay = state.relay.name(), bytes = payload.len(), "Card relayed");
    Ok(([(header::CONTENT_TYPE, "application/json")], payload).into_response())
}

/// Media type is `application/json`; parameters such as `charset` are allowed.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::relay::MockRelay;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use reqwest::Url;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    const LEGACY_HOOK: &str = "https://legacy.example/webhookb2/secret";
    const ADAPTIVE_HOOK: &str = "https://adaptive.example/workflows/secret";

    fn config() -> Config {
        Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            legacy_webhook: Url::parse(LEGACY_HOOK).unwrap(),
            adaptive_webhook: Url::parse(ADAPTIVE_HOOK).unwrap(),
            relay_timeout: Duration::from_secs(5),
            max_body_bytes: 1024,
        }
    }

    fn router(relay: MockRelay) -> Router {
        build_router(AppState::new(config(), Arc::new(relay)))
    }

    fn unused_relay() -> MockRelay {
        let mut relay = MockRelay::new();
        relay.expect_deliver().never();
        relay
    }

    fn post(path: &str, content_type: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(is_json(&headers));
        headers.insert(
            header::CONTENT_TYPE,
            "Application/JSON; charset=utf-8".parse().unwrap(),
        );
        assert!(is_json(&headers));
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&headers));
    }

    #[tokio::test]
    async fn test_wrong_method_is_bad_request() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/alert")
            .body(Body::empty())
            .unwrap();

        let response = router(unused_relay()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "invalid request");
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_bad_request() {
        let response = router(unused_relay())
            .oneshot(post("/cicd", "text/plain", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let response = router(unused_relay())
            .oneshot(post("/alert", "application/json", "{\"incident\":"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response)
            .await
            .starts_with("decode_error: malformed JSON"));
    }

    #[tokio::test]
    async fn test_mistyped_body_is_bad_request() {
        let response = router(unused_relay())
            .oneshot(post("/cicd/workflow", "application/json", r#"{"tag":1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response)
            .await
            .starts_with("decode_error: type mismatch"));
    }

    #[tokio::test]
    async fn test_unrepresentable_timestamp_is_unprocessable() {
        let body = format!(r#"{{"incident":{{"started_at":{}}}}}"#, i64::MAX);
        let response = router(unused_relay())
            .oneshot(post("/alert", "application/json", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let body = format!(r#"{{"tag":"{}"}}"#, "x".repeat(4096));
        let response = router(unused_relay())
            .oneshot(post("/cicd", "application/json", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_array_body_is_bad_request() {
        let response = router(unused_relay())
            .oneshot(post("/cicd", "application/json", "[]"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response)
            .await
            .starts_with("decode_error: type mismatch"));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_is_logged_inside_request_span() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = router(unused_relay())
            .oneshot(post("/cicd", "application/json", "[]"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("Relay request failed"))
            .unwrap();
        assert!(line.contains("request_id="), "{line}");
        assert!(line.contains("/cicd"), "{line}");
        assert!(line.contains("event=\"build\""), "{line}");
        assert!(line.contains("schema=\"legacy\""), "{line}");
    }

    #[tokio::test]
    async fn test_relay_failure_is_bad_gateway_without_url() {
        let mut relay = MockRelay::new();
        relay.expect_name().return_const("mock");
        relay.expect_deliver().times(1).returning(|_, _| {
            Err(RelayError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        });

        let response = router(relay)
            .oneshot(post("/cicd", "application/json", r#"{"status":"SUCCESS"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_string(response).await;
        assert_eq!(body, "relay_error: webhook returned 503 Service Unavailable");
        assert!(!body.contains("secret"));
    }

    #[tokio::test]
    async fn test_success_echoes_relayed_payload() {
        let relayed = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&relayed);

        let mut relay = MockRelay::new();
        relay.expect_name().return_const("mock");
        relay
            .expect_deliver()
            .withf(|destination, _| destination == ADAPTIVE_HOOK)
            .times(1)
            .returning(move |_, payload| {
                *captured.lock().unwrap() = payload;
                Ok(())
            });

        let response = router(relay)
            .oneshot(post(
                "/alert/workflow",
                "application/json; charset=utf-8",
                r#"{"incident":{"incident_id":"INC9","state":"open"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_string(response).await;
        assert_eq!(body.as_bytes(), relayed.lock().unwrap().as_slice());
        assert!(body.contains("*Incident ID*: INC9"));
    }

    #[tokio::test]
    async fn test_routes_pick_schema_destination() {
        for route in ROUTES {
            let expected = match route.schema {
                CardSchema::Legacy => LEGACY_HOOK,
                CardSchema::Adaptive => ADAPTIVE_HOOK,
            };

            let mut relay = MockRelay::new();
            relay.expect_name().return_const("mock");
            relay
                .expect_deliver()
                .withf(move |destination, _| destination == expected)
                .times(1)
                .returning(|_, _| Ok(()));

            let response = router(relay)
                .oneshot(post(route.path, "application/json", "{}"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "route {}", route.path);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router(unused_relay()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("healthy"));
    }
}
