use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::engine::Reproducer;
use crate::light::EntityState;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    version: &'static str,
    reproducer: Arc<Reproducer>,
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/states
#[tracing::instrument(skip(state))]
async fn list_states(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.reproducer.store().snapshot();
    let mut states: Vec<EntityState> = snapshot.values().cloned().collect();
    states.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    Json(states)
}

/// Handler for GET /v1/states/:entity_id
#[tracing::instrument(skip(state))]
async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(entity_id): Path<String>,
) -> axum::response::Response {
    match state.reproducer.store().get(&entity_id) {
        Some(entity) => (StatusCode::OK, Json(entity)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown entity: {}", entity_id),
            }),
        )
            .into_response(),
    }
}

/// Handler for PUT /v1/states/:entity_id
///
/// Records an observed state reported by the host.
#[tracing::instrument(skip(state, body))]
async fn put_state(
    State(state): State<Arc<AppState>>,
    Path(entity_id): Path<String>,
    Json(body): Json<EntityState>,
) -> axum::response::Response {
    if body.entity_id != entity_id {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "entity id mismatch: path {} body {}",
                    entity_id, body.entity_id
                ),
            }),
        )
            .into_response();
    }

    tracing::debug!("Observed state for {}: {}", entity_id, body.state);
    state.reproducer.store().set(body);
    StatusCode::NO_CONTENT.into_response()
}

/// Handler for POST /v1/reproduce
#[tracing::instrument(skip(state, desired))]
async fn reproduce(
    State(state): State<Arc<AppState>>,
    Json(desired): Json<Vec<EntityState>>,
) -> impl IntoResponse {
    let report = state.reproducer.reproduce(desired).await;
    (StatusCode::OK, Json(report))
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/states", get(list_states))
        .route("/v1/states/:entity_id", get(get_state).put(put_state))
        .route("/v1/reproduce", post(reproduce))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Serves until `shutdown_rx` fires.
pub async fn serve(
    listen: String,
    port: u16,
    reproducer: Arc<Reproducer>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState {
        version,
        reproducer,
    });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::engine::ChannelDispatcher;
    use crate::engine::CommandReceiver;
    use crate::engine::StateStore;
    use crate::light::AttributeSpec;

    fn router() -> (Router, CommandReceiver) {
        let (dispatcher, rx) = ChannelDispatcher::new();
        let reproducer = Reproducer::new(
            Arc::new(AttributeSpec::standard()),
            Arc::new(StateStore::new()),
            Arc::new(dispatcher),
        );
        let state = Arc::new(AppState {
            version: "test",
            reproducer: Arc::new(reproducer),
        });
        (create_router(state), rx)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, _rx) = router();
        let (status, body) = send(&app, "GET", "/v1/ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_info() {
        let (app, _rx) = router();
        let (status, body) = send(&app, "GET", "/v1/info", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "test");
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let (app, _rx) = router();

        let (status, _) = send(&app, "GET", "/v1/states/light.hall", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let observed = json!({
            "entity_id": "light.hall",
            "state": "on",
            "attributes": {"brightness": 180},
        });
        let (status, _) = send(
            &app,
            "PUT",
            "/v1/states/light.hall",
            Some(observed.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", "/v1/states/light.hall", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, observed);

        let (status, body) = send(&app, "GET", "/v1/states", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([observed]));
    }

    #[tokio::test]
    async fn test_put_state_rejects_mismatched_id() {
        let (app, _rx) = router();
        let (status, _) = send(
            &app,
            "PUT",
            "/v1/states/light.hall",
            Some(json!({"entity_id": "light.kitchen", "state": "on"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reproduce() {
        let (app, mut rx) = router();

        send(
            &app,
            "PUT",
            "/v1/states/light.hall",
            Some(json!({"entity_id": "light.hall", "state": "on", "attributes": {"brightness": 180}})),
        )
        .await;

        let (status, body) = send(
            &app,
            "POST",
            "/v1/reproduce",
            Some(json!([
                {"entity_id": "light.hall", "state": "on", "attributes": {"brightness": 180}},
                {"entity_id": "light.kitchen", "state": "on", "attributes": {"brightness_pct": 80}},
                {"entity_id": "light.porch", "state": "not_supported"},
            ])),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        insta::assert_snapshot!(body.to_string(), @r#"{"dispatched":[{"brightness":204,"entity_id":"light.kitchen","service":"turn_on"}],"failed":[],"unchanged":["light.hall"],"unsupported":[{"entity_id":"light.porch","state":"not_supported"}]}"#);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
