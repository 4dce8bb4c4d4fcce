//! Novelly SPA Host
//!
//! Serves the built browser UI and forwards its REST calls to the backend,
//! so the UI can use the relative `/api` base.
//!
//! # Endpoints
//!
//! - `ANY /api`, `ANY /api/*` - Forwarded to `backend_url`
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//! - anything else - Static file, or `index.html` for extension-less paths

pub mod error;
pub mod health;
pub mod proxy;
pub mod spa;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use state::ServerState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;

/// Cover uploads go through the proxy
const MAX_PROXY_BODY: usize = 50 * 1024 * 1024;

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the router with all routes and middleware
pub fn build_router(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        .route("/api", any(proxy::forward))
        .route("/api/*path", any(proxy::forward))
        .layer(DefaultBodyLimit::max(MAX_PROXY_BODY));

    let health_routes = Router::new()
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/", get(health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .merge(api_routes)
        .nest("/health", health_routes)
        .fallback(spa::serve_ui)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Start the SPA host
pub async fn serve(state: ServerState) -> ServerResult<()> {
    let addr = state.config.addr();
    let static_dir = state.config.static_dir.clone();
    let backend = state.config.backend_url.clone();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Novelly listening on {}", addr);
    tracing::info!("Serving UI from {} and proxying /api to {}", static_dir, backend);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Novelly shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderMap, Request, StatusCode, Uri},
        Json,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn test_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn create_test_app(backend_url: &str) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>novelly</html>").unwrap();
        std::fs::write(dir.path().join("app.css"), "body{}").unwrap();

        let config = ServerConfig {
            static_dir: dir.path().to_string_lossy().to_string(),
            backend_url: backend_url.to_string(),
            ..ServerConfig::default()
        };
        let router = build_router(ServerState::with_client(config, test_client()));
        (router, dir)
    }

    async fn echo(uri: Uri, headers: HeaderMap) -> Json<Value> {
        Json(json!({
            "uri": uri.to_string(),
            "authorization": headers
                .get("authorization")
                .and_then(|v| v.to_str().ok()),
        }))
    }

    async fn conflict() -> (StatusCode, Json<Value>) {
        (
            StatusCode::CONFLICT,
            Json(json!({"message": "Novel already in library"})),
        )
    }

    /// Backend stand-in on an ephemeral port
    async fn spawn_backend() -> String {
        let backend = Router::new()
            .route("/api/novels", get(echo))
            .route("/api/users/1/library/2", axum::routing::post(conflict));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app("http://127.0.0.1:1");

        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_backend() {
        let (app, _dir) = create_test_app("http://127.0.0.1:1");

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["status"], "degraded");
        assert_eq!(health["ui"], "ok");
        assert_eq!(health["backend"], "unreachable");
    }

    #[tokio::test]
    async fn test_ready_requires_index() {
        let (app, dir) = create_test_app("http://127.0.0.1:1");
        std::fs::remove_file(dir.path().join("index.html")).unwrap();

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_spa_paths_serve_index() {
        let (app, _dir) = create_test_app("http://127.0.0.1:1");

        for uri in ["/", "/library", "/novel/42"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            assert_eq!(body_text(response).await, "<html>novelly</html>");
        }
    }

    #[tokio::test]
    async fn test_assets_served_or_missing() {
        let (app, _dir) = create_test_app("http://127.0.0.1:1");

        let css = app
            .clone()
            .oneshot(Request::builder().uri("/app.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(css.status(), StatusCode::OK);
        assert_eq!(body_text(css).await, "body{}");

        let missing = app
            .oneshot(Request::builder().uri("/missing.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_proxy_forwards_query_and_auth() {
        let backend = spawn_backend().await;
        let (app, _dir) = create_test_app(&backend);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/novels?q=dune")
                    .header("Authorization", "Bearer jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let echoed: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(echoed["uri"], "/api/novels?q=dune");
        assert_eq!(echoed["authorization"], "Bearer jwt");
    }

    #[tokio::test]
    async fn test_proxy_passes_backend_errors_through() {
        let backend = spawn_backend().await;
        let (app, _dir) = create_test_app(&backend);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/1/library/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("already in library"));
    }

    #[tokio::test]
    async fn test_proxy_unreachable_backend_is_bad_gateway() {
        let (app, _dir) = create_test_app("http://127.0.0.1:1");

        let response = app
            .oneshot(Request::builder().uri("/api/novels").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "BAD_GATEWAY");
        assert!(body["request_id"].as_str().is_some());
    }
}
