//! Static UI serving
//!
//! Paths whose last segment has a dot are files (`app.css`, `novelly_ui_bg.wasm`)
//! and are served as-is. Everything else gets `index.html` so deep links land
//! in the client router.

use axum::{
    extract::{Request, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use super::state::ServerState;

pub fn is_asset_path(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

pub async fn serve_ui(State(state): State<Arc<ServerState>>, mut request: Request) -> Response {
    if !is_asset_path(request.uri().path()) {
        *request.uri_mut() = Uri::from_static("/index.html");
    }

    let service = ServeDir::new(state.static_dir());
    match service.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_detection() {
        assert!(is_asset_path("/app.css"));
        assert!(is_asset_path("/assets/placeholder.png"));
        assert!(!is_asset_path("/"));
        assert!(!is_asset_path("/novel/42"));
        assert!(!is_asset_path("/v1.2/library"));
    }
}
