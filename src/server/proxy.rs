//! `/api/*` forwarding to the backend
//!
//! The browser UI talks to `/api` on its own origin; this handler replays the
//! request against the configured backend and streams the answer back with
//! status and headers intact.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::Response,
};
use std::sync::Arc;

use super::error::{ServerError, ServerResult};
use super::state::ServerState;

/// Never copied between the two hops
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Backend URL for an incoming `/api/...` URI, query string included
pub fn target_url(backend: &str, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{}", backend.trim_end_matches('/'), path)
}

pub async fn forward(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let target = target_url(state.backend_url(), &uri);
    tracing::debug!(method = %method, target = %target, "Proxying request");

    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let mut outgoing = reqwest::header::HeaderMap::new();
    for (name, value) in headers.iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            outgoing.append(name, value);
        }
    }

    let upstream = state
        .http
        .request(method, &target)
        .headers(outgoing)
        .body(body.to_vec())
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ServerError::GatewayTimeout(target.clone())
            } else {
                ServerError::BadGateway(e.to_string())
            }
        })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| ServerError::BadGateway(e.to_string()))?;

    let mut response_headers = HeaderMap::new();
    for (name, value) in upstream.headers().iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            response_headers.append(name, value);
        }
    }

    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ServerError::BadGateway(e.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_keeps_query() {
        let uri: Uri = "/api/novels?q=dune%20messiah".parse().unwrap();
        assert_eq!(
            target_url("http://backend:8080/", &uri),
            "http://backend:8080/api/novels?q=dune%20messiah"
        );
    }

    #[test]
    fn test_hop_by_hop_headers() {
        assert!(is_hop_by_hop("Host"));
        assert!(is_hop_by_hop("transfer-encoding"));
        assert!(!is_hop_by_hop("authorization"));
        assert!(!is_hop_by_hop("content-type"));
    }
}
