//! REST API Client
//!
//! Wraps a [`Transport`] with the conventions of the Novelly backend:
//!
//! - URLs are `base_url + endpoint` (base defaults to `/api`)
//! - a bearer token is attached whenever the credential source has one
//! - JSON bodies are sent as `application/json`, forms as multipart
//! - non-2xx responses become [`ApiError::Status`] carrying the server's
//!   own message when it sent one
//! - 2xx bodies are negotiated by content type into [`ResponseBody`]
//!
//! Endpoint groups live in [`endpoints`] and are reached through
//! accessors such as [`ApiClient::novels`].

pub mod endpoints;
#[cfg(feature = "native")]
pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod transport;

pub use endpoints::{
    AddOutcome, AuthApi, ChaptersApi, CommentsApi, LibraryApi, NovelsApi, ProgressApi,
    ReviewsApi, UsersApi,
};
#[cfg(feature = "native")]
pub use http::ReqwestTransport;
pub use transport::{
    FormPart, HttpRequest, HttpResponse, Method, PartValue, RequestBody, Transport,
    TransportError,
};

use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "/api";

/// Errors surfaced by API calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Server answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Request never produced a response
    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    /// 2xx body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Response was well-formed but missing required data
    #[error("{0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 or 403
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Successful response body after content negotiation
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseBody {
    fn from_response(response: &HttpResponse) -> ApiResult<Self> {
        let content_type = response.content_type.as_deref().unwrap_or("");
        if content_type.contains("application/json") {
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(ResponseBody::Json(serde_json::Value::Null));
            }
            serde_json::from_slice(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else if content_type.contains("text/") {
            Ok(ResponseBody::Text(response.text()))
        } else {
            Ok(ResponseBody::Binary(response.body.clone()))
        }
    }

    /// Deserialize into a DTO. An empty body decodes as JSON `null`.
    pub fn into_json<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) if text.trim().is_empty() => serde_json::Value::Null,
            ResponseBody::Text(text) => serde_json::Value::String(text),
            ResponseBody::Binary(bytes) if bytes.is_empty() => serde_json::Value::Null,
            ResponseBody::Binary(_) => {
                return Err(ApiError::Decode("expected JSON, got binary data".to_string()))
            }
        };
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Human-readable message for a failed response
pub fn error_message(response: &HttpResponse) -> String {
    let fallback = format!("Request failed with status {}", response.status);
    let is_json = response
        .content_type
        .as_deref()
        .map_or(false, |ct| ct.contains("application/json"));

    if is_json {
        let parsed: Option<serde_json::Value> = serde_json::from_slice(&response.body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        return field("message").or_else(|| field("error")).unwrap_or(fallback);
    }

    let text = response.text();
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

/// Supplies the bearer token for outgoing requests
pub trait CredentialSource {
    fn token(&self) -> Option<String>;
}

impl CredentialSource for Store {
    fn token(&self) -> Option<String> {
        self.state().jwt_token.clone().filter(|t| !t.is_empty())
    }
}

/// Anonymous access
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    credentials: Rc<dyn CredentialSource>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Rc<dyn Transport>,
        credentials: Rc<dyn CredentialSource>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL with percent-encoded query; `None` values are skipped
    pub fn url(&self, endpoint: &str, query: &[(&str, Option<String>)]) -> String {
        let pairs: Vec<String> = query
            .iter()
            .filter_map(|(k, v)| {
                v.as_ref()
                    .map(|v| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            })
            .collect();

        if pairs.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, pairs.join("&"))
        }
    }

    /// URL of a stored file served through the backend's file endpoint
    pub fn file_url(&self, path: &str) -> String {
        format!("{}/pages/file?path={}", self.base_url, urlencoding::encode(path))
    }

    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, Option<String>)],
        body: RequestBody,
    ) -> ApiResult<ResponseBody> {
        let url = self.url(endpoint, query);

        let mut headers = Vec::new();
        if let Some(token) = self.credentials.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        if matches!(body, RequestBody::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        tracing::debug!(method = %method, url = %url, "API request");

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(method = %method, endpoint, "API transport error: {}", e);
            ApiError::from(e)
        })?;

        if !response.is_success() {
            let message = error_message(&response);
            tracing::debug!(status = response.status, endpoint, "API error: {}", message);
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        ResponseBody::from_response(&response)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.get_with_query(endpoint, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, Option<String>)],
    ) -> ApiResult<T> {
        self.request(Method::Get, endpoint, query, RequestBody::Empty)
            .await?
            .into_json()
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::Post, endpoint, &[], json_body(body)?)
            .await?
            .into_json()
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::Put, endpoint, &[], json_body(body)?)
            .await?
            .into_json()
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        parts: Vec<FormPart>,
    ) -> ApiResult<T> {
        self.request(Method::Post, endpoint, &[], RequestBody::Multipart(parts))
            .await?
            .into_json()
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        parts: Vec<FormPart>,
    ) -> ApiResult<T> {
        self.request(Method::Put, endpoint, &[], RequestBody::Multipart(parts))
            .await?
            .into_json()
    }

    /// Send a request whose success body carries nothing the caller needs
    pub async fn send_unit(&self, method: Method, endpoint: &str, body: RequestBody) -> ApiResult<()> {
        self.request(method, endpoint, &[], body).await.map(|_| ())
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<()> {
        self.send_unit(Method::Delete, endpoint, RequestBody::Empty)
            .await
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn novels(&self) -> NovelsApi<'_> {
        NovelsApi::new(self)
    }

    pub fn chapters(&self) -> ChaptersApi<'_> {
        ChaptersApi::new(self)
    }

    pub fn progress(&self) -> ProgressApi<'_> {
        ProgressApi::new(self)
    }

    pub fn library(&self) -> LibraryApi<'_> {
        LibraryApi::new(self)
    }

    pub fn comments(&self) -> CommentsApi<'_> {
        CommentsApi::new(self)
    }

    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub(crate) fn json_body<B: Serialize + ?Sized>(body: &B) -> ApiResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use crate::models::{Novel, Role, User};
    use serde_json::json;

    fn client_with(mock: &Rc<MockTransport>, store: &Store) -> ApiClient {
        ApiClient::new("/api/", mock.clone(), Rc::new(store.clone()))
    }

    #[test]
    fn test_url_building() {
        let mock = Rc::new(MockTransport::new());
        let client = client_with(&mock, &Store::in_memory());
        assert_eq!(client.base_url(), "/api");
        assert_eq!(client.url("/novels", &[]), "/api/novels");
        assert_eq!(
            client.url("/novels", &[("q", Some("a&b c".into())), ("page", None)]),
            "/api/novels?q=a%26b%20c"
        );
        assert_eq!(
            client.file_url("novels/1/cover/x y.png"),
            "/api/pages/file?path=novels%2F1%2Fcover%2Fx%20y.png"
        );
    }

    #[tokio::test]
    async fn test_bearer_header_only_with_token() {
        let mock = Rc::new(MockTransport::new());
        let store = Store::in_memory();
        let client = client_with(&mock, &store);

        mock.push_json(200, json!([]));
        let _: Vec<Novel> = client.get("/novels").await.unwrap();
        assert!(mock.last_request().header("Authorization").is_none());

        store.set_session(
            "tok",
            User {
                user_id: 1,
                username: "ada".into(),
                email: None,
                role: Some(Role::User),
            },
        );
        mock.push_json(200, json!([]));
        let _: Vec<Novel> = client.get("/novels").await.unwrap();
        assert_eq!(mock.last_request().header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let mock = Rc::new(MockTransport::new());
        let client = client_with(&mock, &Store::in_memory());

        mock.push_json(200, json!({"ok": true}));
        let _: serde_json::Value = client.post("/things", &json!({"a": 1})).await.unwrap();
        let req = mock.last_request();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body, RequestBody::Json(json!({"a": 1})));

        mock.push_json(200, json!({"ok": true}));
        let _: serde_json::Value = client
            .post_multipart("/upload", vec![FormPart::text("title", "T")])
            .await
            .unwrap();
        assert!(mock.last_request().header("Content-Type").is_none());
    }

    #[tokio::test]
    async fn test_error_message_precedence() {
        let mock = Rc::new(MockTransport::new());
        let client = client_with(&mock, &Store::in_memory());

        mock.push_json(400, json!({"message": "Bad title", "error": "Bad Request"}));
        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err.to_string(), "Bad title");
        assert_eq!(err.status(), Some(400));

        mock.push_json(401, json!({"error": "Unauthorized"}));
        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        assert!(err.is_unauthorized());

        mock.push_text(409, "Novel already in library");
        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err.to_string(), "Novel already in library");
        assert!(err.is_conflict());

        mock.push_empty(500);
        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 500");

        mock.push_json(422, json!({"detail": "nope"}));
        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 422");
    }

    #[tokio::test]
    async fn test_response_negotiation() {
        let mock = Rc::new(MockTransport::new());
        let client = client_with(&mock, &Store::in_memory());

        mock.push_text(200, "hello");
        let body = client
            .request(Method::Get, "/t", &[], RequestBody::Empty)
            .await
            .unwrap();
        assert_eq!(body, ResponseBody::Text("hello".into()));

        mock.push(HttpResponse {
            status: 200,
            content_type: Some("image/png".into()),
            body: vec![137, 80],
        });
        let body = client
            .request(Method::Get, "/img", &[], RequestBody::Empty)
            .await
            .unwrap();
        assert_eq!(body, ResponseBody::Binary(vec![137, 80]));

        mock.push_empty(204);
        client.delete("/novels/1").await.unwrap();
        assert_eq!(mock.last_request().method, Method::Delete);
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_api_error() {
        let mock = Rc::new(MockTransport::new());
        let client = client_with(&mock, &Store::in_memory());
        mock.push_err(TransportError::Timeout);

        let err = client.get::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportError::Timeout));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_into_json_variants() {
        ResponseBody::Binary(Vec::new()).into_json::<()>().unwrap();
        let text: String = ResponseBody::Text("ok".into()).into_json().unwrap();
        assert_eq!(text, "ok");
        let missing: Option<Novel> = ResponseBody::Text(String::new()).into_json().unwrap();
        assert!(missing.is_none());
        assert!(matches!(
            ResponseBody::Binary(vec![1]).into_json::<Novel>(),
            Err(ApiError::Decode(_))
        ));
    }
}
