//! Authentication Session
//!
//! Login, registration and token checks on top of the [`ApiClient`] and the
//! [`Store`]. The store is the single source of truth: a successful login
//! writes token and user there, a rejected token clears it.

use crate::client::{ApiClient, ApiError};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
use crate::store::Store;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid response from server")]
    InvalidResponse,

    #[error("Please login to continue")]
    NotAuthenticated,
}

impl SessionError {
    /// Server rejected the credentials or token
    pub fn is_unauthorized(&self) -> bool {
        match self {
            SessionError::Api(e) => e.is_unauthorized(),
            SessionError::NotAuthenticated => true,
            SessionError::InvalidResponse => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    store: Store,
    api: ApiClient,
}

impl Session {
    pub fn new(store: Store, api: ApiClient) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let request = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.api.auth().register(&request).await?;
        self.accept(response)
    }

    pub async fn login(&self, email_or_username: &str, password: &str) -> Result<User, SessionError> {
        let request = LoginRequest {
            email_or_username: email_or_username.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.api.auth().login(&request).await?;
        self.accept(response)
    }

    fn accept(&self, response: AuthResponse) -> Result<User, SessionError> {
        match (response.token.filter(|t| !t.is_empty()), response.user) {
            (Some(token), Some(user)) => {
                tracing::info!(username = %user.username, "Signed in");
                self.store.set_session(token, user.clone());
                Ok(user)
            }
            _ => Err(SessionError::InvalidResponse),
        }
    }

    pub fn logout(&self) {
        if let Some(user) = self.current_user() {
            tracing::info!(username = %user.username, "Signed out");
        }
        self.store.clear();
    }

    /// Re-fetch the profile. A 401/403 ends the session.
    pub async fn refresh_user(&self) -> Result<User, SessionError> {
        match self.api.auth().me().await {
            Ok(user) => {
                let fresh = user.clone();
                self.store.update(move |state| {
                    state.current_user = Some(fresh);
                    state.is_authenticated = true;
                });
                Ok(user)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::info!("Stored token rejected, clearing session");
                    self.store.clear();
                }
                Err(e.into())
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        let state = self.store.state();
        state.is_authenticated && state.jwt_token.is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.state().current_user.clone()
    }

    /// Signed-in user or [`SessionError::NotAuthenticated`]
    pub fn require_user(&self) -> Result<User, SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        self.current_user().ok_or(SessionError::NotAuthenticated)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.store.state().role() == Some(role)
    }

    /// False without a token or when the backend refuses it
    pub async fn verify_token(&self) -> bool {
        if self.store.state().jwt_token.is_none() {
            return false;
        }
        match self.refresh_user().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Token verification failed: {}", e);
                false
            }
        }
    }

    /// Restore the stored session and drop it if the backend rejects it.
    /// Network failures keep the session so offline starts stay signed in.
    pub async fn init(&self) -> bool {
        self.store.initialize();
        let has_session = {
            let state = self.store.state();
            state.jwt_token.is_some() && state.current_user.is_some()
        };
        if !has_session {
            return false;
        }

        match self.refresh_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, "Session restored");
                true
            }
            Err(SessionError::Api(ApiError::Transport(e))) => {
                tracing::warn!("Could not verify stored session: {}", e);
                self.is_authenticated()
            }
            Err(e) => {
                tracing::warn!("Stored session is invalid, clearing: {}", e);
                self.store.clear();
                false
            }
        }
    }
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::client::TransportError;
    use crate::store::{MemoryStorage, Storage, KEY_TOKEN, KEY_USER};
    use serde_json::json;
    use std::rc::Rc;

    fn setup_with(storage: &MemoryStorage) -> (Rc<MockTransport>, Session) {
        let mock = Rc::new(MockTransport::new());
        let store = Store::new(Rc::new(storage.clone()));
        let api = ApiClient::new("/api", mock.clone(), Rc::new(store.clone()));
        (mock, Session::new(store, api))
    }

    fn user_json(role: &str) -> serde_json::Value {
        json!({"userId": 4, "username": "ada", "email": "ada@example.com", "role": role})
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let storage = MemoryStorage::new();
        let (mock, session) = setup_with(&storage);
        mock.push_json(200, json!({"token": "jwt", "user": user_json("ADMIN")}));

        let user = session.login(" ada ", "secret").await.unwrap();
        assert_eq!(user.username, "ada");
        assert!(session.is_authenticated());
        assert!(session.has_role(Role::Admin));
        assert!(!session.has_role(Role::User));
        assert_eq!(storage.get_item(KEY_TOKEN).unwrap().as_deref(), Some("jwt"));

        let sent = mock.last_request();
        assert_eq!(sent.url, "/api/auth/login");
        assert_eq!(
            sent.body,
            crate::client::RequestBody::Json(json!({"emailOrUsername": "ada", "password": "secret"}))
        );
    }

    #[tokio::test]
    async fn test_login_requires_token_and_user() {
        let (mock, session) = setup_with(&MemoryStorage::new());
        mock.push_json(200, json!({"token": "jwt"}));

        let err = session.login("ada", "secret").await.unwrap_err();
        assert_eq!(err, SessionError::InvalidResponse);
        assert_eq!(err.to_string(), "Invalid response from server");
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_server_message() {
        let (mock, session) = setup_with(&MemoryStorage::new());
        mock.push_json(401, json!({"message": "Invalid credentials"}));

        let err = session.login("ada", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_register_posts_trimmed_fields() {
        let (mock, session) = setup_with(&MemoryStorage::new());
        mock.push_json(200, json!({"token": "jwt", "user": user_json("USER")}));

        session.register("ada ", " ada@example.com", "pw1234").await.unwrap();
        assert_eq!(
            mock.last_request().body,
            crate::client::RequestBody::Json(
                json!({"username": "ada", "email": "ada@example.com", "password": "pw1234"})
            )
        );
    }

    #[tokio::test]
    async fn test_refresh_rejected_token_clears_store() {
        let storage = MemoryStorage::new();
        let (mock, session) = setup_with(&storage);
        mock.push_json(200, json!({"token": "jwt", "user": user_json("USER")}));
        session.login("ada", "pw").await.unwrap();

        mock.push_json(403, json!({"error": "Forbidden"}));
        assert!(session.refresh_user().await.is_err());
        assert!(!session.is_authenticated());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_server_error_keeps_session() {
        let (mock, session) = setup_with(&MemoryStorage::new());
        mock.push_json(200, json!({"token": "jwt", "user": user_json("USER")}));
        session.login("ada", "pw").await.unwrap();

        mock.push_empty(500);
        assert!(session.refresh_user().await.is_err());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_verify_token_without_token_skips_request() {
        let (mock, session) = setup_with(&MemoryStorage::new());
        assert!(!session.verify_token().await);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_init_restores_and_verifies() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "jwt").unwrap();
        storage.set_item(KEY_USER, &user_json("USER").to_string()).unwrap();
        let (mock, session) = setup_with(&storage);

        mock.push_json(200, user_json("CREATOR"));
        assert!(session.init().await);
        assert!(session.has_role(Role::Creator));
        assert_eq!(mock.last_request().header("Authorization"), Some("Bearer jwt"));
    }

    #[tokio::test]
    async fn test_init_clears_rejected_session() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "expired").unwrap();
        storage.set_item(KEY_USER, &user_json("USER").to_string()).unwrap();
        let (mock, session) = setup_with(&storage);

        mock.push_json(400, json!({"message": "Malformed token"}));
        assert!(!session.init().await);
        assert!(!session.is_authenticated());
        assert!(!storage.contains_key(KEY_TOKEN));
    }

    #[tokio::test]
    async fn test_init_offline_keeps_session() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "jwt").unwrap();
        storage.set_item(KEY_USER, &user_json("USER").to_string()).unwrap();
        let (mock, session) = setup_with(&storage);

        mock.push_err(TransportError::Connection("refused".into()));
        assert!(session.init().await);
        assert!(session.require_user().is_ok());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let storage = MemoryStorage::new();
        let (mock, session) = setup_with(&storage);
        mock.push_json(200, json!({"token": "jwt", "user": user_json("USER")}));
        session.login("ada", "pw").await.unwrap();

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.require_user(), Err(SessionError::NotAuthenticated));
        assert!(storage.is_empty());
    }
}
