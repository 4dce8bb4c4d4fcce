//! Shared state for the SPA host handlers

use crate::config::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::error::{ServerError, ServerResult};

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    /// Client used to forward `/api/*`
    pub http: reqwest::Client,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServerError::Internal(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: ServerConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.static_dir)
    }

    pub fn backend_url(&self) -> &str {
        self.config.backend_url.trim_end_matches('/')
    }
}
