//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `NOVELLY_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST client configuration used by the terminal client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend API base, including the `/api` prefix
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// SPA host configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built UI (`index.html`, wasm, css, assets)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Backend origin that `/api/*` is forwarded to
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8084
}

fn default_static_dir() -> String {
    "./novelly-ui/dist".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            backend_url: default_backend_url(),
            cors_origins: vec![
                "http://localhost:8084".to_string(),
                "http://127.0.0.1:8084".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where the terminal client keeps token, user and bookmarks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    pub file: Option<String>,
}

impl SessionConfig {
    /// Configured file, else the per-user data directory
    pub fn path(&self) -> PathBuf {
        match &self.file {
            Some(file) => PathBuf::from(file),
            None => crate::store::FileStorage::default_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Explicit path if given, else the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("novelly").join("config.toml")),
            Some(PathBuf::from("/etc/novelly/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("NOVELLY_API_URL") {
            self.client.api_url = url;
        }

        if let Some(host) = var("NOVELLY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("NOVELLY_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = var("NOVELLY_STATIC_DIR") {
            self.server.static_dir = dir;
        }
        if let Some(url) = var("NOVELLY_BACKEND_URL") {
            self.server.backend_url = url;
        }

        if let Some(file) = var("NOVELLY_SESSION_FILE") {
            self.session.file = Some(file);
        }

        if let Some(level) = var("NOVELLY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("NOVELLY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Novelly Configuration
#
# Environment variables override these settings:
# - NOVELLY_API_URL
# - NOVELLY_HOST
# - NOVELLY_PORT
# - NOVELLY_STATIC_DIR
# - NOVELLY_BACKEND_URL
# - NOVELLY_SESSION_FILE
# - NOVELLY_LOG_LEVEL
# - NOVELLY_LOG_FORMAT

[client]
# Backend API base used by novelly-cli
api_url = "http://localhost:8080/api"

# Request timeout in seconds
request_timeout_secs = 30

[server]
# SPA host bind address
host = "0.0.0.0"
port = 8084

# Built UI (trunk build output)
static_dir = "./novelly-ui/dist"

# Backend that /api/* is proxied to
backend_url = "http://localhost:8080"

# Allowed CORS origins
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084"]

# Proxy timeout in seconds
request_timeout_secs = 30

[session]
# Token and user of the terminal client
# file = "~/.local/share/novelly/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/novelly/novelly.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.client.api_url, defaults.client.api_url);
        assert_eq!(config.server.port, 8084);
        assert_eq!(config.server.backend_url, defaults.server.backend_url);
        assert_eq!(config.server.cors_origins, defaults.server.cors_origins);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.session.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.server.addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NOVELLY_API_URL", "https://novelly.example/api"),
            ("NOVELLY_PORT", "not-a-port"),
            ("NOVELLY_BACKEND_URL", "http://backend:8080"),
            ("NOVELLY_SESSION_FILE", "/tmp/s.json"),
            ("NOVELLY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.client.api_url, "https://novelly.example/api");
        assert_eq!(config.server.port, 8084);
        assert_eq!(config.server.backend_url, "http://backend:8080");
        assert_eq!(config.session.path(), PathBuf::from("/tmp/s.json"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let missing = Config::load(&path).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        std::fs::write(&path, "[server\nport=1").unwrap();
        let broken = Config::load(&path).unwrap_err();
        assert!(matches!(broken, ConfigError::Parse { ref path, .. } if path.ends_with("config.toml")));

        std::fs::write(&path, "[client]\napi_url = \"http://x/api\"\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().client.api_url, "http://x/api");
    }
}
