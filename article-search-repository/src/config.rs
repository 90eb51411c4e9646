//! Configuration types for the SearchIndexClient.

use std::time::Duration;

use url::Url;

use crate::errors::SearchError;

/// Default engine host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default engine port.
pub const DEFAULT_PORT: u16 = 9200;

/// Default cluster name.
pub const DEFAULT_CLUSTER_NAME: &str = "elasticsearch";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the SearchIndexClient.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum number of operations allowed in a single bulk request.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with no batch size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}

/// Basic-auth credentials for the engine.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where and how to reach the engine.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// `http` or `https`.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Expected cluster name, checked against the health endpoint.
    pub cluster_name: String,
    /// Timeout applied to every request by the transport.
    pub request_timeout: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials: None,
        }
    }
}

impl ConnectionConfig {
    /// Connect to `host:port` over plain HTTP with default settings.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Base URL of the engine.
    pub fn url(&self) -> Result<Url, SearchError> {
        Url::parse(&format!("{}://{}:{}", self.scheme, self.host, self.port))
            .map_err(|e| SearchError::connection(format!("Invalid engine address: {}", e)))
    }
}
