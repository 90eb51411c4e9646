//! Settings read from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use article_search_repository::config::{
    ConnectionConfig, Credentials, SearchIndexConfig, DEFAULT_CLUSTER_NAME, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT,
};
use article_search_repository::DEFAULT_INDEX_NAME;

use crate::AppError;

/// Default maximum number of operations per bulk request.
const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Everything the binary needs to reach the engine.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub search: SearchIndexConfig,
    /// Index the demo writes to.
    pub index: String,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_SCHEME`: `http` or `https` (default: http)
    /// - `SEARCH_HOST`: engine host (default: 127.0.0.1)
    /// - `SEARCH_PORT`: engine port (default: 9200)
    /// - `SEARCH_CLUSTER_NAME`: expected cluster name (default: elasticsearch)
    /// - `SEARCH_TIMEOUT_SECS`: per-request timeout (default: 5)
    /// - `SEARCH_USERNAME` / `SEARCH_PASSWORD`: basic auth, both or neither
    /// - `SEARCH_INDEX`: index name (default: article_index)
    /// - `SEARCH_MAX_BATCH_SIZE`: bulk limit, `0` disables it (default: 1000)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scheme = lookup("SEARCH_SCHEME").unwrap_or_else(|| "http".to_string());
        if scheme != "http" && scheme != "https" {
            return Err(AppError::config(format!(
                "SEARCH_SCHEME must be http or https, got {}",
                scheme
            )));
        }

        let credentials = match (lookup("SEARCH_USERNAME"), lookup("SEARCH_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::config(
                    "SEARCH_USERNAME and SEARCH_PASSWORD must be set together",
                ))
            }
        };

        let request_timeout = match parse_var::<u64, _>(&lookup, "SEARCH_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let connection = ConnectionConfig {
            scheme,
            host: lookup("SEARCH_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&lookup, "SEARCH_PORT")?.unwrap_or(DEFAULT_PORT),
            cluster_name: lookup("SEARCH_CLUSTER_NAME")
                .unwrap_or_else(|| DEFAULT_CLUSTER_NAME.to_string()),
            request_timeout,
            credentials,
        };

        let search = match parse_var(&lookup, "SEARCH_MAX_BATCH_SIZE")?
            .unwrap_or(DEFAULT_MAX_BATCH_SIZE)
        {
            0 => SearchIndexConfig::unlimited(),
            max => SearchIndexConfig::with_max_batch_size(max),
        };

        let index = lookup("SEARCH_INDEX").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        if index.trim().is_empty() {
            return Err(AppError::config("SEARCH_INDEX must not be empty"));
        }

        Ok(Self {
            connection,
            search,
            index,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| AppError::config(format!("Invalid {}={}: {}", key, raw, e)))
        })
        .transpose()
}
