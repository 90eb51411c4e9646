//! Dependency initialization and wiring for the article search binary.

use tracing::info;

use article_search_repository::SearchIndexClient;

use crate::config::Settings;
use crate::AppError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Connected client, verified against the cluster health endpoint.
    pub client: SearchIndexClient,
    /// Index the demo works on.
    pub index: String,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If configuration is invalid or the engine is unreachable
    pub async fn new() -> Result<Self, AppError> {
        Self::from_settings(Settings::from_env()?).await
    }

    /// Initialize dependencies from already loaded settings.
    pub async fn from_settings(settings: Settings) -> Result<Self, AppError> {
        info!(
            scheme = %settings.connection.scheme,
            host = %settings.connection.host,
            port = settings.connection.port,
            cluster_name = %settings.connection.cluster_name,
            index = %settings.index,
            "Initializing dependencies"
        );

        let client = SearchIndexClient::open(&settings.connection, settings.search).await?;

        info!("Search engine connection verified");

        Ok(Self {
            client,
            index: settings.index,
        })
    }
}
