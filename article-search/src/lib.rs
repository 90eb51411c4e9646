//! # Article Search
//!
//! Entry point and configuration for the article search client.
//!
//! This crate loads settings from the environment, connects a
//! `SearchIndexClient` and walks the demo scenarios in [`demo`].

pub mod config;
pub mod demo;
pub mod logging;

pub use config::{Dependencies, Settings};

use article_search_repository::SearchError;
use article_search_shared::QueryError;
use thiserror::Error;

/// Errors that can occur during startup or the demo run.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Query construction error.
    #[error("Query error: {0}")]
    QueryError(#[from] QueryError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the failure happened before any request reached the engine.
    pub fn is_pre_flight(&self) -> bool {
        match self {
            Self::ConfigError(_) | Self::QueryError(_) => true,
            Self::SearchError(e) => e.is_pre_flight(),
        }
    }
}
