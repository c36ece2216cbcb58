//! Error types for Sherdor

use thiserror::Error;

/// Result type alias for Sherdor operations
pub type SherdorResult<T> = Result<T, SherdorError>;

/// Main error type for Sherdor
#[derive(Error, Debug)]
pub enum SherdorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Data store error: {0}")]
    DataStore(String),

    #[error("Install failed: {0}")]
    Install(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SherdorError {
    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new data store error
    pub fn data_store(msg: impl Into<String>) -> Self {
        Self::DataStore(msg.into())
    }

    /// Create a new install error
    pub fn install(msg: impl Into<String>) -> Self {
        Self::Install(msg.into())
    }

    /// Create a new notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short category name, used as a structured log field.
    pub fn category(&self) -> &'static str {
        match self {
            SherdorError::Network(_) => "network",
            SherdorError::DataStore(_) => "data_store",
            SherdorError::Install(_) => "install",
            SherdorError::Notification(_) => "notification",
            SherdorError::InvalidState(_) => "invalid_state",
            SherdorError::Config(_) => "config",
            SherdorError::Io(_) => "io",
            SherdorError::Url(_) => "url",
            SherdorError::Json(_) => "json",
            SherdorError::Other(_) => "other",
        }
    }
}
