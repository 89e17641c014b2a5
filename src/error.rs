use thiserror::Error;

/// Main error type for the forecast service
#[derive(Error, Debug)]
pub enum GridcastError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Artifact errors
    #[error("Model not ready: {0}")]
    ModelNotReady(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GridcastError
pub type Result<T> = std::result::Result<T, GridcastError>;
