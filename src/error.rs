// Error types for rill.
// Covers backend response classes, transport failures, and general application errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RillError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Please login.")]
    Unauthorized,

    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("Unexpected error: {0}")]
    Server(String),

    #[error("Unexpected response code: {0}")]
    UnexpectedStatus(u16),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RillError>;
