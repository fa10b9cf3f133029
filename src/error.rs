//! Stockwire error types

use std::time::Duration;

/// Stockwire error types
#[derive(Debug, thiserror::Error)]
pub enum StockwireError {
    // Validation errors (never reach the provider)
    #[error("Invalid ticker format")]
    InvalidTicker(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    /// Provider answered, but price fields are missing or non-positive.
    #[error("Invalid or incomplete stock data: {0}")]
    IncompleteData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A fan-out task panicked or was cancelled before producing a result.
    #[error("lookup task failed: {0}")]
    Fanout(String),

    /// The gateway has been shut down and no longer accepts lookups.
    #[error("gateway is shut down")]
    ShutDown,

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StockwireError {
    /// Whether this error came from talking to an upstream service
    /// (network failure, non-2xx status, timeout).
    pub fn is_provider_fault(&self) -> bool {
        matches!(
            self,
            StockwireError::Http(_) | StockwireError::Api { .. } | StockwireError::Timeout(_)
        )
    }

    /// Short, stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StockwireError::InvalidTicker(_) | StockwireError::InvalidInput(_) => "validation",
            StockwireError::Http(_) | StockwireError::Api { .. } | StockwireError::Timeout(_) => {
                "provider"
            }
            StockwireError::IncompleteData(_) => "incomplete_data",
            StockwireError::Json(_) => "decode",
            StockwireError::Fanout(_) | StockwireError::ShutDown => "fanout",
            StockwireError::Configuration(_) | StockwireError::Io(_) => "configuration",
        }
    }
}

impl From<reqwest::Error> for StockwireError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            StockwireError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            StockwireError::Http(format!("malformed response body: {err}"))
        } else {
            StockwireError::Http(err.to_string())
        }
    }
}

/// Result type alias for Stockwire operations
pub type Result<T> = std::result::Result<T, StockwireError>;
