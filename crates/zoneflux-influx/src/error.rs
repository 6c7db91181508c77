//! Error types for the InfluxDB sink.

use thiserror::Error;

/// Result type alias for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur while provisioning or writing.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid dsn: {0}")]
    Dsn(String),

    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("request build failed: {0}")]
    Request(#[from] http::Error),

    #[error("http exchange failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("destination returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed query response: {0}")]
    Response(#[from] serde_json::Error),

    #[error("request timed out")]
    Timeout,
}
