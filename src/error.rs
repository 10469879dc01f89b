//! Error types for the chat widget.

use thiserror::Error;

/// Widget error type.
///
/// Only setup failures ever reach a caller; request failures are recovered by
/// the controller and shown to the user as a bubble or an alert.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// HTTP request failed before a status was received, or the body could
    /// not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid endpoint or base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-2xx status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body, when present and non-empty.
        message: Option<String>,
    },

    /// Widget configuration could not be built.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A required page element is missing or has the wrong type.
    #[error("DOM error: {0}")]
    Dom(String),
}

impl WidgetError {
    /// Whether this error came from the backend rather than the transport.
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;
