//! Error types for the card relay.
//!
//! Per-request failures ([`DecodeError`], [`ValidationError`], [`RelayError`])
//! are rendered as HTTP responses by [`RelayServiceError`]. [`ConfigError`]
//! only occurs at startup.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// The inbound body could not be decoded into a typed event.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not valid JSON (syntax error or truncated input)
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Body is JSON but a field has the wrong type
    #[error("type mismatch: {0}")]
    TypeMismatch(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => Self::TypeMismatch(err),
            Category::Io | Category::Syntax | Category::Eof => Self::Malformed(err),
        }
    }
}

/// A decoded event carries a value the card builder cannot render.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Unix timestamp outside the representable calendar range
    #[error("{field} is not a representable unix timestamp: {value}")]
    Timestamp { field: &'static str, value: i64 },
}

/// Delivery of a card to the downstream webhook failed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection, TLS or timeout failure. The URL is stripped before wrapping.
    #[error("webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Webhook answered with a non-2xx status
    #[error("webhook returned {status}")]
    Status { status: reqwest::StatusCode },
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

/// Startup configuration is missing or invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required destination webhook was not provided
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A setting was provided but could not be used.
    /// The offending value is deliberately not echoed.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The shared HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Any failure that ends a relay request early.
#[derive(Debug, Error)]
pub enum RelayServiceError {
    /// Wrong method or content type
    #[error("invalid request")]
    InvalidRequest,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    /// The rendered card could not be serialized
    #[error(transparent)]
    Encode(serde_json::Error),
}

impl RelayServiceError {
    /// Short machine-readable kind used as the response prefix and log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Decode(_) => "decode_error",
            Self::Validation(_) => "validation_error",
            Self::Relay(_) => "relay_error",
            Self::Encode(_) => "encode_error",
        }
    }

    /// HTTP status returned to the caller.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Relay(_) => StatusCode::BAD_GATEWAY,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::InvalidRequest => "invalid request".to_string(),
            other => format!("{}: {other}", other.kind()),
        };
        (status, body).into_response()
    }
}
