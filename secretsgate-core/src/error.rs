//! Error types and their HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Error codes surfaced by the HTTP handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Secret name missing or blank
    InvalidSecretName,
    /// The store has no secret under the requested name
    SecretNotFound,
    /// Create refused because the name is taken
    SecretAlreadyDefined,
    /// The store rejected a create request
    SecretNotCreated,
    /// The secret holds only binary data
    NoStringValue,
    /// A store call failed and the handler caught it
    StoreFailure,
    /// A store call failed on a path with no recovery
    InternalFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSecretName => "InvalidSecretName",
            Self::SecretNotFound => "SecretNotFound",
            Self::SecretAlreadyDefined => "SecretAlreadyDefined",
            Self::SecretNotCreated => "SecretNotCreated",
            Self::NoStringValue => "NoStringValue",
            Self::StoreFailure => "StoreFailure",
            Self::InternalFailure => "InternalFailure",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidSecretName
            | Self::SecretNotFound
            | Self::SecretAlreadyDefined
            | Self::SecretNotCreated
            | Self::NoStringValue
            | Self::StoreFailure => StatusCode::BAD_REQUEST,
            Self::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned from a handler.
///
/// The response body is the bare message; callers get no machine-readable
/// code, only the status and a human-readable string.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "request rejected");
        }
        (status, self.message).into_response()
    }
}
