//! Handler-facing error type and the built-in error classifications

use std::sync::Arc;

use apikit_errors::{ErrorInfo, ErrorRegistry, Severity};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// The error type handlers return; wraps the full cause chain so the
/// error layer can classify it through the [`ErrorRegistry`].
///
/// Anything convertible to `anyhow::Error` converts into `AppError`, so
/// `?` works unchanged in handlers.
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Failed-request payload smuggled through response extensions from
/// [`AppError::into_response`] to the error-mapping middleware.
#[derive(Clone)]
pub(crate) struct UnhandledError(pub(crate) Arc<anyhow::Error>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Placeholder response; the error-mapping middleware rewrites it
        // into the JSON error body. The status only survives if the layer
        // is missing from the stack.
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(UnhandledError(Arc::new(self.0)));
        response
    }
}

/// Convenient alias for handler signatures.
pub type ApiResult<T> = Result<T, AppError>;

/// A required or malformed request header.
#[derive(Debug, thiserror::Error)]
#[error("invalid request header: {reason}")]
pub struct BadRequestHeaderError {
    pub reason: String,
}

impl BadRequestHeaderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An access token that is missing, expired or malformed.
#[derive(Debug, thiserror::Error)]
#[error("invalid access token: {reason}")]
pub struct InvalidAccessTokenError {
    pub reason: String,
}

impl InvalidAccessTokenError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A request payload that failed deserialization or validation.
#[derive(Debug, thiserror::Error)]
#[error("{detail}")]
pub struct ValidationError {
    pub detail: String,
}

impl ValidationError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// An error carrying its own HTTP status and client-facing message.
///
/// The error layer short-circuits this type: status and message are used
/// verbatim instead of a registry lookup, logged at warning.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

/// The registry every app starts from: the kit's own error types plus
/// timeouts, each mapped to its response metadata. Applications extend it
/// with [`ErrorRegistry::register`]; anything unregistered falls back to
/// the generic 500 entry.
#[must_use]
pub fn builtin_registry() -> ErrorRegistry {
    ErrorRegistry::new()
        .with::<ValidationError>(ErrorInfo::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "bad request",
            Severity::Warning,
        ))
        .with::<BadRequestHeaderError>(ErrorInfo::new(
            StatusCode::BAD_REQUEST,
            "invalid request header",
            Severity::Warning,
        ))
        .with::<InvalidAccessTokenError>(ErrorInfo::new(
            StatusCode::UNAUTHORIZED,
            "invalid access token",
            Severity::Warning,
        ))
        .with::<tokio::time::error::Elapsed>(ErrorInfo::new(
            StatusCode::GATEWAY_TIMEOUT,
            "request timeout",
            Severity::Error,
        ))
}
