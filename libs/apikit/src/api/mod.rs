//! HTTP-layer building blocks
//!
//! The two middleware layers here are what the factory composes around
//! every router: [`trace_layer`] logs each request and response under a
//! trace id, and [`error_layer`] turns anything a handler returns as an
//! error into the standard JSON error body via the registry.

pub mod error;
pub mod error_layer;
pub mod extract;
pub mod model;
pub mod response;
pub mod trace_layer;

pub use error::{
    ApiResult, AppError, BadRequestHeaderError, HttpError, InvalidAccessTokenError,
    ValidationError, builtin_registry,
};
pub use error_layer::{ErrorContext, error_mapping_middleware};
pub use extract::ApiJson;
pub use trace_layer::{TRACE_ID_HEADER, TraceContext, trace_middleware};

/// Prelude re-exporting what a typical handler module needs.
pub mod prelude {
    pub use super::error::{ApiResult, AppError, HttpError};
    pub use super::extract::ApiJson;
    pub use super::response::{created_json, no_content, ok_json};

    // Useful axum bits (common in handlers)
    pub use axum::{Json, http::StatusCode, response::IntoResponse};
}
