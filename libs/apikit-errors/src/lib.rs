//! Core error-classification types for the apikit framework
//!
//! This crate provides pure data types for mapping application errors to
//! HTTP responses, with no dependencies on the web framework itself:
//! - `ErrorInfo` — status/message/severity bundle for one error type
//! - `ErrorRegistry` — ordered error-type-to-`ErrorInfo` mapping
//! - `ErrorBody` — the JSON wire format of an error response

pub mod body;
pub mod info;
pub mod registry;

// Re-export commonly used types
pub use body::ErrorBody;
pub use info::{ErrorInfo, Severity};
pub use registry::ErrorRegistry;
