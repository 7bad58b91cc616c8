//! Response metadata associated with a registered error type

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Log severity for a handled error.
///
/// Serializes as lowercase (`"warning"`, `"error"`, ...) so it can appear
/// verbatim in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Status/message/severity bundle for one registered error type.
///
/// Immutable once registered; the message is the client-facing template,
/// not the internal error text.
#[derive(Debug, Clone)]
#[must_use]
pub struct ErrorInfo {
    /// HTTP status returned to the client.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
    /// Severity the error is logged at.
    pub level: Severity,
}

impl ErrorInfo {
    pub fn new(status: StatusCode, message: impl Into<String>, level: Severity) -> Self {
        Self {
            status,
            message: message.into(),
            level,
        }
    }

    /// The generic fallback entry: 500, logged as an error.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error",
            Severity::Error,
        )
    }
}
