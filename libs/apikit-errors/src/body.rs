//! JSON wire format of an error response

use serde::{Deserialize, Serialize};

/// Body of every error response emitted by the framework.
///
/// The `detail` field carries the internal error chain and is only
/// populated outside production.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct ErrorBody {
    /// Client-facing message from the registered [`ErrorInfo`](crate::ErrorInfo).
    pub message: String,
    /// Identifier correlating this response with the request's log lines.
    pub trace_id: String,
    /// Internal error detail, suppressed in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace_id: trace_id.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
