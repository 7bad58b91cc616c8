//! Request/response logging with trace-id correlation
//!
//! Every request gets a trace id — propagated from the caller when an
//! `x-trace-id`/`x-request-id` header is present, generated otherwise —
//! bound into a tracing span for the request's lifetime and echoed back
//! as a response header. One structured line is logged on entry and at
//! most one on completion; when the error layer already logged a failure,
//! no completion line is written.
//!
//! Logged string fields are capped at the configured maximum length.
//! Truncation affects the log output only, never the payloads.

use std::borrow::Cow;

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use tracing::{Instrument, info, info_span, warn};

use crate::api::error_layer::ErrorLogged;
use crate::telemetry;

/// Header carrying the trace id, inbound and outbound.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request correlation data, stored in request extensions for the
/// lifetime of the request.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
    pub method: String,
    pub path: String,
}

impl TraceContext {
    /// Build the context for an incoming request, propagating a
    /// caller-supplied trace id when present.
    #[must_use]
    pub fn new(method: &str, path: &str, headers: &HeaderMap) -> Self {
        let trace_id =
            propagated_trace_id(headers).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            trace_id,
            method: method.to_owned(),
            path: path.to_owned(),
        }
    }
}

fn propagated_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACE_ID_HEADER)
        .or_else(|| headers.get(REQUEST_ID_HEADER))
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Cap `value` at `max` bytes for logging, never splitting a UTF-8
/// character. Longer values get a `...` marker appended.
pub(crate) fn truncate_field(value: &str, max: usize) -> Cow<'_, str> {
    if value.len() <= max {
        return Cow::Borrowed(value);
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &value[..end]))
}

/// Render a request/response body for logging.
fn loggable_body(bytes: &[u8], max: usize) -> String {
    if bytes.is_empty() {
        return "[empty]".to_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => truncate_field(text, max).into_owned(),
        Err(_) => format!("[binary: {} bytes]", bytes.len()),
    }
}

/// Logging middleware wrapping every routed handler.
pub async fn trace_middleware(request: Request, next: Next) -> Response {
    let max = telemetry::max_field_len();
    let method = request.method().to_string();
    let path = request.uri().path().to_owned();
    let query = request.uri().query().unwrap_or_default().to_owned();
    let ctx = TraceContext::new(&method, &path, request.headers());

    let span = info_span!(
        "request",
        trace_id = %ctx.trace_id,
        method = %ctx.method,
        path = %ctx.path,
    );

    async move {
        // Buffer the request body so it can be logged and handed on intact.
        let (parts, body) = request.into_parts();
        let request_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, error = %e, "failed to read request body");
                return minimal_response(StatusCode::BAD_REQUEST, &ctx.trace_id);
            }
        };

        info!(
            trace_id = %ctx.trace_id,
            method = %ctx.method,
            path = %ctx.path,
            query = %truncate_field(&query, max),
            body = %loggable_body(&request_bytes, max),
            "request received"
        );

        let mut request = Request::from_parts(parts, Body::from(request_bytes));
        request.extensions_mut().insert(ctx.clone());

        let response = next.run(request).await;

        let error_logged = response.extensions().get::<ErrorLogged>().is_some();
        let (mut parts, body) = response.into_parts();
        let response_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, error = %e, "failed to read response body");
                return minimal_response(StatusCode::INTERNAL_SERVER_ERROR, &ctx.trace_id);
            }
        };

        if !error_logged {
            info!(
                trace_id = %ctx.trace_id,
                status = parts.status.as_u16(),
                body = %loggable_body(&response_bytes, max),
                "request completed"
            );
        }

        if let Ok(value) = HeaderValue::from_str(&ctx.trace_id) {
            parts.headers.insert(TRACE_ID_HEADER, value);
        }
        Response::from_parts(parts, Body::from(response_bytes))
    }
    .instrument(span)
    .await
}

fn minimal_response(status: StatusCode, trace_id: &str) -> Response {
    let mut response = status.into_response();
    if let Ok(value) = HeaderValue::from_str(trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
