//! Centralized error mapping
//!
//! Converts every error that escapes a handler into the JSON error body,
//! eliminating per-route boilerplate: the middleware pulls the error out
//! of the response extensions (put there by `AppError::into_response`),
//! resolves its [`ErrorInfo`] through the registry, logs exactly once at
//! the registered severity, and renders the body with the registered
//! status. Handler panics are caught separately and degrade to a minimal
//! generic 500 body, so a response is always produced.

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

use apikit_errors::{ErrorBody, ErrorRegistry, Severity};
use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};
use http_body_util::Full;

use crate::api::error::{HttpError, UnhandledError};
use crate::api::trace_layer::{TRACE_ID_HEADER, TraceContext};
use crate::config::Stage;

/// Shared state of the error layer: the registry snapshot and the stage
/// gating detail exposure.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub registry: Arc<ErrorRegistry>,
    pub stage: Stage,
}

/// Marker on responses the error layer produced and logged, telling the
/// trace layer to skip its completion line.
#[derive(Debug, Clone)]
pub(crate) struct ErrorLogged;

/// Middleware rewriting failed responses into the JSON error body.
pub async fn error_mapping_middleware(
    State(ctx): State<Arc<ErrorContext>>,
    request: Request,
    next: Next,
) -> Response {
    let trace = request.extensions().get::<TraceContext>().cloned();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    let Some(UnhandledError(err)) = response.extensions_mut().remove::<UnhandledError>() else {
        return response;
    };
    render_error(&ctx, trace.as_ref(), &path, &err)
}

fn render_error(
    ctx: &ErrorContext,
    trace: Option<&TraceContext>,
    path: &str,
    err: &anyhow::Error,
) -> Response {
    // A request that bypassed the trace layer still gets a correlatable id.
    let trace_id = trace.map_or_else(
        || uuid::Uuid::new_v4().to_string(),
        |t| t.trace_id.clone(),
    );

    // HttpError carries its own status and client-facing message.
    let (status, message, level) = match find_in_chain::<HttpError>(err) {
        Some(http_err) => (
            http_err.status,
            http_err.message.clone(),
            Severity::Warning,
        ),
        None => {
            let outer: &(dyn StdError + 'static) = err.as_ref();
            let info = ctx.registry.lookup(outer);
            (info.status, info.message.clone(), info.level)
        }
    };

    let detail = if ctx.stage.is_production() {
        None
    } else {
        // `{err:#}` renders the whole cause chain.
        Some(format!("{err:#}"))
    };

    log_once(level, &trace_id, path, status, detail.as_deref());

    let mut body = ErrorBody::new(message, &trace_id);
    if let Some(detail) = detail {
        body = body.with_detail(detail);
    }

    let mut response = (status, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response.extensions_mut().insert(ErrorLogged);
    response
}

fn find_in_chain<E: StdError + Send + Sync + 'static>(err: &anyhow::Error) -> Option<&E> {
    err.chain().find_map(|e| e.downcast_ref::<E>())
}

/// Emit the single log event for a handled error at the registered
/// severity. `tracing` has no critical level; critical maps to error.
fn log_once(level: Severity, trace_id: &str, path: &str, status: StatusCode, detail: Option<&str>) {
    macro_rules! emit {
        ($lvl:ident) => {
            match detail {
                Some(detail) => tracing::$lvl!(
                    trace_id = %trace_id,
                    path = %path,
                    status = status.as_u16(),
                    detail = %detail,
                    "request failed"
                ),
                None => tracing::$lvl!(
                    trace_id = %trace_id,
                    path = %path,
                    status = status.as_u16(),
                    "request failed"
                ),
            }
        };
    }
    match level {
        Severity::Debug => emit!(debug),
        Severity::Info => emit!(info),
        Severity::Warning => emit!(warn),
        Severity::Error | Severity::Critical => emit!(error),
    }
}

/// Panic-to-response conversion for the catch-panic layer: the one place
/// where no registry lookup happens and the body is a bare minimum 500.
pub(crate) fn panic_response(panic: Box<dyn Any + Send + 'static>) -> http::Response<Full<Bytes>> {
    let reason = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown panic payload".to_owned()
    };
    tracing::error!(reason = %reason, "handler panicked");

    let mut response = http::Response::new(Full::new(Bytes::from_static(
        br#"{"message":"internal server error"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{InvalidAccessTokenError, builtin_registry};

    fn ctx(stage: Stage) -> ErrorContext {
        ErrorContext {
            registry: Arc::new(builtin_registry()),
            stage,
        }
    }

    fn trace() -> TraceContext {
        TraceContext {
            trace_id: "t-42".to_owned(),
            method: "GET".to_owned(),
            path: "/x".to_owned(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn registered_error_renders_its_mapping() {
        let err = anyhow::Error::new(InvalidAccessTokenError::new("expired"));
        let response = render_error(&ctx(Stage::Dev), Some(&trace()), "/x", &err);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(TRACE_ID_HEADER).unwrap(),
            &HeaderValue::from_static("t-42")
        );
        assert!(response.extensions().get::<ErrorLogged>().is_some());

        let json = body_json(response).await;
        assert_eq!(json["message"], "invalid access token");
        assert_eq!(json["trace_id"], "t-42");
        assert!(json["detail"].as_str().unwrap().contains("expired"));
    }

    #[tokio::test]
    async fn production_suppresses_detail() {
        let err = anyhow::Error::new(InvalidAccessTokenError::new("expired"));
        let response = render_error(&ctx(Stage::Prod), Some(&trace()), "/x", &err);

        let json = body_json(response).await;
        assert_eq!(json["message"], "invalid access token");
        assert!(json.get("detail").is_none());
    }

    #[tokio::test]
    async fn unregistered_error_falls_back_to_500() {
        let err = anyhow::anyhow!("nobody registered this");
        let response = render_error(&ctx(Stage::Prod), Some(&trace()), "/x", &err);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "internal server error");
    }

    #[tokio::test]
    async fn http_error_short_circuits_the_registry() {
        let err = anyhow::Error::new(HttpError::new(StatusCode::IM_A_TEAPOT, "short and stout"));
        let response = render_error(&ctx(Stage::Prod), Some(&trace()), "/x", &err);

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let json = body_json(response).await;
        assert_eq!(json["message"], "short and stout");
    }

    #[tokio::test]
    async fn context_wrapped_errors_still_classify() {
        use anyhow::Context;
        let err = Err::<(), _>(InvalidAccessTokenError::new("expired"))
            .context("while checking credentials")
            .unwrap_err();
        let response = render_error(&ctx(Stage::Prod), Some(&trace()), "/x", &err);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_trace_context_generates_an_id() {
        let err = anyhow::anyhow!("boom");
        let response = render_error(&ctx(Stage::Prod), None, "/x", &err);
        let json = body_json(response).await;
        assert!(!json["trace_id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn panic_response_is_a_minimal_500() {
        let response = panic_response(Box::new("kaboom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            &HeaderValue::from_static("application/json")
        );
    }
}
