//! Strict JSON extraction
//!
//! [`ApiJson`] behaves like `axum::Json` but routes rejections through the
//! error registry as a [`ValidationError`], so malformed payloads produce
//! the standard 422 error body instead of axum's plain-text rejection.

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::error::{AppError, ValidationError};

/// JSON body extractor with registry-mapped rejections.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::new(ValidationError::new(rejection.body_text()))),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::header;

    #[derive(serde::Deserialize)]
    struct Payload {
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_payload_extracts() {
        let req = json_request(r#"{"name":"ada"}"#);
        let ApiJson(payload) = ApiJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.name, "ada");
    }

    #[tokio::test]
    async fn malformed_payload_becomes_a_validation_error() {
        let req = json_request(r#"{"name":42}"#);
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
