//! Response sugar for handlers

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// 200 OK with a JSON body.
pub fn ok_json<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

/// 201 Created with a JSON body and a Location header derived from the
/// collection path and the new resource id.
pub fn created_json<T: serde::Serialize>(value: T, collection: &str, id: &str) -> Response {
    let location = format!("{}/{id}", collection.trim_end_matches('/'));
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(value),
    )
        .into_response()
}

/// 204 No Content.
#[must_use]
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_json_builds_the_location_header() {
        let response = created_json(serde_json::json!({"id": "7"}), "/users/", "7");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/users/7"
        );
    }

    #[test]
    fn no_content_has_no_body_status() {
        assert_eq!(no_content().status(), StatusCode::NO_CONTENT);
    }
}
