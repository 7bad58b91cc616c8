//! Sample API routes

use apikit::api::prelude::{
    ApiJson, ApiResult, AppError, HttpError, IntoResponse, created_json, ok_json,
};
use apikit::api::InvalidAccessTokenError;
use apikit_macros::api_model;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, header};
use axum::routing::{get, post};

#[api_model(request)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[api_model(response)]
pub struct UserView {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(serde::Deserialize)]
struct HelloParams {
    name: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/users/{user_id}", get(get_user))
        .route("/users", post(create_user))
        .route("/secure", get(secure))
}

async fn hello(Query(params): Query<HelloParams>) -> impl IntoResponse {
    let name = params.name.unwrap_or_else(|| "World".to_owned());
    tracing::info!(%name, "hello endpoint called");
    ok_json(serde_json::json!({ "message": format!("Hello, {name}!") }))
}

async fn get_user(Path(user_id): Path<u64>) -> ApiResult<impl IntoResponse> {
    if user_id == 0 {
        return Err(AppError::new(HttpError::not_found("user 0 does not exist")));
    }
    Ok(ok_json(UserView {
        id: user_id,
        name: "John Doe".to_owned(),
        email: "john@example.com".to_owned(),
    }))
}

async fn create_user(ApiJson(request): ApiJson<CreateUser>) -> impl IntoResponse {
    tracing::info!(name = %request.name, "creating user");
    created_json(
        UserView {
            id: 1,
            name: request.name,
            email: request.email,
        },
        "/users",
        "1",
    )
}

async fn secure(headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if !authorized {
        return Err(AppError::new(InvalidAccessTokenError::new(
            "missing bearer token",
        )));
    }
    Ok(ok_json(serde_json::json!({ "status": "authorized" })))
}
