//! API documentation routes
//!
//! Serves the OpenAPI document plus Swagger UI and ReDoc pages loading
//! their assets from a CDN. Routes are registered relative to the docs
//! prefix; the factory decides where the router is mounted.

use axum::Json;
use axum::Router;
use axum::response::{Html, Redirect};
use axum::routing::get;
use utoipa::openapi::OpenApi;

use crate::config::AppConfig;

/// Router with `/openapi.json`, `/docs`, `/redoc` and a `/` redirect to
/// the docs page. Links inside the pages are absolute, derived from the
/// configured docs prefix.
pub(crate) fn docs_router(config: &AppConfig, mut openapi: OpenApi) -> Router {
    openapi.info.title = config.title.clone();
    openapi.info.version = config.version.clone();

    let base = config.docs_prefix().trim_end_matches('/').to_owned();
    let openapi_url = format!("{base}/openapi.json");
    let docs_url = format!("{base}/docs");

    let title = if config.title.is_empty() {
        "API".to_owned()
    } else {
        config.title.clone()
    };
    let swagger_html = swagger_page(&openapi_url, &title);
    let redoc_html = redoc_page(&openapi_url, &title);

    Router::new()
        .route(
            "/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        .route("/docs", get(move || async move { Html(swagger_html) }))
        .route("/redoc", get(move || async move { Html(redoc_html) }))
        .route("/", get(move || async move { Redirect::to(&docs_url) }))
}

fn swagger_page(openapi_url: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8"/>
    <title>{title} - Swagger UI</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css"/>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({{url: "{openapi_url}", dom_id: "#swagger-ui"}});
    </script>
</body>
</html>"#
    )
}

fn redoc_page(openapi_url: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8"/>
    <title>{title} - ReDoc</title>
</head>
<body>
    <redoc spec-url="{openapi_url}"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_reference_the_openapi_url() {
        let swagger = swagger_page("/api/v1/openapi.json", "Demo");
        assert!(swagger.contains("/api/v1/openapi.json"));
        assert!(swagger.contains("Demo - Swagger UI"));

        let redoc = redoc_page("/api/v1/openapi.json", "Demo");
        assert!(redoc.contains(r#"spec-url="/api/v1/openapi.json""#));
    }
}
