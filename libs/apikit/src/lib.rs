//! apikit — pre-configured Axum application kit
//!
//! The kit wraps an axum application with the plumbing every service ends
//! up writing by hand: request/response logging with trace ids, a
//! centralized error-to-response mapping, an environment-driven structured
//! logger, layered configuration, health check and docs routes, lifecycle
//! hooks and graceful shutdown.
//!
//! Quick start:
//!
//! ```ignore
//! use apikit::server::AppBuilder;
//! use apikit::{AppConfig, api};
//! use axum::{Router, routing::get};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let router = Router::new().route("/hello", get(|| async { "hello" }));
//!     AppBuilder::new(AppConfig::default())
//!         .with_router(router)
//!         .with_errors(api::builtin_registry())
//!         .build()?
//!         .serve()
//!         .await
//! }
//! ```

pub mod api;
pub mod config;
pub mod server;
pub mod telemetry;

// Re-export the classification types so callers rarely need the
// apikit-errors crate directly.
pub use apikit_errors::{ErrorBody, ErrorInfo, ErrorRegistry, Severity};

pub use config::{AppConfig, Stage};
pub use server::{App, AppBuilder};
