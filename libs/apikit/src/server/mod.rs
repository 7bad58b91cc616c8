//! Application assembly and lifecycle
//!
//! The factory turns caller routers plus an [`AppConfig`] into a
//! ready-to-serve application: routers mounted under the configured
//! prefix, CORS, health check, docs routes, the trace and error layers,
//! and lifecycle hooks around a signal-driven graceful shutdown.
//!
//! Phase order at serve time: startup hooks (sequential, first failure
//! aborts boot) → accept connections → wait for a termination signal →
//! drain in-flight requests up to `graceful_timeout` → shutdown hooks
//! (sequential, best-effort).

mod docs;
pub mod shutdown;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use utoipa::openapi::{Info, OpenApi, Paths};

use crate::api::error::{AppError, HttpError, builtin_registry};
use crate::api::error_layer::{ErrorContext, error_mapping_middleware, panic_response};
use crate::api::trace_layer::trace_middleware;
use crate::config::AppConfig;
use crate::telemetry;
use apikit_errors::ErrorRegistry;

/// Boxed async lifecycle hook, run once at startup or shutdown.
pub type LifecycleHook =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send>;

/// Builder assembling an [`App`] from routers, configuration, an error
/// registry and lifecycle hooks.
#[must_use]
pub struct AppBuilder {
    config: AppConfig,
    routers: Vec<Router>,
    registry: Option<ErrorRegistry>,
    openapi: Option<OpenApi>,
    startup_hooks: Vec<LifecycleHook>,
    shutdown_hooks: Vec<LifecycleHook>,
}

impl AppBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            routers: Vec::new(),
            registry: None,
            openapi: None,
            startup_hooks: Vec::new(),
            shutdown_hooks: Vec::new(),
        }
    }

    /// Add a router, mounted under the configured `prefix_url`.
    pub fn with_router(mut self, router: Router) -> Self {
        self.routers.push(router);
        self
    }

    /// Use `registry` for error classification. Defaults to
    /// [`builtin_registry`] when not called.
    pub fn with_errors(mut self, registry: ErrorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Serve `openapi` from the docs routes instead of an empty document.
    pub fn with_openapi(mut self, openapi: OpenApi) -> Self {
        self.openapi = Some(openapi);
        self
    }

    /// Queue a startup hook. Hooks run sequentially in declaration order
    /// before the server accepts connections; the first failure aborts
    /// boot.
    pub fn on_startup<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.startup_hooks.push(Box::new(move || Box::pin(hook())));
        self
    }

    /// Queue a shutdown hook. Hooks run sequentially in declaration order
    /// after the drain window; a failing hook is logged and the remaining
    /// hooks still run.
    pub fn on_shutdown<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.shutdown_hooks.push(Box::new(move || Box::pin(hook())));
        self
    }

    /// Assemble the application.
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation.
    pub fn build(self) -> anyhow::Result<App> {
        self.config.validate()?;
        let registry = self.registry.unwrap_or_else(builtin_registry);
        let openapi = self
            .openapi
            .unwrap_or_else(|| OpenApi::new(Info::new("", ""), Paths::new()));
        let router = build_router(&self.config, self.routers, registry, openapi);
        Ok(App {
            router,
            config: self.config,
            startup_hooks: self.startup_hooks,
            shutdown_hooks: self.shutdown_hooks,
        })
    }
}

/// A fully assembled application, ready to serve.
pub struct App {
    router: Router,
    config: AppConfig,
    startup_hooks: Vec<LifecycleHook>,
    shutdown_hooks: Vec<LifecycleHook>,
}

impl App {
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The framework-native router, for tests or custom serving. Lifecycle
    /// hooks are not run on this path.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind the configured address and serve until a termination signal,
    /// then drain and run shutdown hooks.
    ///
    /// # Errors
    /// Returns an error if the listener cannot bind, a startup hook fails,
    /// or the server fails while running.
    pub async fn serve(self) -> anyhow::Result<()> {
        telemetry::init_logging_from_env();

        let host = self.config.server.host.clone();
        let port = self.config.server.port;
        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("failed to bind {host}:{port}"))?;

        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown::shutdown_signal().await {
                tracing::warn!(error = %e, "signal handler failed, shutting down");
            }
            signal_cancel.cancel();
        });

        self.serve_with_shutdown(listener, cancel).await
    }

    /// Serve on a pre-bound listener until `cancel` fires.
    ///
    /// # Errors
    /// Returns an error if a startup hook fails or the server fails while
    /// running.
    pub async fn serve_with_shutdown(
        self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let Self {
            router,
            config,
            startup_hooks,
            shutdown_hooks,
        } = self;

        for (index, hook) in startup_hooks.into_iter().enumerate() {
            hook()
                .await
                .with_context(|| format!("startup hook #{index} failed, aborting boot"))?;
        }

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, title = %config.title, "server listening");
        }

        let drain = cancel.clone();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move { drain.cancelled().await });
        let mut task = tokio::spawn(async move { server.await });

        let mut result: anyhow::Result<()> = Ok(());
        tokio::select! {
            joined = &mut task => {
                result = flatten_join(joined);
            }
            () = cancel.cancelled() => {
                match tokio::time::timeout(config.graceful_timeout(), &mut task).await {
                    Ok(joined) => result = flatten_join(joined),
                    Err(_) => {
                        task.abort();
                        tracing::warn!(
                            timeout_s = config.graceful_timeout,
                            "graceful drain window elapsed, aborting in-flight requests"
                        );
                    }
                }
            }
        }

        for (index, hook) in shutdown_hooks.into_iter().enumerate() {
            if let Err(e) = hook().await {
                tracing::error!(hook = index, error = %format!("{e:#}"), "shutdown hook failed, continuing");
            }
        }

        result
    }
}

fn flatten_join(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> anyhow::Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("server error")),
        Err(e) => Err(anyhow::Error::new(e).context("server task failed")),
    }
}

fn build_router(
    config: &AppConfig,
    routers: Vec<Router>,
    registry: ErrorRegistry,
    openapi: OpenApi,
) -> Router {
    let mut api = Router::new();
    for router in routers {
        api = api.merge(router);
    }

    let prefix = config.prefix_url.trim_end_matches('/');
    let docs_prefix = config.docs_prefix().trim_end_matches('/').to_owned();

    // Docs sharing the router prefix are merged before nesting so the two
    // mounts cannot conflict; a distinct docs prefix gets its own mount.
    let mut standalone_docs = None;
    if config.docs_enable {
        let docs = docs::docs_router(config, openapi);
        if docs_prefix == prefix {
            api = api.merge(docs);
        } else {
            standalone_docs = Some(docs);
        }
    }

    let mut app = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };
    if let Some(docs) = standalone_docs {
        app = if docs_prefix.is_empty() {
            app.merge(docs)
        } else {
            app.nest(&docs_prefix, docs)
        };
    }

    app = app.route(&config.health_check_api, get(healthcheck));
    app = app.fallback(not_found);

    let ctx = Arc::new(ErrorContext {
        registry: Arc::new(registry),
        stage: config.stage,
    });
    // Innermost to outermost: panics become responses before the error
    // layer, which rewrites failures before the trace layer logs them.
    let mut app = app
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(ctx, error_mapping_middleware))
        .layer(middleware::from_fn(trace_middleware));
    if config.cors_enable {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

async fn healthcheck() -> &'static str {
    "OK"
}

async fn not_found() -> AppError {
    AppError::new(HttpError::not_found("not found"))
}
