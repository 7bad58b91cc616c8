mod api;

use std::path::{Path, PathBuf};

use anyhow::Result;
use apikit::api::{InvalidAccessTokenError, builtin_registry};
use apikit::config::AppConfig;
use apikit::server::AppBuilder;
use apikit::telemetry;
use apikit::{ErrorInfo, Severity};
use axum::http::StatusCode;
use clap::{Parser, Subcommand};

/// Demo service built on apikit
#[derive(Parser)]
#[command(name = "demo-server")]
#[command(about = "Demo service built on apikit", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config {
        if !Path::new(path).is_file() {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
    }

    telemetry::init_logging_from_env();

    // Layered config: defaults -> YAML (if provided) -> env (APIKIT__*)
    // -> CLI overrides.
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    println!("Configuration is valid");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!(stage = %config.stage, "demo server starting");

    // Rebind the token error with a service-specific message; the latest
    // registration wins.
    let mut registry = builtin_registry();
    registry.register::<InvalidAccessTokenError>(ErrorInfo::new(
        StatusCode::UNAUTHORIZED,
        "token expired",
        Severity::Warning,
    ));

    AppBuilder::new(config)
        .with_router(api::router())
        .with_errors(registry)
        .on_startup(|| async {
            tracing::info!("startup hook: warming caches");
            Ok(())
        })
        .on_shutdown(|| async {
            tracing::info!("shutdown hook: flushing buffers");
            Ok(())
        })
        .build()?
        .serve()
        .await
}
