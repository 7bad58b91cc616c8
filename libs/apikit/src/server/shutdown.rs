//! Process termination signals

use anyhow::Result;
use tokio::signal;

/// Resolve once a termination signal (Ctrl+C or SIGTERM) arrives.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn shutdown_signal() -> Result<()> {
    tokio::select! {
        res = ctrl_c() => res,
        res = sigterm() => res,
    }
}

async fn ctrl_c() -> Result<()> {
    signal::ctrl_c().await?;
    tracing::info!("received Ctrl+C, initiating graceful shutdown");
    Ok(())
}

#[cfg(unix)]
async fn sigterm() -> Result<()> {
    let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    term.recv().await;
    tracing::info!("received SIGTERM, initiating graceful shutdown");
    Ok(())
}

#[cfg(not(unix))]
async fn sigterm() -> Result<()> {
    std::future::pending().await
}
