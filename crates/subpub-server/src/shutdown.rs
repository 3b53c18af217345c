//! Graceful shutdown.
//!
//! On a termination signal the broker is closed first. Closing drops every
//! subscriber entry, so open event streams end once in-flight deliveries
//! drain, which lets the HTTP server finish its own graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use subpub_core::SubPub;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Waits for a termination signal (`SIGINT`, `SIGTERM`, `SIGQUIT`).
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Close `broker`, waiting at most `timeout` for in-flight deliveries.
pub async fn close_broker(broker: &dyn SubPub<Bytes>, timeout: Duration) {
    match broker.close(Instant::now() + timeout).await {
        Ok(()) => info!("Broker closed, all deliveries drained"),
        Err(e) if e.is_deadline_exceeded() => {
            warn!(error = %e, "Broker closed before all deliveries finished")
        }
        Err(e) => error!(error = %e, "Failed to close broker"),
    }
}

/// Future for `axum::serve(..).with_graceful_shutdown(..)`.
pub async fn shutdown_signal(broker: Arc<dyn SubPub<Bytes>>, timeout: Duration) {
    if let Err(e) = wait_for_shutdown_signal().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!(timeout_ms = timeout.as_millis() as u64, "Shutdown signal received");
    close_broker(broker.as_ref(), timeout).await;
}
