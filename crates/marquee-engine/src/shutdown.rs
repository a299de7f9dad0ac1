// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shutdown on SIGINT/SIGTERM, then flushing pending file writes.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Returns a token that is cancelled on the first SIGINT or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable; listening for Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
            info!("received SIGINT (Ctrl+C), shutting down");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT (Ctrl+C), shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, shutting down");
}

/// Wait up to `timeout` for the background file writer to drain.
///
/// The writer exits once every [`Persister`](marquee_storage::Persister)
/// clone is dropped, so callers drop the engine first.
pub async fn drain_writer(writer: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, writer).await {
        Ok(Ok(())) => info!("pending writes flushed"),
        Ok(Err(e)) => warn!(error = %e, "file writer task failed"),
        Err(_) => warn!(
            timeout_ms = timeout.as_millis() as u64,
            "timed out waiting for file writer"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_starts_uncancelled() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn drain_returns_when_writer_finishes() {
        let writer = tokio::spawn(async {});
        drain_writer(writer, Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn drain_gives_up_after_timeout() {
        let writer = tokio::spawn(std::future::pending::<()>());
        drain_writer(writer, Duration::from_millis(10)).await;
    }
}
