// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `marquee serve` command implementation.
//!
//! Opens the persisted rotation, starts the HTTP gateway and the optional
//! stdin keyboard, and answers sign pulls over the serial link (or a simulated
//! timer when no device is set) until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use marquee_config::MarqueeConfig;
use marquee_core::MarqueeError;
use marquee_engine::{ExternalReplyRequester, MarqueeEngine, shutdown};
use marquee_gateway::{GatewayState, start_server};
use marquee_serial::{LogSink, run_simulator, spawn_keys, spawn_link};
use marquee_storage::Persister;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long shutdown waits for queued file writes.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs the `marquee serve` command.
pub async fn run_serve(config: MarqueeConfig) -> Result<(), MarqueeError> {
    info!(sign = config.sign.name.as_str(), "starting marquee serve");

    let cancel = shutdown::install_signal_handler();
    let (persister, writer) = Persister::spawn();
    let engine = Arc::new(MarqueeEngine::open(
        &config,
        persister,
        Arc::new(ExternalReplyRequester),
    ));

    let gateway = config
        .gateway
        .enabled
        .then(|| spawn_gateway(&config, engine.clone(), cancel.clone()));

    if config.keyboard.stdin {
        // Detached like the link thread; stdin reads block.
        spawn_keys(engine.clone(), cancel.clone())?;
        info!("reading keyboard from stdin");
    }

    let simulator = match config.serial.device.as_deref() {
        Some(device) => {
            // The link thread is detached; it notices the token after its
            // next read times out.
            spawn_link(engine.clone(), config.serial.clone(), cancel.clone())?;
            info!(device, "sign link started");
            None
        }
        None => {
            warn!("no serial device configured; simulating sign pulls");
            Some(tokio::spawn(run_simulator(
                engine.clone(),
                LogSink,
                Duration::from_millis(config.serial.simulate_interval_ms),
                config.serial.max_frame_bytes,
                cancel.clone(),
            )))
        }
    };

    cancel.cancelled().await;
    info!("shutting down");

    if let Some(gateway) = gateway
        && let Err(e) = gateway.await
    {
        warn!(error = %e, "gateway task failed");
    }
    if let Some(simulator) = simulator
        && let Err(e) = simulator.await
    {
        warn!(error = %e, "simulator task failed");
    }

    let flushed = engine.flush();
    drop(engine);
    shutdown::drain_writer(writer, WRITER_DRAIN_TIMEOUT).await;
    flushed?;

    info!("marquee stopped");
    Ok(())
}

/// Serve the gateway in the background. A gateway that fails to start takes
/// the whole process down with it.
fn spawn_gateway(
    config: &MarqueeConfig,
    engine: Arc<MarqueeEngine>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let gateway_config = config.gateway.clone();
    let state = GatewayState::new(engine, config.sign.name.clone());
    tokio::spawn(async move {
        if let Err(e) = start_server(&gateway_config, state, cancel.clone()).await {
            error!(error = %e, "gateway failed; shutting down");
            cancel.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gateway_bind_failure_cancels_the_process() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = MarqueeConfig::default();
        config.gateway.host = "127.0.0.1".into();
        config.gateway.port = taken.local_addr().unwrap().port();

        let engine = Arc::new(MarqueeEngine::in_memory(
            &config,
            Arc::new(ExternalReplyRequester),
        ));
        let cancel = CancellationToken::new();
        spawn_gateway(&config, engine, cancel.clone()).await.unwrap();
        assert!(cancel.is_cancelled());
    }
}
