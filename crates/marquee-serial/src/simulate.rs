// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A timer standing in for the sign when no device is configured.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::FrameSink;
use marquee_engine::MarqueeEngine;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::link::serve_pull;

/// Serve one pull every `interval` until cancelled. Returns the number of
/// pulls served.
pub async fn run_simulator(
    engine: Arc<MarqueeEngine>,
    mut sink: impl FrameSink,
    interval: Duration,
    max_frame_bytes: usize,
    cancel: CancellationToken,
) -> u64 {
    info!(interval_ms = interval.as_millis() as u64, "simulating sign pulls");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pulls = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                serve_pull(&engine, &mut sink, max_frame_bytes);
                pulls += 1;
            }
        }
    }
    info!(pulls, "simulator stopped");
    pulls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::WriterSink;
    use marquee_config::MarqueeConfig;
    use marquee_engine::ExternalReplyRequester;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let engine = Arc::new(MarqueeEngine::in_memory(
            &MarqueeConfig::default(),
            Arc::new(ExternalReplyRequester),
        ));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_simulator(
            engine,
            WriterSink::new(Vec::new()),
            Duration::from_millis(100),
            700,
            cancel.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(350)).await;
        cancel.cancel();
        let pulls = task.await.unwrap();
        // First tick fires immediately.
        assert_eq!(pulls, 4);
    }
}
