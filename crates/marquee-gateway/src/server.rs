// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use marquee_config::model::GatewayConfig;
use marquee_core::MarqueeError;
use marquee_engine::MarqueeEngine;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Data for the health endpoint.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    pub sign_name: String,
}

/// Shared state for axum request handlers.
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub engine: Arc<MarqueeEngine>,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(engine: Arc<MarqueeEngine>, sign_name: impl Into<String>) -> Self {
        Self {
            engine,
            health: HealthState {
                start_time: Instant::now(),
                sign_name: sign_name.into(),
            },
        }
    }
}

/// All gateway routes over `state`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/messages", get(handlers::get_messages))
        .route("/newUserMessage", post(handlers::post_user_message))
        .route("/currentTrack", post(handlers::post_current_track))
        .route("/isGeneratingThought", post(handlers::post_generating_thought))
        .route("/newGPTReply", post(handlers::post_reply))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until `cancel` fires.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), MarqueeError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MarqueeError::Transport {
            message: format!("failed to bind gateway to {addr}"),
            source: Some(Box::new(e)),
        })?;

    info!(addr = %addr, "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| MarqueeError::Transport {
            message: "gateway server error".to_string(),
            source: Some(Box::new(e)),
        })?;

    info!("gateway stopped");
    Ok(())
}
