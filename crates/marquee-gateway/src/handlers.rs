// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Every POST feeds the engine synchronously and answers with a short text
//! acknowledgement; the effect shows up on the sign's next pull.

use axum::{Json, extract::State, http::StatusCode};
use marquee_core::{Message, Track, WireRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::GatewayState;

/// Request body for POST /newUserMessage and POST /newGPTReply.
#[derive(Debug, Deserialize)]
pub struct PostedMessage {
    pub message: String,
}

/// Request body for POST /isGeneratingThought.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratingThought {
    pub is_generating: bool,
}

/// Response body for GET /messages.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub pointer: usize,
    pub paused: bool,
    pub chooser: bool,
    pub messages: Vec<WireRecord>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub sign: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /newUserMessage
///
/// Text starting with `!` is a command; anything else joins the rotation.
pub async fn post_user_message(
    State(state): State<GatewayState>,
    Json(body): Json<PostedMessage>,
) -> (StatusCode, String) {
    info!(message = %body.message, "received user message");
    state.engine.submit(&body.message);
    (StatusCode::OK, format!("Received message: {}", body.message))
}

/// POST /currentTrack
///
/// Fields other than `artist` and `title` are accepted and ignored.
pub async fn post_current_track(
    State(state): State<GatewayState>,
    Json(track): Json<Track>,
) -> (StatusCode, String) {
    info!(artist = %track.artist, title = %track.title, "received track");
    state.engine.now_playing(&track);
    (
        StatusCode::OK,
        format!("Received track: {} - {}", track.artist, track.title),
    )
}

/// POST /isGeneratingThought
pub async fn post_generating_thought(
    State(state): State<GatewayState>,
    Json(body): Json<GeneratingThought>,
) -> (StatusCode, &'static str) {
    state.engine.set_thinking(body.is_generating);
    (StatusCode::OK, "OK")
}

/// POST /newGPTReply
///
/// A reply produced outside the process; it is matched to the oldest
/// pending query.
pub async fn post_reply(
    State(state): State<GatewayState>,
    Json(body): Json<PostedMessage>,
) -> (StatusCode, &'static str) {
    info!(chars = body.message.chars().count(), "received external reply");
    state.engine.external_reply(&body.message);
    (StatusCode::OK, "OK")
}

/// GET /messages
pub async fn get_messages(State(state): State<GatewayState>) -> Json<MessagesResponse> {
    let snapshot = state.engine.snapshot();
    Json(MessagesResponse {
        pointer: snapshot.pointer,
        paused: snapshot.paused,
        chooser: snapshot.chooser,
        messages: snapshot
            .entries
            .into_iter()
            .map(|entry| WireRecord::from(&Message::from(entry)))
            .collect(),
    })
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sign: state.health.sign_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
