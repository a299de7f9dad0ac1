// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP ingestion for the Marquee sign.
//!
//! Producers that are not on the sign's own radio link (the DJ software
//! bridge, an external language model, a phone on the venue network) post
//! here. Every route feeds the shared [`MarqueeEngine`](marquee_engine::MarqueeEngine)
//! directly; nothing is queued in the gateway itself.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, HealthState, router, start_server};
