// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serial link between the engine and the sign hardware.
//!
//! The sign pulls: each time it is ready it sends a few bytes, and the link
//! answers with one JSON frame produced by
//! [`MarqueeEngine::next_message`](marquee_engine::MarqueeEngine::next_message).
//! Without a device, [`simulate::run_simulator`] drives pulls from a timer.
//! [`keys::run_keys`] feeds a local keyboard into the echo state machine.

pub mod frame;
pub mod keys;
pub mod link;
pub mod simulate;

pub use frame::encode_frame;
pub use keys::{KeyAction, KeyDecoder, run_keys, spawn_keys};
pub use link::{LogSink, WriterSink, run_link, serve_pull, spawn_link};
pub use simulate::run_simulator;
