// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Marquee integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic tests
//! without a sign, a serial port, or a language model.
//!
//! # Components
//!
//! - [`MockRequester`] - Reply requester with scripted streamed replies
//! - [`MockSink`] - Frame sink that captures written frames
//! - [`TestHarness`] - Engine over a temp data directory

pub mod harness;
pub mod mock_requester;
pub mod mock_sink;

pub use harness::TestHarness;
pub use mock_requester::{MockRequester, ScriptedReply};
pub use mock_sink::MockSink;
