// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Marquee sign engine.
//!
//! This crate provides the message model, the record format written to the
//! sign and to disk, the shared error type, and the traits behind which the
//! engine reaches its external collaborators.

pub mod error;
pub mod message;
pub mod normalize;
pub mod traits;
pub mod types;
pub mod wire;

// Re-export key items at crate root for ergonomic imports.
pub use error::MarqueeError;
pub use message::{MarqueeEntry, Message, Thinking, Utility};
pub use types::{EchoMode, Icon, QueryId, ReplyEvent, ReplyHandle, Rgb, Track, TypeCode, colors};
pub use wire::WireRecord;

pub use traits::{FrameSink, ReplyRequester};
