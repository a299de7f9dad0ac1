// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams to the collaborators the engine does not own: the language-model
//! client and the sign's serial line.

pub mod reply;
pub mod sink;

pub use reply::ReplyRequester;
pub use sink::FrameSink;
