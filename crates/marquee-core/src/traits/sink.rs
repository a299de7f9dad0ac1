// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destination for encoded frames.

use crate::error::MarqueeError;

/// Writes one encoded message frame to the sign. No acknowledgement is read.
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), MarqueeError>;
}
