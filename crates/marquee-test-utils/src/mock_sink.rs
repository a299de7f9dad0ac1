// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame sink that captures everything written to it.

use std::sync::{Arc, Mutex, PoisonError};

use marquee_core::{FrameSink, MarqueeError, Message, wire};

/// Captures frames for assertions. Clones share the same buffer, so a test
/// can hand one clone to the link and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    fail: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose writes always fail, as an unplugged device would.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured frames decoded back into messages. Frames that do not parse
    /// are skipped.
    pub fn messages(&self) -> Vec<Message> {
        self.frames()
            .iter()
            .filter_map(|frame| std::str::from_utf8(frame).ok())
            .filter_map(|json| wire::decode(json.trim_end()).ok())
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl FrameSink for MockSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), MarqueeError> {
        if self.fail {
            return Err(MarqueeError::Transport {
                message: "mock sink unplugged".into(),
                source: None,
            });
        }
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_frames() {
        let sink = MockSink::new();
        let mut writer = sink.clone();
        writer.write_frame(b"{\"str\":\" \",\"type\":\"D\"}\n").unwrap();
        assert_eq!(sink.frame_count(), 1);
        assert_eq!(sink.messages(), vec![Message::placeholder()]);
    }

    #[test]
    fn failing_sink_errors() {
        let mut sink = MockSink::failing();
        assert!(sink.write_frame(b"x").is_err());
        assert_eq!(sink.frame_count(), 0);
    }
}
