// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local keyboard entry with live echo and an inactivity countdown.
//!
//! All methods take the current [`Instant`] so timing can be driven
//! explicitly in tests.

use std::time::{Duration, Instant};

use marquee_config::model::KeyboardConfig;
use marquee_core::{EchoMode, Message};
use tracing::{debug, info};

/// What the keyboard contributes to the next pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardPoll {
    /// Not typing.
    Idle,
    /// Show this echo instead of anything else.
    Echo(Message),
    /// Input was abandoned after the timeout.
    TimedOut,
}

/// Result of pressing escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// The echo switched to warning mode.
    Warned,
    /// Input was abandoned.
    Abandoned,
}

#[derive(Debug)]
pub struct KeyboardInput {
    buffer: String,
    active: bool,
    warning: bool,
    started_at: Option<Instant>,
    last_input_at: Option<Instant>,
    timeout: Duration,
    warning_window: Duration,
    min_entry: Duration,
}

impl KeyboardInput {
    pub fn new(config: &KeyboardConfig) -> Self {
        Self {
            buffer: String::new(),
            active: false,
            warning: false,
            started_at: None,
            last_input_at: None,
            timeout: Duration::from_millis(config.timeout_ms),
            warning_window: Duration::from_millis(config.warning_ms),
            min_entry: Duration::from_millis(config.min_entry_ms),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Append a typed character. NUL is ignored.
    pub fn key(&mut self, key: char, now: Instant) {
        if key == '\0' {
            debug!("ignoring NUL key");
            return;
        }
        if self.buffer.is_empty() {
            self.started_at = Some(now);
        }
        self.active = true;
        self.warning = false;
        self.last_input_at = Some(now);
        self.buffer.push(key);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.buffer.pop().is_some() {
            self.warning = false;
            self.last_input_at = Some(now);
        }
    }

    /// First escape jumps to the warning period; a second one abandons input.
    pub fn escape(&mut self, now: Instant) -> EscapeOutcome {
        if !self.buffer.trim().is_empty() && !self.warning {
            let shift = self.timeout.saturating_sub(self.warning_window);
            self.last_input_at = Some(now.checked_sub(shift).unwrap_or(now));
            self.warning = true;
            EscapeOutcome::Warned
        } else {
            info!("keyboard input abandoned");
            self.end();
            EscapeOutcome::Abandoned
        }
    }

    /// Finish typing. Returns the text to add to the rotation, if accepted.
    ///
    /// Blank input just ends entry. Submitting sooner than the minimum entry
    /// time after the first key is ignored and typing continues.
    pub fn submit(&mut self, now: Instant) -> Option<String> {
        if self.buffer.trim().is_empty() {
            self.end();
            return None;
        }
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        if elapsed <= self.min_entry {
            debug!(elapsed_ms = elapsed.as_millis() as u64, "submit too soon; ignored");
            return None;
        }
        let text = std::mem::take(&mut self.buffer);
        self.end();
        Some(text)
    }

    /// What to show for the next pull.
    pub fn poll(&mut self, now: Instant) -> KeyboardPoll {
        if !self.active {
            return KeyboardPoll::Idle;
        }
        let idle = self
            .last_input_at
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();

        if idle >= self.timeout {
            info!("keyboard input timed out");
            self.end();
            return KeyboardPoll::TimedOut;
        }

        if idle > self.timeout.saturating_sub(self.warning_window) {
            self.warning = true;
        }
        let mode = if self.warning {
            EchoMode::Warning
        } else {
            EchoMode::Input
        };
        KeyboardPoll::Echo(Message::keyboard_echo(&self.buffer, mode))
    }

    fn end(&mut self) {
        self.buffer.clear();
        self.active = false;
        self.warning = false;
        self.started_at = None;
        self.last_input_at = None;
    }
}
