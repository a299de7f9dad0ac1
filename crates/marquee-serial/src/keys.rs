// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keystrokes from a local keyboard, read as raw bytes.
//!
//! Backspace (BS or DEL), ESC and Enter (CR, LF or CRLF) drive the echo state
//! machine; other control bytes, NUL included, are ignored.

use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::thread;

use marquee_core::MarqueeError;
use marquee_engine::MarqueeEngine;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What a single keyboard character asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Char(char),
    Backspace,
    Escape,
    Submit,
}

fn classify(c: char) -> Option<KeyAction> {
    match c {
        '\u{8}' | '\u{7f}' => Some(KeyAction::Backspace),
        '\u{1b}' => Some(KeyAction::Escape),
        '\r' | '\n' => Some(KeyAction::Submit),
        c if c.is_control() => None,
        c => Some(KeyAction::Char(c)),
    }
}

/// Turns a byte stream into key actions. A UTF-8 sequence split across reads
/// is held until it completes; invalid bytes are skipped.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
    after_cr: bool,
}

impl KeyDecoder {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<KeyAction> {
        self.pending.extend_from_slice(bytes);
        let mut actions = Vec::new();
        loop {
            let (text, consumed, done) = match std::str::from_utf8(&self.pending) {
                Ok(text) => (text.to_string(), self.pending.len(), true),
                Err(e) => {
                    let valid = e.valid_up_to();
                    let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                    match e.error_len() {
                        Some(bad) => {
                            debug!(bytes = bad, "skipping invalid keyboard bytes");
                            (text, valid + bad, false)
                        }
                        None => (text, valid, true),
                    }
                }
            };
            self.push_chars(&text, &mut actions);
            self.pending.drain(..consumed);
            if done {
                return actions;
            }
        }
    }

    fn push_chars(&mut self, text: &str, actions: &mut Vec<KeyAction>) {
        for c in text.chars() {
            // CRLF is one Enter.
            if self.after_cr && c == '\n' {
                self.after_cr = false;
                continue;
            }
            self.after_cr = c == '\r';
            actions.extend(classify(c));
        }
    }
}

fn apply(engine: &MarqueeEngine, action: KeyAction) {
    match action {
        KeyAction::Char(c) => engine.key(c),
        KeyAction::Backspace => engine.backspace(),
        KeyAction::Escape => engine.escape(),
        KeyAction::Submit => engine.submit_keyboard(),
    }
}

/// Feed keystrokes from `input` into the engine until EOF or cancellation.
///
/// Returns the number of key actions applied.
pub fn run_keys<R: Read>(
    engine: &MarqueeEngine,
    mut input: R,
    cancel: &CancellationToken,
) -> u64 {
    let mut buffer = [0u8; 64];
    let mut decoder = KeyDecoder::default();
    let mut keys = 0;
    while !cancel.is_cancelled() {
        match input.read(&mut buffer) {
            Ok(0) => {
                info!(keys, "keyboard input closed");
                break;
            }
            Ok(n) => {
                for action in decoder.feed(&buffer[..n]) {
                    apply(engine, action);
                    keys += 1;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(error = %e, "unable to read keyboard input");
                break;
            }
        }
    }
    keys
}

/// Read keystrokes from standard input on their own thread.
pub fn spawn_keys(
    engine: Arc<MarqueeEngine>,
    cancel: CancellationToken,
) -> Result<thread::JoinHandle<u64>, MarqueeError> {
    thread::Builder::new()
        .name("keyboard".into())
        .spawn(move || run_keys(&engine, std::io::stdin().lock(), &cancel))
        .map_err(MarqueeError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_config::MarqueeConfig;
    use marquee_core::{EchoMode, Message};
    use marquee_engine::ExternalReplyRequester;
    use std::io::Cursor;

    #[test]
    fn control_bytes_map_to_actions() {
        let mut decoder = KeyDecoder::default();
        assert_eq!(
            decoder.feed(b"a\x08\x7f\x1b\x00\x07b"),
            vec![
                KeyAction::Char('a'),
                KeyAction::Backspace,
                KeyAction::Backspace,
                KeyAction::Escape,
                KeyAction::Char('b'),
            ]
        );
    }

    #[test]
    fn crlf_is_a_single_submit() {
        let mut decoder = KeyDecoder::default();
        assert_eq!(decoder.feed(b"x\r"), vec![KeyAction::Char('x'), KeyAction::Submit]);
        assert_eq!(decoder.feed(b"\n\n"), vec![KeyAction::Submit]);
    }

    #[test]
    fn split_utf8_waits_for_the_rest() {
        let mut decoder = KeyDecoder::default();
        let accented = "é".as_bytes();
        assert!(decoder.feed(&accented[..1]).is_empty());
        assert_eq!(decoder.feed(&accented[1..]), vec![KeyAction::Char('é')]);
    }

    #[test]
    fn invalid_bytes_are_skipped() {
        let mut decoder = KeyDecoder::default();
        assert_eq!(
            decoder.feed(b"a\xffb"),
            vec![KeyAction::Char('a'), KeyAction::Char('b')]
        );
    }

    #[test]
    fn typed_keys_echo_on_the_sign() {
        let engine =
            MarqueeEngine::in_memory(&MarqueeConfig::default(), Arc::new(ExternalReplyRequester));
        let keys = run_keys(&engine, Cursor::new(b"hix\x08".to_vec()), &CancellationToken::new());
        assert_eq!(keys, 4);
        assert_eq!(
            engine.next_message(),
            Message::keyboard_echo("hi", EchoMode::Input)
        );
    }

    #[test]
    fn cancelled_reader_reads_nothing() {
        let engine =
            MarqueeEngine::in_memory(&MarqueeConfig::default(), Arc::new(ExternalReplyRequester));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(run_keys(&engine, Cursor::new(b"abc".to_vec()), &cancel), 0);
    }
}
