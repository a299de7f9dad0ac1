// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply requester for deterministic testing.
//!
//! `MockRequester` records every handle it is asked to answer. When wired to
//! a reply channel it also plays back scripted replies as a stream of
//! [`ReplyEvent`]s, the way a real model integration would.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use marquee_core::{ReplyEvent, ReplyHandle, ReplyRequester};
use tokio::sync::mpsc::UnboundedSender;

/// What the mock does with the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Stream the text in whitespace-separated chunks, then complete.
    Answer(String),
    /// Start, then fail with this error.
    Fail(String),
}

#[derive(Default)]
pub struct MockRequester {
    requests: Arc<Mutex<Vec<ReplyHandle>>>,
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    events: Option<UnboundedSender<ReplyEvent>>,
}

impl MockRequester {
    /// A requester that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// A requester that answers on `events` from `script`, in order.
    /// Requests beyond the script are only recorded.
    pub fn scripted(events: UnboundedSender<ReplyEvent>, script: Vec<ScriptedReply>) -> Self {
        Self {
            requests: Arc::default(),
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            events: Some(events),
        }
    }

    pub fn push_reply(&self, reply: ScriptedReply) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Every handle requested so far.
    pub fn requests(&self) -> Vec<ReplyHandle> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn play(&self, handle: &ReplyHandle, reply: ScriptedReply) {
        let Some(events) = &self.events else {
            return;
        };
        let _ = events.send(ReplyEvent::Started(handle.clone()));
        match reply {
            ScriptedReply::Answer(text) => {
                for (i, word) in text.split(' ').enumerate() {
                    let chunk = if i == 0 {
                        word.to_string()
                    } else {
                        format!(" {word}")
                    };
                    let _ = events.send(ReplyEvent::Chunk {
                        handle: handle.clone(),
                        text: chunk,
                    });
                }
                let _ = events.send(ReplyEvent::Completed(handle.clone()));
            }
            ScriptedReply::Fail(error) => {
                let _ = events.send(ReplyEvent::Failed {
                    handle: handle.clone(),
                    error,
                });
            }
        }
    }
}

impl ReplyRequester for MockRequester {
    fn name(&self) -> &str {
        "mock"
    }

    fn request(&self, handle: ReplyHandle) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle.clone());
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(reply) = next {
            self.play(&handle, reply);
        }
    }
}
