// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply requests in flight.

use std::collections::HashMap;

use marquee_core::{QueryId, ReplyHandle, ReplyRequester};
use tracing::{debug, info};

/// Requester for deployments where an external model polls the rotation and
/// posts answers over HTTP. Requests are only logged.
#[derive(Debug, Default)]
pub struct ExternalReplyRequester;

impl ReplyRequester for ExternalReplyRequester {
    fn name(&self) -> &str {
        "external"
    }

    fn request(&self, handle: ReplyHandle) {
        info!(query = %handle.query_id, prompt = %handle.prompt, "awaiting external reply");
    }
}

/// Handles that were fired and have not completed or failed, oldest first,
/// with the reply text streamed so far.
#[derive(Debug, Default)]
pub struct OutstandingReplies {
    order: Vec<ReplyHandle>,
    partial: HashMap<QueryId, String>,
}

impl OutstandingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new request. Returns false if this query is already outstanding.
    pub fn begin(&mut self, handle: ReplyHandle) -> bool {
        if self.is_outstanding(&handle.query_id) {
            return false;
        }
        self.partial.insert(handle.query_id.clone(), String::new());
        self.order.push(handle);
        true
    }

    pub fn is_outstanding(&self, id: &QueryId) -> bool {
        self.partial.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn oldest(&self) -> Option<&ReplyHandle> {
        self.order.first()
    }

    /// Accumulate streamed text. Chunks for unknown handles are ignored.
    pub fn append(&mut self, id: &QueryId, chunk: &str) {
        match self.partial.get_mut(id) {
            Some(text) => text.push_str(chunk),
            None => debug!(query = %id, "chunk for unknown reply"),
        }
    }

    /// Stop tracking `id`, returning whatever text had accumulated.
    pub fn finish(&mut self, id: &QueryId) -> Option<String> {
        self.order.retain(|h| &h.query_id != id);
        self.partial.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(prompt: &str) -> ReplyHandle {
        ReplyHandle {
            query_id: QueryId::new(),
            prompt: prompt.into(),
        }
    }

    #[test]
    fn same_query_is_not_tracked_twice() {
        let mut replies = OutstandingReplies::new();
        let h = handle("q");
        assert!(replies.begin(h.clone()));
        assert!(!replies.begin(h.clone()));
        assert_eq!(replies.len(), 1);
    }

    #[test]
    fn chunks_accumulate_until_finish() {
        let mut replies = OutstandingReplies::new();
        let h = handle("q");
        replies.begin(h.clone());
        replies.append(&h.query_id, "HEL");
        replies.append(&h.query_id, "LO");
        assert_eq!(replies.finish(&h.query_id).as_deref(), Some("HELLO"));
        assert!(replies.is_empty());
        assert_eq!(replies.finish(&h.query_id), None);
    }

    #[test]
    fn oldest_is_first_begun() {
        let mut replies = OutstandingReplies::new();
        let a = handle("a");
        let b = handle("b");
        replies.begin(a.clone());
        replies.begin(b.clone());
        assert_eq!(replies.oldest(), Some(&a));
        replies.finish(&a.query_id);
        assert_eq!(replies.oldest(), Some(&b));
    }
}
