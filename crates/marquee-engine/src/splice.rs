// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing a reply into the rotation next to the query that asked for it.

use marquee_core::{MarqueeEntry, QueryId};
use marquee_storage::Repository;
use tracing::{info, warn};

/// Where a reply ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// The query at `query_index` became a plain entry; the reply sits right after it.
    Spliced { query_index: usize },
    /// The query was gone; the reply was placed at `reply_index` instead.
    Degraded { reply_index: usize },
    /// The reply was blank and nothing changed.
    Dropped,
}

impl SpliceOutcome {
    /// Index of the inserted reply entry, if one was inserted.
    pub fn reply_index(self) -> Option<usize> {
        match self {
            SpliceOutcome::Spliced { query_index } => Some(query_index + 1),
            SpliceOutcome::Degraded { reply_index } => Some(reply_index),
            SpliceOutcome::Dropped => None,
        }
    }
}

/// Insert `reply` after the query `query`, and turn the query into a user entry.
///
/// When the query is no longer in the rotation (deleted, or `None` because
/// the reply could not be correlated), the reply goes after the head entry
/// without rewriting anything.
pub fn splice_reply(repo: &mut Repository, query: Option<&QueryId>, reply: &str) -> SpliceOutcome {
    if reply.trim().is_empty() {
        warn!("blank reply; not adding to rotation");
        return SpliceOutcome::Dropped;
    }
    let reply_entry = MarqueeEntry::gpt_reply(reply.to_ascii_uppercase());

    let position = query.and_then(|id| repo.position_of(id));
    match position {
        Some(index) => {
            let answered = repo.get(index).map(MarqueeEntry::to_user);
            repo.insert_marquee(index + 1, reply_entry);
            if let Some(answered) = answered {
                repo.replace_marquee(index, answered);
            }
            info!(query_index = index, "reply spliced after its query");
            SpliceOutcome::Spliced { query_index: index }
        }
        None => {
            let reply_index = repo.len().min(1);
            repo.insert_marquee(reply_index, reply_entry);
            warn!(reply_index, "query for reply not found; placed after head entry");
            SpliceOutcome::Degraded { reply_index }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation_with_query() -> (Repository, QueryId) {
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::user("OLDEST"));
        repo.push_marquee(MarqueeEntry::gpt_query("ravegpt what is love"));
        repo.push_marquee(MarqueeEntry::user("NEWEST"));
        let id = repo.get(1).and_then(|e| e.query_id()).cloned().unwrap();
        (repo, id)
    }

    #[test]
    fn only_ascii_letters_are_upper_cased() {
        let (mut repo, id) = rotation_with_query();
        splice_reply(&mut repo, Some(&id), "straße 🚀 café");
        assert_eq!(repo.get(2), Some(&MarqueeEntry::gpt_reply("STRAßE 🚀 CAFé")));
    }

    #[test]
    fn reply_lands_right_after_its_query() {
        let (mut repo, id) = rotation_with_query();
        let outcome = splice_reply(&mut repo, Some(&id), "baby don't hurt me");
        assert_eq!(outcome, SpliceOutcome::Spliced { query_index: 1 });
        assert_eq!(repo.len(), 4);
        assert_eq!(repo.get(1), Some(&MarqueeEntry::user("ravegpt what is love")));
        assert_eq!(repo.get(2), Some(&MarqueeEntry::gpt_reply("BABY DON'T HURT ME")));
        assert_eq!(repo.get(3), Some(&MarqueeEntry::user("OLDEST")));
        assert_eq!(outcome.reply_index(), Some(2));
    }

    #[test]
    fn blank_reply_changes_nothing() {
        let (mut repo, id) = rotation_with_query();
        assert_eq!(splice_reply(&mut repo, Some(&id), "  \n"), SpliceOutcome::Dropped);
        assert_eq!(repo.len(), 3);
        assert!(repo.get(1).and_then(|e| e.query_id()).is_some());
    }

    #[test]
    fn missing_query_falls_back_after_head() {
        let (mut repo, _) = rotation_with_query();
        let gone = QueryId::new();
        let outcome = splice_reply(&mut repo, Some(&gone), "hi");
        assert_eq!(outcome, SpliceOutcome::Degraded { reply_index: 1 });
        assert_eq!(repo.get(0), Some(&MarqueeEntry::user("NEWEST")));
        assert_eq!(repo.get(1), Some(&MarqueeEntry::gpt_reply("HI")));
        // The pending query is untouched.
        assert!(repo.get(2).and_then(|e| e.query_id()).is_some());
    }

    #[test]
    fn empty_rotation_takes_reply_at_head() {
        let mut repo = Repository::in_memory();
        let outcome = splice_reply(&mut repo, None, "hello");
        assert_eq!(outcome, SpliceOutcome::Degraded { reply_index: 0 });
        assert_eq!(repo.rotation(), &[MarqueeEntry::gpt_reply("HELLO")]);
    }

    #[test]
    fn concurrent_queries_splice_independently() {
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::gpt_query("first"));
        repo.push_marquee(MarqueeEntry::gpt_query("second"));
        let second = repo.get(0).and_then(|e| e.query_id()).cloned().unwrap();
        let first = repo.get(1).and_then(|e| e.query_id()).cloned().unwrap();

        splice_reply(&mut repo, Some(&first), "a1");
        splice_reply(&mut repo, Some(&second), "a2");
        let texts: Vec<&str> = repo.rotation().iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["second", "A2", "first", "A1"]);
    }
}
