// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rotation, the one-time queue, and the recent-track memory.
//!
//! The rotation is newest-first: index 0 is the most recent entry. Every
//! rotation mutation persists a snapshot through the [`Persister`]. The
//! one-time queue is never persisted.

use std::collections::VecDeque;
use std::path::PathBuf;

use marquee_core::{MarqueeEntry, MarqueeError, Message, QueryId, Track};
use tracing::{debug, info, warn};

use crate::files;
use crate::writer::Persister;

/// Messages shown in rotation plus one-shot content queued ahead of them.
#[derive(Debug)]
pub struct Repository {
    rotation: Vec<MarqueeEntry>,
    one_time: VecDeque<Message>,
    recent_tracks: VecDeque<Track>,
    recent_capacity: usize,
    rotation_path: Option<PathBuf>,
    persister: Persister,
}

impl Repository {
    /// An empty repository that persists to `rotation_path`.
    pub fn new(rotation_path: Option<PathBuf>, persister: Persister, recent_capacity: usize) -> Self {
        Self {
            rotation: Vec::new(),
            one_time: VecDeque::new(),
            recent_tracks: VecDeque::with_capacity(recent_capacity),
            recent_capacity: recent_capacity.max(1),
            rotation_path,
            persister,
        }
    }

    /// Open the rotation stored at `rotation_path`.
    ///
    /// A file that cannot be read at all leaves the rotation empty; the error
    /// is logged and the next mutation rewrites the file.
    pub fn open(rotation_path: PathBuf, persister: Persister, recent_capacity: usize) -> Self {
        let mut repo = Self::new(Some(rotation_path), persister, recent_capacity);
        if let Err(e) = repo.load() {
            warn!(error = %e, "could not load rotation; starting empty");
        }
        repo
    }

    /// A repository that never touches disk.
    pub fn in_memory() -> Self {
        Self::new(None, Persister::inline(), 4)
    }

    /// Replace the in-memory rotation with the persisted one.
    pub fn load(&mut self) -> Result<usize, MarqueeError> {
        let Some(path) = &self.rotation_path else {
            return Ok(0);
        };
        self.rotation = files::read_rotation(path)?;
        info!(path = %path.display(), entries = self.rotation.len(), "rotation loaded");
        Ok(self.rotation.len())
    }

    /// Queue a snapshot of the rotation for writing.
    pub fn save(&self) {
        let Some(path) = &self.rotation_path else {
            return;
        };
        match files::encode_rotation(&self.rotation) {
            Ok(text) => self.persister.write(path.clone(), text),
            Err(e) => warn!(error = %e, "could not encode rotation"),
        }
    }

    /// Write the rotation on the calling thread, bypassing the writer task.
    pub fn flush(&self) -> Result<(), MarqueeError> {
        let Some(path) = &self.rotation_path else {
            return Ok(());
        };
        files::write_atomic(path, &files::encode_rotation(&self.rotation)?)
    }

    pub fn rotation(&self) -> &[MarqueeEntry] {
        &self.rotation
    }

    pub fn len(&self) -> usize {
        self.rotation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotation.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MarqueeEntry> {
        self.rotation.get(index)
    }

    /// Insert at the head of the rotation.
    pub fn push_marquee(&mut self, entry: MarqueeEntry) {
        debug!(text = entry.text(), "push to rotation head");
        self.rotation.insert(0, entry);
        self.save();
    }

    /// Insert at `index`, clamped to the end of the rotation.
    pub fn insert_marquee(&mut self, index: usize, entry: MarqueeEntry) {
        let index = index.min(self.rotation.len());
        self.rotation.insert(index, entry);
        self.save();
    }

    /// Overwrite the entry at `index`. Returns false when out of range.
    pub fn replace_marquee(&mut self, index: usize, entry: MarqueeEntry) -> bool {
        match self.rotation.get_mut(index) {
            Some(slot) => {
                *slot = entry;
                self.save();
                true
            }
            None => false,
        }
    }

    /// Remove the entry at `index`; no-op when out of range.
    pub fn delete_at(&mut self, index: usize) -> Option<MarqueeEntry> {
        if index >= self.rotation.len() {
            return None;
        }
        let removed = self.rotation.remove(index);
        self.save();
        Some(removed)
    }

    /// Current index of the pending query with this identity.
    pub fn position_of(&self, id: &QueryId) -> Option<usize> {
        self.rotation
            .iter()
            .position(|entry| entry.query_id() == Some(id))
    }

    /// Index of the pending query that was added first.
    pub fn oldest_query(&self) -> Option<usize> {
        self.rotation
            .iter()
            .rposition(|entry| entry.query_id().is_some())
    }

    /// First entry whose text contains `needle`, ignoring case.
    pub fn find(&self, needle: &str) -> Option<usize> {
        let needle = needle.to_lowercase();
        self.rotation
            .iter()
            .position(|entry| entry.text().to_lowercase().contains(&needle))
    }

    /// Put `messages` at the head of the one-time queue, shown in the given order.
    pub fn push_one_time(&mut self, messages: impl IntoIterator<Item = Message>) {
        let messages: Vec<Message> = messages.into_iter().collect();
        for message in messages.into_iter().rev() {
            self.one_time.push_front(message);
        }
    }

    /// Append to the tail of the one-time queue.
    pub fn enqueue_one_time(&mut self, message: Message) {
        self.one_time.push_back(message);
    }

    pub fn pop_one_time(&mut self) -> Option<Message> {
        self.one_time.pop_front()
    }

    pub fn one_time(&self) -> impl Iterator<Item = &Message> {
        self.one_time.iter()
    }

    pub fn one_time_is_empty(&self) -> bool {
        self.one_time.is_empty()
    }

    pub fn clear_one_time(&mut self) {
        if !self.one_time.is_empty() {
            debug!(dropped = self.one_time.len(), "one-time queue cleared");
            self.one_time.clear();
        }
    }

    /// Drop queued one-time messages matching `pred`; returns how many went.
    pub fn remove_one_time_where(&mut self, pred: impl Fn(&Message) -> bool) -> usize {
        let before = self.one_time.len();
        self.one_time.retain(|m| !pred(m));
        before - self.one_time.len()
    }

    /// Remember a track as announced. Returns false if it was announced recently.
    pub fn remember_track(&mut self, track: &Track) -> bool {
        if self.recent_tracks.contains(track) {
            return false;
        }
        while self.recent_tracks.len() >= self.recent_capacity {
            self.recent_tracks.pop_front();
        }
        self.recent_tracks.push_back(track.clone());
        true
    }

    pub fn recent_tracks(&self) -> impl Iterator<Item = &Track> {
        self.recent_tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::colors;

    fn texts(repo: &Repository) -> Vec<&str> {
        repo.rotation().iter().map(|e| e.text()).collect()
    }

    #[test]
    fn push_marquee_puts_newest_first() {
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::user("A"));
        repo.push_marquee(MarqueeEntry::user("B"));
        assert_eq!(texts(&repo), vec!["B", "A"]);
    }

    #[test]
    fn push_one_time_preserves_given_order_ahead_of_queue() {
        let mut repo = Repository::in_memory();
        repo.enqueue_one_time(Message::flashy("LATER"));
        repo.push_one_time([Message::flashy("1"), Message::flashy("2")]);
        let order: Vec<String> = std::iter::from_fn(|| repo.pop_one_time())
            .map(|m| m.text())
            .collect();
        assert_eq!(order, vec!["1", "2", "LATER"]);
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::user("A"));
        assert!(repo.delete_at(3).is_none());
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.delete_at(0), Some(MarqueeEntry::user("A")));
        assert!(repo.is_empty());
    }

    #[test]
    fn find_is_case_insensitive() {
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::user("Hello World"));
        repo.push_marquee(MarqueeEntry::user("other"));
        assert_eq!(repo.find("WORLD"), Some(1));
        assert_eq!(repo.find("missing"), None);
    }

    #[test]
    fn oldest_query_is_furthest_from_head() {
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::gpt_query("first"));
        repo.push_marquee(MarqueeEntry::user("between"));
        repo.push_marquee(MarqueeEntry::gpt_query("second"));
        assert_eq!(repo.oldest_query(), Some(2));
        let id = repo.get(0).and_then(|e| e.query_id()).cloned().unwrap();
        assert_eq!(repo.position_of(&id), Some(0));
    }

    #[test]
    fn remove_one_time_where_filters_matches() {
        let mut repo = Repository::in_memory();
        repo.enqueue_one_time(Message::thinking());
        repo.enqueue_one_time(Message::starfield());
        repo.enqueue_one_time(Message::thinking());
        let removed = repo.remove_one_time_where(|m| matches!(m, Message::GptThinking(_)));
        assert_eq!(removed, 2);
        assert_eq!(repo.pop_one_time(), Some(Message::starfield()));
    }

    #[test]
    fn recent_tracks_are_bounded_and_evict_oldest() {
        let mut repo = Repository::in_memory();
        for i in 0..5 {
            assert!(repo.remember_track(&Track::new("A", format!("T{i}"))));
        }
        assert_eq!(repo.recent_tracks().count(), 4);
        assert!(!repo.remember_track(&Track::new("A", "T4")));
        // T0 was evicted, so it counts as new again.
        assert!(repo.remember_track(&Track::new("A", "T0")));
    }

    #[test]
    fn save_and_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signstrings.jsonl");
        let mut repo = Repository::new(Some(path.clone()), Persister::inline(), 4);
        repo.push_marquee(MarqueeEntry::user("OLD"));
        repo.push_marquee(MarqueeEntry::chonky("NEW"));
        repo.enqueue_one_time(Message::one_by_one("X", colors::RED, 100));

        let reopened = Repository::open(path, Persister::inline(), 4);
        assert_eq!(reopened.rotation(), repo.rotation());
        assert!(reopened.one_time_is_empty());
    }

    #[test]
    fn flush_writes_without_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot.jsonl");
        let mut repo = Repository::in_memory();
        repo.push_marquee(MarqueeEntry::user("A"));
        assert!(repo.flush().is_ok());
        assert!(!path.exists());

        let mut repo = Repository::new(Some(path.clone()), Persister::inline(), 4);
        repo.rotation.push(MarqueeEntry::user("B"));
        repo.flush().unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("\"B\""));
    }
}
