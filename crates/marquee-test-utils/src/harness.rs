// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end scheduling tests.
//!
//! `TestHarness` assembles an engine over a temp data directory with a
//! [`MockRequester`] whose scripted replies land on a channel the test
//! drains explicitly with [`TestHarness::pump_replies`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use marquee_config::MarqueeConfig;
use marquee_core::{MarqueeError, Message, ReplyEvent};
use marquee_engine::MarqueeEngine;
use marquee_storage::Persister;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::mock_requester::{MockRequester, ScriptedReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<ScriptedReply>,
    config: MarqueeConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            config: MarqueeConfig::default(),
        }
    }

    /// Replies the mock requester plays back, one per request.
    pub fn with_replies(mut self, replies: Vec<ScriptedReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Start from this config; storage paths are still redirected to the temp dir.
    pub fn with_config(mut self, config: MarqueeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_advertise_every(mut self, every: u32) -> Self {
        self.config.scheduler.advertise_every = every;
        self
    }

    pub fn build(self) -> Result<TestHarness, MarqueeError> {
        let temp_dir = tempfile::TempDir::new()?;
        let mut config = self.config;
        config.storage.data_dir = temp_dir.path().display().to_string();
        TestHarness::assemble(config, self.replies, temp_dir)
    }
}

/// A running engine over temp storage.
pub struct TestHarness {
    pub engine: Arc<MarqueeEngine>,
    pub requester: Arc<MockRequester>,
    pub config: MarqueeConfig,
    events: Mutex<UnboundedReceiver<ReplyEvent>>,
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    fn assemble(
        config: MarqueeConfig,
        replies: Vec<ScriptedReply>,
        temp_dir: tempfile::TempDir,
    ) -> Result<Self, MarqueeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let requester = Arc::new(MockRequester::scripted(tx, replies));
        let engine = Arc::new(MarqueeEngine::open(
            &config,
            Persister::inline(),
            requester.clone(),
        ));
        Ok(Self {
            engine,
            requester,
            config,
            events: Mutex::new(rx),
            temp_dir,
        })
    }

    /// A fresh engine over the same data directory, as after a restart.
    pub fn restart(self) -> Result<Self, MarqueeError> {
        let Self {
            config, temp_dir, ..
        } = self;
        Self::assemble(config, Vec::new(), temp_dir)
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn rotation_path(&self) -> PathBuf {
        self.config.storage.rotation_path()
    }

    pub fn ads_path(&self) -> PathBuf {
        self.config.storage.ads_path()
    }

    pub fn submit(&self, payload: &str) {
        self.engine.submit(payload);
    }

    pub fn pull(&self) -> Message {
        self.engine.next_message()
    }

    /// Texts of the next `n` pulled messages.
    pub fn pull_texts(&self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.pull().text()).collect()
    }

    /// Feed every reply event produced so far into the engine.
    pub fn pump_replies(&self) -> usize {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let mut count = 0;
        while let Ok(event) = events.try_recv() {
            self.engine.on_reply_event(event);
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().unwrap();
        assert!(harness.data_dir().exists());
        assert!(harness.engine.snapshot().entries.is_empty());
    }

    #[test]
    fn storage_lives_in_temp_dir() {
        let harness = TestHarness::builder().build().unwrap();
        assert!(harness.rotation_path().starts_with(harness.data_dir()));
        // Ad defaults are written on first load.
        assert!(harness.ads_path().exists());
    }

    #[test]
    fn scripted_reply_reaches_engine() {
        let harness = TestHarness::builder()
            .with_replies(vec![ScriptedReply::Answer("yes".into())])
            .build()
            .unwrap();
        harness.submit("ravegpt ok?");
        harness.pull_texts(2);
        assert_eq!(harness.requester.request_count(), 1);
        assert_eq!(harness.pump_replies(), 3);
        assert_eq!(harness.engine.snapshot().entries.len(), 2);
    }

    #[test]
    fn temp_dirs_are_unique_per_harness() {
        let a = TestHarness::builder().build().unwrap();
        let b = TestHarness::builder().build().unwrap();
        assert_ne!(a.data_dir(), b.data_dir());
    }
}
