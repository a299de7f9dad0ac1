// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling engine for the Marquee LED sign.
//!
//! [`MarqueeEngine`] is the single shared handle every producer talks to:
//! the serial link pulls messages, the HTTP gateway pushes text and track
//! changes, reply streams feed [`ReplyEvent`]s. All state lives in one
//! [`Scheduler`] behind a mutex, so each operation is atomic with respect
//! to the others.

pub mod ads;
pub mod commands;
pub mod keyboard;
pub mod reply;
pub mod scheduler;
pub mod script;
pub mod shutdown;
pub mod splice;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use marquee_config::MarqueeConfig;
use marquee_core::{MarqueeError, Message, ReplyEvent, ReplyRequester, Track};
use marquee_storage::{AdStore, Persister, Repository};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use ads::AdvertisementManager;
pub use commands::{Command, Payload, parse_payload};
pub use reply::ExternalReplyRequester;
pub use scheduler::{Pull, RotationSnapshot, Scheduler, SchedulerState};

/// Shared handle over the scheduler.
pub struct MarqueeEngine {
    inner: Mutex<Scheduler>,
    requester: Arc<dyn ReplyRequester>,
}

impl MarqueeEngine {
    pub fn new(scheduler: Scheduler, requester: Arc<dyn ReplyRequester>) -> Self {
        Self {
            inner: Mutex::new(scheduler),
            requester,
        }
    }

    /// Open the persisted rotation and ad templates named by `config`.
    pub fn open(
        config: &MarqueeConfig,
        persister: Persister,
        requester: Arc<dyn ReplyRequester>,
    ) -> Self {
        let repo = Repository::open(
            config.storage.rotation_path(),
            persister.clone(),
            config.scheduler.recent_tracks,
        );
        let store = AdStore::new(config.storage.ads_path(), persister);
        let ads = AdvertisementManager::new(
            store,
            config.scheduler.advertise_every,
            config.scheduler.keep_ads_on_empty_script,
        );
        info!(
            sign = config.sign.name.as_str(),
            entries = repo.len(),
            requester = requester.name(),
            "marquee engine ready"
        );
        Self::new(Scheduler::new(config, repo, ads), requester)
    }

    /// An engine with nothing on disk, for tests and dry runs.
    pub fn in_memory(config: &MarqueeConfig, requester: Arc<dyn ReplyRequester>) -> Self {
        let ads = AdvertisementManager::new(
            AdStore::in_memory(),
            config.scheduler.advertise_every,
            config.scheduler.keep_ads_on_empty_script,
        );
        Self::new(
            Scheduler::new(config, Repository::in_memory(), ads),
            requester,
        )
    }

    fn lock(&self) -> MutexGuard<'_, Scheduler> {
        // A panic mid-operation leaves the scheduler usable; keep serving.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The message for the next frame. Never fails.
    pub fn next_message(&self) -> Message {
        let pull = self.lock().next(Instant::now());
        if let Some(handle) = pull.request {
            debug!(query = %handle.query_id, requester = self.requester.name(), "requesting reply");
            self.requester.request(handle);
        }
        pull.message
    }

    /// Route a text payload: a `!` command or a new rotation entry.
    pub fn submit(&self, payload: &str) {
        self.lock().handle_payload(payload);
    }

    pub fn now_playing(&self, track: &Track) {
        self.lock().update_track(track);
    }

    pub fn set_thinking(&self, on: bool) {
        self.lock().set_thinking(on);
    }

    pub fn on_reply_event(&self, event: ReplyEvent) {
        self.lock().reply_event(event);
    }

    pub fn external_reply(&self, text: &str) {
        self.lock().external_reply(text);
    }

    pub fn key(&self, key: char) {
        self.lock().key(key, Instant::now());
    }

    pub fn backspace(&self) {
        self.lock().backspace(Instant::now());
    }

    pub fn escape(&self) {
        self.lock().escape(Instant::now());
    }

    pub fn submit_keyboard(&self) {
        self.lock().submit_keyboard(Instant::now());
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        self.lock().snapshot()
    }

    pub fn state(&self) -> SchedulerState {
        self.lock().state().clone()
    }

    /// Write the rotation synchronously.
    pub fn flush(&self) -> Result<(), MarqueeError> {
        self.lock().flush()
    }

    /// Feed reply events into the engine until the channel closes or
    /// `cancel` fires.
    pub async fn run_reply_events(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<ReplyEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("reply event loop cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.on_reply_event(event),
                    None => {
                        debug!("reply event channel closed");
                        break;
                    }
                },
            }
        }
    }
}

impl std::fmt::Debug for MarqueeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarqueeEngine")
            .field("requester", &self.requester.name())
            .finish_non_exhaustive()
    }
}
