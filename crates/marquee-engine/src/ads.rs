// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filler content: ad templates and the live now-playing block.

use marquee_core::normalize::normalize;
use marquee_core::{Message, Track, colors};
use marquee_storage::{AdStore, Repository};
use tracing::{debug, info};

/// Holds the ad templates and decides what an injection pushes.
#[derive(Debug)]
pub struct AdvertisementManager {
    templates: Vec<Message>,
    advertise_every: u32,
    keep_on_empty_script: bool,
    now_playing: Option<String>,
    store: AdStore,
}

impl AdvertisementManager {
    /// Load templates from `store`.
    pub fn new(store: AdStore, advertise_every: u32, keep_on_empty_script: bool) -> Self {
        let templates = store.load();
        info!(templates = templates.len(), advertise_every, "ad templates loaded");
        Self {
            templates,
            advertise_every: advertise_every.max(1),
            keep_on_empty_script,
            now_playing: None,
            store,
        }
    }

    pub fn templates(&self) -> &[Message] {
        &self.templates
    }

    pub fn advertise_every(&self) -> u32 {
        self.advertise_every
    }

    pub fn set_advertise_every(&mut self, every: u32) {
        self.advertise_every = every.max(1);
        info!(advertise_every = self.advertise_every, "ad cadence changed");
    }

    /// Whether the `step`-th successful rotation step should be followed by ads.
    pub fn is_due(&self, step: u64) -> bool {
        step > 0 && step % u64::from(self.advertise_every) == 0
    }

    /// Replace the templates and persist them.
    ///
    /// An empty list replaces the templates too, unless configured to keep
    /// the previous ones. Returns whether the templates changed.
    pub fn replace_templates(&mut self, ads: Vec<Message>) -> bool {
        if ads.is_empty() && self.keep_on_empty_script {
            info!("ad script had no usable lines; keeping current templates");
            return false;
        }
        info!(templates = ads.len(), "ad templates replaced");
        self.templates = ads;
        self.store.save(&self.templates);
        true
    }

    /// The text of the track currently playing, if any.
    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn set_now_playing(&mut self, text: Option<String>) {
        self.now_playing = text;
    }

    /// The three-message block announcing the current track.
    pub fn now_playing_block(&self) -> Vec<Message> {
        match &self.now_playing {
            Some(track) => vec![
                Message::one_by_one("CURRENT", colors::PURPLE, 1000),
                Message::one_by_one("TRACK:", colors::PURPLE, 1000),
                Message::now_playing(track.clone()),
            ],
            None => Vec::new(),
        }
    }

    /// Templates with every now-playing placeholder expanded.
    pub fn flatten(&self) -> Vec<Message> {
        self.templates
            .iter()
            .flat_map(|template| match template {
                Message::NowPlayingTrack { .. } => self.now_playing_block(),
                other => vec![other.clone()],
            })
            .collect()
    }

    /// Push the flattened templates at the head of the one-time queue.
    ///
    /// Skipped while an icon invader is still pending so bursts do not run
    /// back to back. Returns whether anything was pushed.
    pub fn inject(&self, repo: &mut Repository) -> bool {
        if repo.one_time().any(Message::is_heavy_ad) {
            debug!("ad burst still pending; skipping injection");
            return false;
        }
        let ads = self.flatten();
        if ads.is_empty() {
            return false;
        }
        debug!(count = ads.len(), "injecting ads");
        repo.push_one_time(ads);
        true
    }

    /// Handle a now-playing notification.
    ///
    /// A blank track clears the current one and injects ads. A track not
    /// announced recently queues the announcement burst behind whatever is
    /// pending, replacing any announcement still waiting.
    pub fn update_track(&mut self, repo: &mut Repository, track: &Track) {
        if track.is_empty() {
            info!("nothing playing");
            self.now_playing = None;
            self.inject(repo);
            return;
        }
        if !repo.remember_track(track) {
            debug!(artist = %track.artist, title = %track.title, "track announced recently");
            return;
        }

        let line = format!("{} - {}", normalize(&track.artist), normalize(&track.title));
        info!(track = %line, "now playing");
        self.now_playing = Some(line.clone());

        let announcement = Message::now_playing_announcement();
        repo.remove_one_time_where(|m| {
            *m == announcement || matches!(m, Message::NowPlayingTrack { .. })
        });
        repo.enqueue_one_time(announcement);
        repo.enqueue_one_time(Message::now_playing(line));
        repo.enqueue_one_time(Message::starfield());
    }
}
