// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pull-driven scheduler.
//!
//! [`Scheduler::next`] decides the single message for the next frame. It
//! never blocks and never fails: whatever goes wrong, some message comes
//! back, with a blank user entry as the last resort. Priority on each pull:
//!
//! 1. chooser preview while browsing
//! 2. keyboard echo while typing
//! 3. the lead-in burst when a fresh reply is up next
//! 4. ads when there is nothing at all to show
//! 5. the one-time queue
//! 6. the rotation, advancing the pointer

use std::time::{Duration, Instant};

use marquee_config::MarqueeConfig;
use marquee_core::normalize::normalize_user_text;
use marquee_core::{
    MarqueeEntry, Message, QueryId, ReplyEvent, ReplyHandle, Track, Utility, colors,
};
use marquee_storage::Repository;
use tracing::{debug, info, warn};

use crate::ads::AdvertisementManager;
use crate::commands::{Command, Payload, parse_payload};
use crate::keyboard::{EscapeOutcome, KeyboardInput, KeyboardPoll};
use crate::reply::OutstandingReplies;
use crate::script::parse_script;
use crate::splice::{SpliceOutcome, splice_reply};

/// Position and mode flags of the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    /// Index of the rotation entry shown next. Always within the rotation
    /// (0 when it is empty).
    pub pointer: usize,
    /// Browsing without consuming.
    pub chooser: bool,
    /// Pointer does not advance.
    pub paused: bool,
    /// Rotation entries shown so far, excluding queries.
    pub step_count: u64,
}

/// Result of one pull.
#[derive(Debug, Clone, PartialEq)]
pub struct Pull {
    pub message: Message,
    /// A reply request to fire once the caller has released the scheduler.
    pub request: Option<ReplyHandle>,
}

impl Pull {
    fn show(message: Message) -> Self {
        Self {
            message,
            request: None,
        }
    }
}

/// Rotation and flags as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSnapshot {
    pub pointer: usize,
    pub paused: bool,
    pub chooser: bool,
    pub entries: Vec<MarqueeEntry>,
}

/// All scheduling state in one place.
#[derive(Debug)]
pub struct Scheduler {
    state: SchedulerState,
    repo: Repository,
    ads: AdvertisementManager,
    keyboard: KeyboardInput,
    replies: OutstandingReplies,
    trigger_word: String,
    chooser_width: usize,
    /// When the current thinking animation was first shown.
    thinking_since: Option<Instant>,
    thinking_timeout: Duration,
}

impl Scheduler {
    pub fn new(config: &MarqueeConfig, repo: Repository, ads: AdvertisementManager) -> Self {
        Self {
            state: SchedulerState::default(),
            repo,
            ads,
            keyboard: KeyboardInput::new(&config.keyboard),
            replies: OutstandingReplies::new(),
            trigger_word: config.scheduler.trigger_word.to_lowercase(),
            chooser_width: config.scheduler.chooser_width,
            thinking_since: None,
            thinking_timeout: Duration::from_millis(config.scheduler.thinking_timeout_ms),
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn ads(&self) -> &AdvertisementManager {
        &self.ads
    }

    pub fn replies(&self) -> &OutstandingReplies {
        &self.replies
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            pointer: self.state.pointer,
            paused: self.state.paused,
            chooser: self.state.chooser,
            entries: self.repo.rotation().to_vec(),
        }
    }

    /// Decide the next message for the sign.
    pub fn next(&mut self, now: Instant) -> Pull {
        if self.state.chooser {
            return Pull::show(self.chooser_preview());
        }

        match self.keyboard.poll(now) {
            KeyboardPoll::Echo(echo) => {
                self.repo.clear_one_time();
                return Pull::show(echo);
            }
            KeyboardPoll::TimedOut => {
                self.repo.clear_one_time();
                self.repo.push_one_time([Message::starfield()]);
            }
            KeyboardPoll::Idle => {}
        }

        self.expire_thinking(now);

        if self.repo.one_time_is_empty() {
            self.lead_in_if_reply_is_next();
        }

        if self.repo.is_empty() && self.repo.one_time_is_empty() {
            debug!("nothing to display; injecting ads");
            self.ads.inject(&mut self.repo);
        }

        if let Some(message) = self.repo.pop_one_time() {
            if let Message::GptThinking(thinking) = &message {
                self.repo
                    .push_one_time([Message::GptThinking(thinking.think_more())]);
            }
            return Pull::show(message);
        }

        self.next_from_rotation()
    }

    fn next_from_rotation(&mut self) -> Pull {
        let len = self.repo.len();
        if len == 0 {
            return Pull::show(Message::placeholder());
        }
        self.clamp_pointer();
        let index = self.state.pointer;
        if !self.state.paused {
            self.state.pointer = (index + 1) % len;
        }
        let Some(entry) = self.repo.get(index).cloned() else {
            warn!(index, "rotation pointer out of range");
            return Pull::show(Message::placeholder());
        };
        debug!(index, text = entry.text(), "rotation entry");

        let request = match entry.query_id() {
            Some(id) => self.request_reply(id.clone(), entry.text()),
            None => {
                self.state.step_count += 1;
                if self.ads.is_due(self.state.step_count) {
                    debug!(step = self.state.step_count, "ad cadence reached");
                    self.ads.inject(&mut self.repo);
                }
                None
            }
        };
        Pull {
            message: Message::Marquee(entry),
            request,
        }
    }

    fn request_reply(&mut self, query_id: QueryId, prompt: &str) -> Option<ReplyHandle> {
        let handle = ReplyHandle {
            query_id,
            prompt: prompt.to_string(),
        };
        if !self.replies.begin(handle.clone()) {
            debug!(query = %handle.query_id, "reply already requested");
            return None;
        }
        self.set_thinking(true);
        Some(handle)
    }

    /// Drop a thinking animation that has run longer than the timeout so the
    /// rotation resumes. Outstanding requests are left alone.
    fn expire_thinking(&mut self, now: Instant) {
        if !self.repo.one_time().any(is_thinking) {
            self.thinking_since = None;
            return;
        }
        let since = *self.thinking_since.get_or_insert(now);
        if now.saturating_duration_since(since) >= self.thinking_timeout {
            warn!(
                timeout_ms = self.thinking_timeout.as_millis() as u64,
                "no reply in time; hiding thinking indicator"
            );
            self.repo.remove_one_time_where(is_thinking);
            self.thinking_since = None;
        }
    }

    fn chooser_preview(&self) -> Message {
        match self.repo.get(self.state.pointer) {
            Some(entry) => Message::chooser(
                entry,
                self.state.pointer,
                self.repo.len(),
                self.chooser_width,
            ),
            None => Message::Chooser {
                text: "<empty>".to_string(),
                position: self.state.pointer + 1,
                total: self.repo.len(),
            },
        }
    }

    fn lead_in_if_reply_is_next(&mut self) {
        let index = self.state.pointer;
        let Some(entry @ MarqueeEntry::GptReply { .. }) = self.repo.get(index) else {
            return;
        };
        let chonky = entry.to_chonky();
        info!(index, "introducing fresh reply");
        self.repo.replace_marquee(index, chonky);
        self.repo.push_one_time(lead_in_burst());
    }

    fn clamp_pointer(&mut self) {
        let last = self.repo.len().saturating_sub(1);
        if self.state.pointer > last {
            self.state.pointer = last;
        }
    }

    /// Route an inbound text payload.
    pub fn handle_payload(&mut self, payload: &str) {
        match parse_payload(payload) {
            Payload::Command(command) => self.apply(command),
            Payload::Malformed(raw) => warn!(command = %raw, "unrecognized command dropped"),
            Payload::Message(text) => self.add_message(&text),
        }
    }

    /// Add a new rotation entry at the head and announce it.
    pub fn add_message(&mut self, text: &str) {
        let normalized = normalize_user_text(text);
        if normalized.trim().is_empty() {
            warn!("blank message dropped");
            return;
        }
        let entry = if text.to_lowercase().contains(&self.trigger_word) {
            MarqueeEntry::gpt_query(normalized)
        } else {
            MarqueeEntry::user(normalized)
        };
        info!(text = entry.text(), query = entry.query_id().is_some(), "new message");
        self.state.pointer = 0;
        self.repo.enqueue_one_time(Message::new_message_announcement());
        self.repo.push_marquee(entry);
    }

    pub fn apply(&mut self, command: Command) {
        debug!(?command, "applying command");
        match command {
            Command::Choose => {
                info!("entering chooser mode");
                self.state.chooser = true;
                self.repo.clear_one_time();
            }
            Command::EndChoose => {
                info!("leaving chooser mode");
                self.state.chooser = false;
            }
            Command::Prev => self.state.pointer = self.state.pointer.saturating_sub(1),
            Command::Next => {
                self.state.pointer = (self.state.pointer + 1).min(self.repo.len().saturating_sub(1))
            }
            Command::First => self.state.pointer = 0,
            Command::Last => self.state.pointer = self.repo.len().saturating_sub(1),
            Command::Delete => {
                if let Some(removed) = self.repo.delete_at(self.state.pointer) {
                    info!(index = self.state.pointer, text = removed.text(), "entry deleted");
                    self.clamp_pointer();
                }
            }
            Command::Pause => self.state.paused = true,
            Command::Unpause => self.state.paused = false,
            Command::MicOn => self
                .repo
                .push_one_time([Message::Utility(Utility::EnableMic)]),
            Command::MicOff => self
                .repo
                .push_one_time([Message::Utility(Utility::DisableMic)]),
            Command::Brightness(amount) => self
                .repo
                .push_one_time([Message::Utility(Utility::Brightness(amount))]),
            Command::AdCadence(every) => {
                self.ads.set_advertise_every(every);
                self.repo.push_one_time([
                    Message::flashy(format!("AD EVERY={}", self.ads.advertise_every())),
                    Message::starfield(),
                ]);
            }
            Command::Search(query) => {
                if query.trim().is_empty() {
                    return;
                }
                match self.repo.find(&query) {
                    Some(index) => self.state.pointer = index,
                    None => debug!(query = %query, "search found nothing"),
                }
            }
            Command::AdScript(script) => {
                if self.ads.replace_templates(parse_script(&script)) {
                    self.ads.inject(&mut self.repo);
                }
            }
        }
    }

    pub fn update_track(&mut self, track: &Track) {
        self.ads.update_track(&mut self.repo, track);
    }

    /// Show or clear the animated thinking indicator.
    pub fn set_thinking(&mut self, on: bool) {
        if on {
            if !self.repo.one_time().any(is_thinking) {
                self.repo.push_one_time([Message::thinking()]);
                self.thinking_since = None;
            }
        } else {
            self.repo.remove_one_time_where(is_thinking);
            self.thinking_since = None;
        }
        debug!(on, "thinking indicator");
    }

    pub fn key(&mut self, key: char, now: Instant) {
        self.repo.clear_one_time();
        self.keyboard.key(key, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        self.keyboard.backspace(now);
    }

    pub fn escape(&mut self, now: Instant) {
        if self.keyboard.escape(now) == EscapeOutcome::Abandoned {
            self.repo.push_one_time([Message::starfield()]);
        }
    }

    pub fn submit_keyboard(&mut self, now: Instant) {
        if let Some(text) = self.keyboard.submit(now) {
            self.add_message(&text);
        }
    }

    /// Feed one signal from a reply stream.
    pub fn reply_event(&mut self, event: ReplyEvent) {
        match event {
            ReplyEvent::Started(handle) => {
                debug!(query = %handle.query_id, "reply started");
                self.replies.begin(handle);
            }
            ReplyEvent::Chunk { handle, text } => self.replies.append(&handle.query_id, &text),
            ReplyEvent::Completed(handle) => {
                let text = self.replies.finish(&handle.query_id).unwrap_or_default();
                self.finish_reply(Some(&handle.query_id), &text);
            }
            ReplyEvent::Failed { handle, error } => {
                warn!(query = %handle.query_id, error = %error, "reply failed");
                self.replies.finish(&handle.query_id);
                self.set_thinking(false);
                self.repo.push_one_time(apology_burst());
            }
        }
    }

    /// A reply posted by an external model, matched to the oldest waiting query.
    pub fn external_reply(&mut self, text: &str) {
        let target = match self.replies.oldest() {
            Some(handle) => {
                let id = handle.query_id.clone();
                self.replies.finish(&id);
                Some(id)
            }
            None => self
                .repo
                .oldest_query()
                .and_then(|index| self.repo.get(index))
                .and_then(|entry| entry.query_id().cloned()),
        };
        self.finish_reply(target.as_ref(), text);
    }

    fn finish_reply(&mut self, query: Option<&QueryId>, text: &str) {
        self.set_thinking(false);
        let outcome = splice_reply(&mut self.repo, query, text);
        if let Some(reply_index) = outcome.reply_index()
            && self.state.pointer > reply_index
        {
            self.state.pointer += 1;
        }
        if outcome != SpliceOutcome::Dropped {
            self.clamp_pointer();
        }
    }

    /// Write the rotation synchronously.
    pub fn flush(&self) -> Result<(), marquee_core::MarqueeError> {
        self.repo.flush()
    }
}

fn is_thinking(message: &Message) -> bool {
    matches!(message, Message::GptThinking(_))
}

fn lead_in_burst() -> Vec<Message> {
    vec![
        Message::chonky_slide("RAVE", colors::GREEN, 1000),
        Message::chonky_slide("RAVEGPT", colors::GREEN, 750),
        Message::chonky_slide("SAYS.", colors::GREEN, 250),
        Message::chonky_slide("SAYS..", colors::GREEN, 250),
        Message::chonky_slide("SAYS...", colors::GREEN, 250),
    ]
}

fn apology_burst() -> Vec<Message> {
    vec![
        Message::chonky_slide("NO", colors::RED, 750),
        Message::chonky_slide("NO BARS", colors::RED, 750),
        Message::chonky_slide("TRYING", colors::RED, 500),
        Message::chonky_slide("AGAIN", colors::RED, 500),
        Message::chonky_slide("LATER!", colors::RED, 500),
        Message::starfield(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::TypeCode;
    use marquee_storage::AdStore;
    use proptest::prelude::*;

    fn scheduler() -> Scheduler {
        let config = MarqueeConfig::default();
        let ads = AdvertisementManager::new(AdStore::in_memory(), 8, false);
        Scheduler::new(&config, Repository::in_memory(), ads)
    }

    fn with_rotation(texts: &[&str]) -> Scheduler {
        let mut s = scheduler();
        for text in texts.iter().rev() {
            s.repo.push_marquee(MarqueeEntry::user(*text));
        }
        s
    }

    fn pull(s: &mut Scheduler) -> Message {
        s.next(Instant::now()).message
    }

    fn pull_text(s: &mut Scheduler) -> String {
        pull(s).text()
    }

    #[test]
    fn hello_repeats_then_ads_on_ninth_call() {
        let mut s = with_rotation(&["HELLO"]);
        for call in 1..=8 {
            assert_eq!(pull_text(&mut s), "HELLO", "call {call}");
            assert_eq!(s.state.pointer, 0);
        }
        let ninth = pull(&mut s);
        assert_eq!(ninth.type_code(), TypeCode::Icon);
    }

    #[test]
    fn empty_rotation_shows_ads_then_placeholder() {
        let mut s = scheduler();
        assert_eq!(pull(&mut s).type_code(), TypeCode::Icon);
        assert_eq!(pull(&mut s).type_code(), TypeCode::Icon);

        s.ads.replace_templates(Vec::new());
        assert_eq!(pull(&mut s), Message::placeholder());
    }

    #[test]
    fn brightness_jumps_ahead_of_rotation() {
        let mut s = with_rotation(&["A", "B"]);
        s.handle_payload("!B50");
        assert_eq!(
            pull(&mut s),
            Message::Utility(Utility::Brightness(Some(50)))
        );
        assert_eq!(pull_text(&mut s), "A");
    }

    #[test]
    fn rotation_wraps_in_order() {
        let mut s = with_rotation(&["A", "B", "C"]);
        let seen: Vec<String> = (0..6).map(|_| pull_text(&mut s)).collect();
        assert_eq!(seen, vec!["A", "B", "C", "A", "B", "C"]);
    }

    #[test]
    fn pause_holds_the_pointer() {
        let mut s = with_rotation(&["A", "B"]);
        s.handle_payload("!pause");
        assert_eq!(pull_text(&mut s), "A");
        assert_eq!(pull_text(&mut s), "A");
        s.handle_payload("!unpause");
        assert_eq!(pull_text(&mut s), "A");
        assert_eq!(pull_text(&mut s), "B");
    }

    #[test]
    fn chooser_previews_without_consuming() {
        let mut s = with_rotation(&["HELLO WORLD", "SECOND"]);
        s.handle_payload("!choose");
        let preview = pull(&mut s);
        assert_eq!(
            preview,
            Message::Chooser {
                text: "HELLO W".into(),
                position: 1,
                total: 2
            }
        );
        assert_eq!(pull(&mut s), preview);
        s.handle_payload("!next");
        assert_eq!(pull_text(&mut s), "SECOND");
        s.handle_payload("!next");
        assert_eq!(s.state.pointer, 1);
        s.handle_payload("!first");
        s.handle_payload("!endchoose");
        assert_eq!(pull_text(&mut s), "HELLO WORLD");
    }

    #[test]
    fn chooser_on_empty_rotation() {
        let mut s = scheduler();
        s.handle_payload("!c");
        assert_eq!(pull_text(&mut s), "<empty>");
    }

    #[test]
    fn choose_discards_pending_burst() {
        let mut s = with_rotation(&["A"]);
        s.handle_payload("!micOn");
        s.handle_payload("!c");
        s.handle_payload("!ec");
        assert_eq!(pull_text(&mut s), "A");
    }

    #[test]
    fn delete_reclamps_pointer() {
        let mut s = with_rotation(&["A", "B"]);
        s.handle_payload("!last");
        s.handle_payload("!delete");
        assert_eq!(s.state.pointer, 0);
        assert_eq!(s.repo.len(), 1);
        s.handle_payload("!d");
        assert!(s.repo.is_empty());
        assert_eq!(s.state.pointer, 0);
        s.handle_payload("!d");
        assert!(s.repo.is_empty());
    }

    #[test]
    fn search_seeks_or_does_nothing() {
        let mut s = with_rotation(&["alpha", "Bravo", "charlie"]);
        s.handle_payload("!s BRAVO");
        assert_eq!(s.state.pointer, 1);
        s.handle_payload("!find zulu");
        assert_eq!(s.state.pointer, 1);
        s.handle_payload("!search");
        assert_eq!(s.state.pointer, 1);
    }

    #[test]
    fn new_message_goes_first_with_announcement() {
        let mut s = with_rotation(&["OLD1", "OLD2"]);
        pull(&mut s);
        s.handle_payload("fresh \u{201C}news\u{201D} \u{1F680}");
        assert_eq!(s.state.pointer, 0);
        assert_eq!(pull(&mut s), Message::new_message_announcement());
        assert_eq!(pull_text(&mut s), "fresh \"news\" ");
    }

    #[test]
    fn trigger_word_creates_query_and_fires_once() {
        let mut s = scheduler();
        s.handle_payload("Hey RaveGPT what's up");
        s.repo.clear_one_time();

        let first = s.next(Instant::now());
        assert_eq!(first.message.type_code(), TypeCode::Default);
        let handle = first.request.expect("request fired");
        assert_eq!(handle.prompt, "Hey RaveGPT what's up");

        // Thinking animates while waiting.
        let t1 = pull(&mut s);
        let t2 = pull(&mut s);
        assert!(matches!(t1, Message::GptThinking(_)));
        assert!(matches!(t2, Message::GptThinking(_)));
        assert_ne!(t1, t2);

        // Cleared, the query comes around again without a second request.
        s.set_thinking(false);
        let again = s.next(Instant::now());
        assert!(again.request.is_none());
    }

    #[test]
    fn unanswered_query_stops_thinking_after_timeout() {
        let mut s = with_rotation(&["other"]);
        s.handle_payload("ravegpt anyone there");
        s.repo.clear_one_time();

        let start = Instant::now();
        let handle = s.next(start).request.expect("request fired");
        assert!(matches!(s.next(start).message, Message::GptThinking(_)));
        let later = start + s.thinking_timeout - Duration::from_millis(1);
        assert!(matches!(s.next(later).message, Message::GptThinking(_)));

        // Past the timeout the rotation resumes.
        let expired = start + s.thinking_timeout;
        assert_eq!(s.next(expired).message.text(), "other");
        assert!(!s.repo.one_time().any(is_thinking));
        // The request is still outstanding and is not fired again.
        assert!(s.replies.is_outstanding(&handle.query_id));
        assert!(s.next(expired).request.is_none());
    }

    #[test]
    fn thinking_timeout_restarts_with_each_indicator() {
        let mut s = with_rotation(&["a"]);
        let start = Instant::now();
        s.set_thinking(true);
        s.next(start);
        s.set_thinking(false);
        s.set_thinking(true);
        let later = start + s.thinking_timeout;
        assert!(matches!(s.next(later).message, Message::GptThinking(_)));
    }

    #[test]
    fn completed_reply_splices_and_gets_lead_in() {
        let mut s = with_rotation(&["OTHER"]);
        s.handle_payload("ravegpt tell me a joke");
        s.repo.clear_one_time();

        let handle = s.next(Instant::now()).request.unwrap();
        s.reply_event(ReplyEvent::Started(handle.clone()));
        s.reply_event(ReplyEvent::Chunk {
            handle: handle.clone(),
            text: "why did ".into(),
        });
        s.reply_event(ReplyEvent::Chunk {
            handle: handle.clone(),
            text: "the chicken".into(),
        });
        s.reply_event(ReplyEvent::Completed(handle));

        assert_eq!(
            s.repo.get(0),
            Some(&MarqueeEntry::user("ravegpt tell me a joke"))
        );
        assert_eq!(
            s.repo.get(1),
            Some(&MarqueeEntry::gpt_reply("WHY DID THE CHICKEN"))
        );
        assert_eq!(s.repo.len(), 3);

        let burst: Vec<String> = (0..5).map(|_| pull_text(&mut s)).collect();
        assert_eq!(burst, vec!["RAVE", "RAVEGPT", "SAYS.", "SAYS..", "SAYS..."]);
        assert_eq!(s.repo.get(1), Some(&MarqueeEntry::chonky("WHY DID THE CHICKEN")));
        assert_eq!(pull_text(&mut s), "WHY DID THE CHICKEN");
        assert_eq!(pull_text(&mut s), "OTHER");
    }

    #[test]
    fn failed_reply_apologizes_and_keeps_query() {
        let mut s = scheduler();
        s.handle_payload("ravegpt?");
        s.repo.clear_one_time();
        let handle = s.next(Instant::now()).request.unwrap();
        s.reply_event(ReplyEvent::Failed {
            handle,
            error: "timeout".into(),
        });
        assert_eq!(pull_text(&mut s), "NO");
        assert!(s.repo.get(0).and_then(|e| e.query_id()).is_some());
        assert!(s.replies.is_empty());
        assert!(!s.repo.one_time().any(|m| matches!(m, Message::GptThinking(_))));
    }

    #[test]
    fn external_reply_targets_oldest_pending_query() {
        let mut s = scheduler();
        s.repo.push_marquee(MarqueeEntry::gpt_query("older"));
        s.repo.push_marquee(MarqueeEntry::gpt_query("newer"));
        s.external_reply("answer");
        let texts: Vec<&str> = s.repo.rotation().iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["newer", "older", "ANSWER"]);
        assert!(s.repo.get(1).and_then(|e| e.query_id()).is_none());
    }

    #[test]
    fn splice_keeps_upcoming_entry_when_pointer_is_past_it() {
        let mut s = scheduler();
        s.repo.push_marquee(MarqueeEntry::user("C"));
        s.repo.push_marquee(MarqueeEntry::user("B"));
        s.repo.push_marquee(MarqueeEntry::gpt_query("Q"));
        s.state.pointer = 2;
        s.external_reply("r");
        assert_eq!(s.state.pointer, 3);
        assert_eq!(pull_text(&mut s), "C");
    }

    #[test]
    fn keyboard_echo_preempts_and_clears_queue() {
        let mut s = with_rotation(&["A"]);
        let t0 = Instant::now();
        s.repo.enqueue_one_time(Message::flashy("PENDING"));
        s.key('h', t0);
        s.key('i', t0);
        let echo = s.next(t0).message;
        assert_eq!(echo.type_code(), TypeCode::Keyboard);
        assert_eq!(echo.text(), "hi_");
        assert!(s.repo.one_time_is_empty());
    }

    #[test]
    fn keyboard_submit_adds_message() {
        let mut s = scheduler();
        let t0 = Instant::now();
        for c in "typed".chars() {
            s.key(c, t0);
        }
        s.submit_keyboard(t0 + std::time::Duration::from_secs(6));
        assert_eq!(s.repo.get(0), Some(&MarqueeEntry::user("typed")));
    }

    #[test]
    fn ad_script_replaces_and_injects() {
        let mut s = with_rotation(&["A"]);
        s.handle_payload("!A\u{1F191}BUY\n\u{1F17E}NOW");
        assert_eq!(pull_text(&mut s), "BUY");
        assert_eq!(pull_text(&mut s), "NOW");
        assert_eq!(pull_text(&mut s), "A");
    }

    #[test]
    fn ad_cadence_command_confirms() {
        let mut s = with_rotation(&["A"]);
        s.handle_payload("!A3");
        assert_eq!(s.ads.advertise_every(), 3);
        assert_eq!(pull_text(&mut s), "AD EVERY=3");
        assert_eq!(pull(&mut s), Message::starfield());
    }

    #[test]
    fn now_playing_block_in_next_injection() {
        let mut s = with_rotation(&["A"]);
        s.handle_payload("!A\u{1F6E4}");
        s.repo.clear_one_time();
        s.update_track(&Track::new("X", "Y"));
        s.repo.clear_one_time();
        s.ads.inject(&mut s.repo);
        let block: Vec<String> = (0..3).map(|_| pull_text(&mut s)).collect();
        assert_eq!(block, vec!["CURRENT", "TRACK:", "X - Y"]);
    }

    #[test]
    fn malformed_command_changes_nothing() {
        let mut s = with_rotation(&["A", "B"]);
        let before = s.snapshot();
        s.handle_payload("!zz");
        s.handle_payload("!A0");
        assert_eq!(s.snapshot(), before);
        assert!(s.repo.one_time_is_empty());
    }

    #[test]
    #[tracing_test::traced_test]
    fn dropped_inputs_are_logged() {
        let mut s = scheduler();
        s.handle_payload("!zz");
        s.handle_payload("\u{1F680}");
        assert!(logs_contain("unrecognized command dropped"));
        assert!(logs_contain("blank message dropped"));
        assert!(s.repo.is_empty());
    }

    proptest! {
        #[test]
        fn pointer_stays_in_range_and_visits_everything(len in 1usize..12, rounds in 1usize..4) {
            let texts: Vec<String> = (0..len).map(|i| format!("M{i}")).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let mut s = with_rotation(&refs);
            s.ads.replace_templates(Vec::new());

            for _ in 0..rounds {
                let mut seen = std::collections::HashSet::new();
                for _ in 0..len {
                    let text = pull_text(&mut s);
                    prop_assert!(s.state.pointer < len);
                    seen.insert(text);
                }
                prop_assert_eq!(seen.len(), len);
            }
        }

        #[test]
        fn chooser_round_trip_is_invisible(len in 1usize..8, advance in 0usize..8) {
            let texts: Vec<String> = (0..len).map(|i| format!("M{i}")).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let mut a = with_rotation(&refs);
            let mut b = with_rotation(&refs);
            for _ in 0..advance {
                pull(&mut a);
                pull(&mut b);
            }
            b.handle_payload("!choose");
            b.handle_payload("!endchoose");
            prop_assert_eq!(a.snapshot(), b.snapshot());
            for _ in 0..len + 2 {
                prop_assert_eq!(pull(&mut a), pull(&mut b));
            }
        }
    }
}
