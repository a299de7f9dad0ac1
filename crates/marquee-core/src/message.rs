// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of messages the sign can be handed.
//!
//! Rotation entries are their own enum ([`MarqueeEntry`]) so the list the
//! repository persists cannot hold one-shot content. Every other shape is a
//! [`Message`] variant; matching on it is exhaustive everywhere it is
//! consumed (scheduler, persistence coder, wire encoder).

use crate::types::{EchoMode, Icon, QueryId, Rgb, TypeCode, colors};

/// Vertical tab: the sign renders it as a single blank column.
pub const VT: char = '\u{000B}';

/// The sign's heart glyph (DEL).
pub const HEART: char = '\u{007F}';

/// Visible characters of in-progress keyboard input that fit on the panel.
pub const KEYBOARD_ECHO_WIDTH: usize = 19;

/// An entry of the persisted rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarqueeEntry {
    /// Plain user message.
    User { text: String },
    /// User message waiting for a language-model reply.
    GptQuery { id: QueryId, text: String },
    /// Scrolling block.
    Chonky { text: String },
    /// Scrolling block holding a freshly spliced reply.
    GptReply { text: String },
}

impl MarqueeEntry {
    pub fn user(text: impl Into<String>) -> Self {
        MarqueeEntry::User { text: text.into() }
    }

    /// A new query with its own identity.
    pub fn gpt_query(text: impl Into<String>) -> Self {
        MarqueeEntry::GptQuery {
            id: QueryId::new(),
            text: text.into(),
        }
    }

    pub fn chonky(text: impl Into<String>) -> Self {
        MarqueeEntry::Chonky { text: text.into() }
    }

    pub fn gpt_reply(text: impl Into<String>) -> Self {
        MarqueeEntry::GptReply { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            MarqueeEntry::User { text }
            | MarqueeEntry::GptQuery { text, .. }
            | MarqueeEntry::Chonky { text }
            | MarqueeEntry::GptReply { text } => text,
        }
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            MarqueeEntry::User { .. } | MarqueeEntry::GptQuery { .. } => TypeCode::Default,
            MarqueeEntry::Chonky { .. } | MarqueeEntry::GptReply { .. } => {
                TypeCode::ChonkyMarquee
            }
        }
    }

    /// The pending query identity, if this entry is still waiting for a reply.
    pub fn query_id(&self) -> Option<&QueryId> {
        match self {
            MarqueeEntry::GptQuery { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Same text as a plain user entry (used once a query has been answered).
    pub fn to_user(&self) -> MarqueeEntry {
        MarqueeEntry::user(self.text())
    }

    /// Same text as a plain chonky entry (used once a reply has been introduced).
    pub fn to_chonky(&self) -> MarqueeEntry {
        MarqueeEntry::chonky(self.text())
    }
}

/// Administrative toggles for the sign firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    EnableMic,
    DisableMic,
    /// Brightness delta; `None` when the command carried no number.
    Brightness(Option<i32>),
}

impl Utility {
    pub fn subtype(self) -> char {
        match self {
            Utility::EnableMic | Utility::DisableMic => 'M',
            Utility::Brightness(_) => 'B',
        }
    }

    pub fn text(self) -> String {
        match self {
            Utility::EnableMic => "E".to_string(),
            Utility::DisableMic => "D".to_string(),
            Utility::Brightness(amount) => amount.map(|a| a.to_string()).unwrap_or_default(),
        }
    }
}

/// Animated "the model is thinking" indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thinking {
    pub color: Rgb,
    pub delay_ms: u32,
    pub show_caret: bool,
    pub think_dots: u8,
}

impl Thinking {
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            delay_ms: 250,
            show_caret: true,
            think_dots: 1,
        }
    }

    /// The next animation frame: one more dot (wrapping after three), caret toggled.
    pub fn think_more(&self) -> Self {
        Self {
            think_dots: self.think_dots % 3 + 1,
            show_caret: !self.show_caret,
            ..self.clone()
        }
    }

    pub fn text(&self) -> String {
        let mut text = ".".repeat(self.think_dots as usize);
        if self.show_caret {
            text.push('_');
        }
        text
    }
}

/// A message handed to the sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A rotation entry.
    Marquee(MarqueeEntry),
    /// Letters revealed one at a time.
    OneByOne {
        text: String,
        color: Rgb,
        delay_ms: u32,
    },
    /// Block text sliding in.
    ChonkySlide {
        text: String,
        color: Rgb,
        delay_ms: u32,
        scroll: bool,
    },
    GptThinking(Thinking),
    IconInvader { icon: Icon, color: Rgb },
    FlashingAnnouncement { text: String, time_ms: u16 },
    CountDownAnnouncement { text: String },
    Starfield { text: String, stars: u16 },
    NowPlayingTrack { text: String },
    Utility(Utility),
    /// Read-only preview of a rotation entry while browsing.
    Chooser {
        text: String,
        position: usize,
        total: usize,
    },
    /// In-progress keyboard input with a trailing cursor.
    KeyboardEcho { text: String, mode: EchoMode },
}

impl Message {
    /// Last-resort message when there is nothing else to show.
    pub fn placeholder() -> Self {
        Message::Marquee(MarqueeEntry::user(" "))
    }

    pub fn one_by_one(text: impl Into<String>, color: Rgb, delay_ms: u32) -> Self {
        Message::OneByOne {
            text: text.into(),
            color,
            delay_ms,
        }
    }

    pub fn chonky_slide(text: impl Into<String>, color: Rgb, delay_ms: u32) -> Self {
        Message::ChonkySlide {
            text: text.into(),
            color,
            delay_ms,
            scroll: false,
        }
    }

    pub fn thinking() -> Self {
        Message::GptThinking(Thinking::new(colors::CHONKY_PINK))
    }

    pub fn flashy(text: impl Into<String>) -> Self {
        Message::FlashingAnnouncement {
            text: text.into(),
            time_ms: 200,
        }
    }

    pub fn now_playing_announcement() -> Self {
        Message::flashy(format!("NOW{VT}PLAYING"))
    }

    pub fn new_message_announcement() -> Self {
        Message::CountDownAnnouncement {
            text: format!("NEW{VT}MSG{VT}"),
        }
    }

    pub fn starfield() -> Self {
        Message::Starfield {
            text: String::new(),
            stars: 300,
        }
    }

    pub fn now_playing(text: impl Into<String>) -> Self {
        Message::NowPlayingTrack { text: text.into() }
    }

    /// Preview of `entry` at zero-based `index` of a rotation of `len` entries.
    pub fn chooser(entry: &MarqueeEntry, index: usize, len: usize, width: usize) -> Self {
        Message::Chooser {
            text: entry.text().chars().take(width).collect(),
            position: index + 1,
            total: len,
        }
    }

    /// Echo of `input`, keeping only what fits and appending the cursor.
    pub fn keyboard_echo(input: &str, mode: EchoMode) -> Self {
        let count = input.chars().count();
        let mut text: String = input
            .chars()
            .skip(count.saturating_sub(KEYBOARD_ECHO_WIDTH))
            .collect();
        text.push('_');
        Message::KeyboardEcho { text, mode }
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            Message::Marquee(entry) => entry.type_code(),
            Message::OneByOne { .. } => TypeCode::OneByOne,
            Message::ChonkySlide { .. } | Message::GptThinking(_) => TypeCode::ChonkySlide,
            Message::IconInvader { .. } => TypeCode::Icon,
            Message::FlashingAnnouncement { .. } => TypeCode::Flashy,
            Message::CountDownAnnouncement { .. } => TypeCode::CountDown,
            Message::Starfield { .. } => TypeCode::Starfield,
            Message::NowPlayingTrack { .. } => TypeCode::TrackId,
            Message::Utility(_) => TypeCode::Utility,
            Message::Chooser { .. } => TypeCode::Chooser,
            Message::KeyboardEcho { .. } => TypeCode::Keyboard,
        }
    }

    /// The text the sign displays for this message.
    pub fn text(&self) -> String {
        match self {
            Message::Marquee(entry) => entry.text().to_string(),
            Message::GptThinking(thinking) => thinking.text(),
            Message::IconInvader { icon, .. } => icon.code().to_string(),
            Message::Utility(utility) => utility.text(),
            Message::OneByOne { text, .. }
            | Message::ChonkySlide { text, .. }
            | Message::FlashingAnnouncement { text, .. }
            | Message::CountDownAnnouncement { text }
            | Message::Starfield { text, .. }
            | Message::NowPlayingTrack { text }
            | Message::Chooser { text, .. }
            | Message::KeyboardEcho { text, .. } => text.clone(),
        }
    }

    /// Heavy ads are the icon invaders; a pending one suppresses another burst.
    pub fn is_heavy_ad(&self) -> bool {
        matches!(self, Message::IconInvader { .. })
    }
}

impl From<MarqueeEntry> for Message {
    fn from(entry: MarqueeEntry) -> Self {
        Message::Marquee(entry)
    }
}
