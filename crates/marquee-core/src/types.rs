// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the message model, the engine, and the transports.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One-character discriminator carried by every message on the wire.
///
/// The code alone selects the concrete shape when decoding a record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum TypeCode {
    #[strum(serialize = "C")]
    #[serde(rename = "C")]
    ChonkySlide,
    #[strum(serialize = "O")]
    #[serde(rename = "O")]
    OneByOne,
    #[strum(serialize = "F")]
    #[serde(rename = "F")]
    Flashy,
    #[strum(serialize = "W")]
    #[serde(rename = "W")]
    CountDown,
    #[strum(serialize = "S")]
    #[serde(rename = "S")]
    Starfield,
    #[strum(serialize = "U")]
    #[serde(rename = "U")]
    Utility,
    #[strum(serialize = "K")]
    #[serde(rename = "K")]
    Keyboard,
    #[strum(serialize = "H")]
    #[serde(rename = "H")]
    Chooser,
    #[strum(serialize = "I")]
    #[serde(rename = "I")]
    Icon,
    #[strum(serialize = "T")]
    #[serde(rename = "T")]
    TrackId,
    #[strum(serialize = "N")]
    #[serde(rename = "N")]
    ChonkyMarquee,
    #[strum(serialize = "D")]
    #[serde(rename = "D")]
    Default,
}

/// A 24-bit color split into channels, as the sign firmware expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Decompose a packed `0xRRGGBB` color.
    pub const fn from_u32(color: u32) -> Self {
        Self {
            r: ((color >> 16) & 0xFF) as u8,
            g: ((color >> 8) & 0xFF) as u8,
            b: (color & 0xFF) as u8,
        }
    }
}

/// Named colors used by the built-in bursts and the ad palette.
pub mod colors {
    use super::Rgb;

    pub const YELLOW: Rgb = Rgb::from_u32(0xFFC800);
    pub const RED: Rgb = Rgb::from_u32(0xFF0000);
    pub const BLUE: Rgb = Rgb::from_u32(0x1DA1F2);
    pub const ORANGE: Rgb = Rgb::from_u32(0xFF5500);
    pub const PURPLE: Rgb = Rgb::from_u32(0x9146FF);
    pub const GREEN: Rgb = Rgb::from_u32(0x00FF00);
    pub const PINK: Rgb = Rgb::from_u32(0xFF1493);
    pub const WHITE: Rgb = Rgb::from_u32(0xFFFFFF);
    /// Default for chonky-slide ads and the thinking indicator.
    pub const CHONKY_PINK: Rgb = Rgb::from_u32(0xFF00AA);
    /// Default for icon-invader ads.
    pub const ICON_BLUE: Rgb = Rgb::from_u32(0x0050FF);
}

/// Glyphs the sign can draw for icon-invader messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Icon {
    Enemy1,
    Enemy2,
    Explosion,
    Anjuna,
    Baaahs,
    Dreamstate,
    Edc,
}

impl Icon {
    /// The code the firmware uses to select the glyph.
    pub fn code(self) -> &'static str {
        match self {
            Icon::Enemy1 => "1",
            Icon::Enemy2 => "2",
            Icon::Explosion => "X",
            Icon::Anjuna => "A",
            Icon::Baaahs => "B",
            Icon::Dreamstate => "D",
            Icon::Edc => "E",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Icon::Enemy1),
            "2" => Some(Icon::Enemy2),
            "X" => Some(Icon::Explosion),
            "A" => Some(Icon::Anjuna),
            "B" => Some(Icon::Baaahs),
            "D" => Some(Icon::Dreamstate),
            "E" => Some(Icon::Edc),
            _ => None,
        }
    }
}

/// Whether a keyboard echo is shown normally or as a running-out-of-time warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EchoMode {
    Input,
    Warning,
}

impl EchoMode {
    pub fn code(self) -> char {
        match self {
            EchoMode::Input => 'I',
            EchoMode::Warning => 'W',
        }
    }
}

/// Identity of a pending language-model query in the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(pub String);

impl QueryId {
    /// Allocate a fresh identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completion handle for one fired reply request.
///
/// The reply that eventually arrives carries this handle back so the
/// splice targets the query instance that asked, not whatever sits at
/// the head of the rotation by then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyHandle {
    pub query_id: QueryId,
    /// The query text sent to the model.
    pub prompt: String,
}

/// Signals emitted by a reply stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    /// The request was accepted and tokens will follow.
    Started(ReplyHandle),
    /// A piece of the reply text.
    Chunk { handle: ReplyHandle, text: String },
    /// The stream finished; the accumulated chunks form the reply.
    Completed(ReplyHandle),
    /// The stream failed; the query stays pending so it can be resubmitted.
    Failed { handle: ReplyHandle, error: String },
}

impl ReplyEvent {
    pub fn handle(&self) -> &ReplyHandle {
        match self {
            ReplyEvent::Started(handle) | ReplyEvent::Completed(handle) => handle,
            ReplyEvent::Chunk { handle, .. } | ReplyEvent::Failed { handle, .. } => handle,
        }
    }
}

/// A now-playing notification from the DJ software bridge.
///
/// Only artist and title are significant; any other fields the bridge
/// posts are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
}

impl Track {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// A track with neither artist nor title means nothing is playing.
    pub fn is_empty(&self) -> bool {
        self.artist.trim().is_empty() && self.title.trim().is_empty()
    }
}
