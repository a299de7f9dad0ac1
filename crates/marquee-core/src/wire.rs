// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tagged-union record format shared by the serial frame, the rotation
//! file, and the ads file.
//!
//! A record is a flat JSON object: `str` and `type` are always present and
//! the remaining fields depend on the type code.

use serde::{Deserialize, Serialize};

use crate::error::MarqueeError;
use crate::message::{MarqueeEntry, Message, Thinking, Utility};
use crate::types::{EchoMode, Icon, Rgb, TypeCode};

const DEFAULT_DELAY_MS: u32 = 1000;
const DEFAULT_FLASH_MS: u16 = 200;
const DEFAULT_STARS: u16 = 300;

/// Flat serialized form of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    #[serde(rename = "str", default)]
    pub text: String,
    #[serde(rename = "type")]
    pub type_code: TypeCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dly: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_caret: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think_dots: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashy: Option<String>,
}

impl WireRecord {
    fn bare(type_code: TypeCode, text: String) -> Self {
        Self {
            text,
            type_code,
            r: None,
            g: None,
            b: None,
            dly: None,
            scroll: None,
            show_caret: None,
            think_dots: None,
            time: None,
            stars: None,
            subtype: None,
            mode: None,
            flashy: None,
        }
    }

    fn with_color(mut self, color: Rgb) -> Self {
        self.r = Some(color.r);
        self.g = Some(color.g);
        self.b = Some(color.b);
        self
    }

    fn color(&self) -> Result<Rgb, MarqueeError> {
        match (self.r, self.g, self.b) {
            (Some(r), Some(g), Some(b)) => Ok(Rgb { r, g, b }),
            _ => Err(MarqueeError::codec(format!(
                "record of type {} is missing its color",
                self.type_code
            ))),
        }
    }
}

impl From<&Message> for WireRecord {
    fn from(message: &Message) -> Self {
        let record = WireRecord::bare(message.type_code(), message.text());
        match message {
            Message::Marquee(_)
            | Message::CountDownAnnouncement { .. }
            | Message::NowPlayingTrack { .. } => record,
            Message::OneByOne {
                color, delay_ms, ..
            } => WireRecord {
                dly: Some(*delay_ms),
                ..record.with_color(*color)
            },
            Message::ChonkySlide {
                color,
                delay_ms,
                scroll,
                ..
            } => WireRecord {
                dly: Some(*delay_ms),
                scroll: Some(*scroll),
                ..record.with_color(*color)
            },
            Message::GptThinking(thinking) => WireRecord {
                dly: Some(thinking.delay_ms),
                scroll: Some(false),
                show_caret: Some(thinking.show_caret),
                think_dots: Some(thinking.think_dots),
                ..record.with_color(thinking.color)
            },
            Message::IconInvader { color, .. } => record.with_color(*color),
            Message::FlashingAnnouncement { time_ms, .. } => WireRecord {
                time: Some(*time_ms),
                ..record
            },
            Message::Starfield { stars, .. } => WireRecord {
                stars: Some(*stars),
                ..record
            },
            Message::Utility(utility) => WireRecord {
                subtype: Some(utility.subtype().to_string()),
                ..record
            },
            Message::Chooser {
                position, total, ..
            } => WireRecord {
                flashy: Some(format!("{position}/{total}")),
                ..record
            },
            Message::KeyboardEcho { mode, .. } => WireRecord {
                mode: Some(mode.code().to_string()),
                ..record
            },
        }
    }
}

impl TryFrom<WireRecord> for Message {
    type Error = MarqueeError;

    fn try_from(record: WireRecord) -> Result<Self, Self::Error> {
        let message = match record.type_code {
            TypeCode::Default => Message::Marquee(MarqueeEntry::user(record.text)),
            TypeCode::ChonkyMarquee => Message::Marquee(MarqueeEntry::chonky(record.text)),
            TypeCode::ChonkySlide => Message::ChonkySlide {
                color: record.color()?,
                delay_ms: record.dly.unwrap_or(DEFAULT_DELAY_MS),
                scroll: record.scroll.unwrap_or(false),
                text: record.text,
            },
            TypeCode::OneByOne => Message::OneByOne {
                color: record.color()?,
                delay_ms: record.dly.unwrap_or(DEFAULT_DELAY_MS),
                text: record.text,
            },
            TypeCode::Icon => {
                let color = record.color()?;
                let icon = Icon::from_code(&record.text).ok_or_else(|| {
                    MarqueeError::codec(format!("unknown icon code {:?}", record.text))
                })?;
                Message::IconInvader { icon, color }
            }
            TypeCode::Flashy => Message::FlashingAnnouncement {
                time_ms: record.time.unwrap_or(DEFAULT_FLASH_MS),
                text: record.text,
            },
            TypeCode::CountDown => Message::CountDownAnnouncement { text: record.text },
            TypeCode::Starfield => Message::Starfield {
                stars: record.stars.unwrap_or(DEFAULT_STARS),
                text: record.text,
            },
            TypeCode::TrackId => Message::NowPlayingTrack { text: record.text },
            TypeCode::Utility => Message::Utility(decode_utility(&record)?),
            TypeCode::Keyboard => {
                let mode = match record.mode.as_deref() {
                    Some("W") => EchoMode::Warning,
                    Some("I") | None => EchoMode::Input,
                    Some(other) => {
                        return Err(MarqueeError::codec(format!(
                            "unknown keyboard mode {other:?}"
                        )));
                    }
                };
                Message::KeyboardEcho {
                    text: record.text,
                    mode,
                }
            }
            TypeCode::Chooser => {
                let (position, total) = record
                    .flashy
                    .as_deref()
                    .and_then(|f| f.split_once('/'))
                    .and_then(|(p, t)| Some((p.parse().ok()?, t.parse().ok()?)))
                    .ok_or_else(|| MarqueeError::codec("chooser record without position"))?;
                Message::Chooser {
                    text: record.text,
                    position,
                    total,
                }
            }
        };
        Ok(message)
    }
}

fn decode_utility(record: &WireRecord) -> Result<Utility, MarqueeError> {
    match (record.subtype.as_deref(), record.text.as_str()) {
        (Some("M"), "E") => Ok(Utility::EnableMic),
        (Some("M"), "D") => Ok(Utility::DisableMic),
        (Some("B"), "") => Ok(Utility::Brightness(None)),
        (Some("B"), amount) => amount
            .trim()
            .parse()
            .map(|a| Utility::Brightness(Some(a)))
            .map_err(|_| MarqueeError::codec(format!("bad brightness amount {amount:?}"))),
        (subtype, text) => Err(MarqueeError::codec(format!(
            "unknown utility record subtype={subtype:?} str={text:?}"
        ))),
    }
}

/// Serialize a message to its JSON record.
pub fn encode(message: &Message) -> Result<String, MarqueeError> {
    serde_json::to_string(&WireRecord::from(message))
        .map_err(|e| MarqueeError::codec(e.to_string()))
}

/// Parse a JSON record back into a message.
pub fn decode(json: &str) -> Result<Message, MarqueeError> {
    let record: WireRecord =
        serde_json::from_str(json).map_err(|e| MarqueeError::codec(e.to_string()))?;
    Message::try_from(record)
}

/// Encode one rotation entry as a persisted line.
pub fn encode_entry(entry: &MarqueeEntry) -> Result<String, MarqueeError> {
    encode(&Message::Marquee(entry.clone()))
}

/// Decode a rotation line. Anything other than a rotation shape is rejected.
pub fn decode_entry(json: &str) -> Result<MarqueeEntry, MarqueeError> {
    match decode(json)? {
        Message::Marquee(entry) => Ok(entry),
        other => Err(MarqueeError::codec(format!(
            "type {} cannot appear in the rotation",
            other.type_code()
        ))),
    }
}
