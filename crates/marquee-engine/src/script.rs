// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ad mini-language.
//!
//! A script is one template per line. The leading glyph picks the shape:
//!
//! | glyph | template |
//! |---|---|
//! | 🆑 | chonky slide |
//! | 🅾 | one-by-one |
//! | 🛤 | now-playing block placeholder |
//! | 👾 | icon invader; the last icon glyph on the line picks the icon |
//!
//! A color glyph anywhere on the line selects a palette color, and each 🕰
//! adds a second to the one-second base delay. The displayed text is the
//! line with every non-ASCII glyph removed.

use marquee_core::normalize::normalize;
use marquee_core::{Icon, Message, Rgb, colors};
use tracing::{debug, warn};

const CHONKY: char = '\u{1F191}';
const ONE_BY_ONE: char = '\u{1F17E}';
const NOW_PLAYING: char = '\u{1F6E4}';
const INVADER: char = '\u{1F47E}';
const CLOCK: char = '\u{1F570}';

/// Icon glyphs, checked against each character of an invader line.
const ICONS: &[(char, Icon)] = &[
    ('\u{1F47E}', Icon::Enemy1),
    ('\u{1F47D}', Icon::Enemy2),
    ('\u{1F4A5}', Icon::Explosion),
    ('\u{1F18E}', Icon::Anjuna),
    ('\u{1F411}', Icon::Baaahs),
    ('\u{1F30C}', Icon::Dreamstate),
    ('\u{1F33C}', Icon::Edc),
];

/// Palette glyphs in precedence order: the first one present wins.
const PALETTE: &[(&[char], Rgb)] = &[
    (&['\u{1F49B}'], colors::YELLOW),
    (&['\u{1F534}', '\u{2764}'], colors::RED),
    (&['\u{1F499}'], colors::BLUE),
    (&['\u{1F9E1}'], colors::ORANGE),
    (&['\u{1F49C}'], colors::PURPLE),
    (&['\u{1F49A}'], colors::GREEN),
    (&['\u{1F497}'], colors::PINK),
    (&['\u{1F90D}'], colors::WHITE),
];

/// Parse a whole script. Lines that do not start with a shape glyph are dropped.
pub fn parse_script(script: &str) -> Vec<Message> {
    let ads: Vec<Message> = script
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                warn!(line, "dropping unparseable ad line");
            }
            parsed
        })
        .collect();
    debug!(templates = ads.len(), "ad script parsed");
    ads
}

/// Parse one script line into a template.
pub fn parse_line(line: &str) -> Option<Message> {
    let line = line.trim_start();
    let delay_ms = (line.chars().filter(|c| *c == CLOCK).count() as u32 + 1) * 1000;

    match line.chars().next()? {
        CHONKY => Some(Message::chonky_slide(
            normalize(line),
            palette_color(line).unwrap_or(colors::CHONKY_PINK),
            delay_ms,
        )),
        ONE_BY_ONE => Some(Message::one_by_one(
            normalize(line),
            palette_color(line).unwrap_or(colors::YELLOW),
            delay_ms,
        )),
        NOW_PLAYING => Some(Message::now_playing("")),
        INVADER => {
            let icon = line
                .chars()
                .filter_map(|c| ICONS.iter().find(|(glyph, _)| *glyph == c))
                .last()
                .map_or(Icon::Enemy1, |(_, icon)| *icon);
            Some(Message::IconInvader {
                icon,
                color: palette_color(line).unwrap_or(colors::ICON_BLUE),
            })
        }
        _ => None,
    }
}

fn palette_color(line: &str) -> Option<Rgb> {
    PALETTE
        .iter()
        .find(|(glyphs, _)| line.chars().any(|c| glyphs.contains(&c)))
        .map(|(_, color)| *color)
}
