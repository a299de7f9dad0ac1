// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound payload parsing.
//!
//! Every producer that carries text (wireless commands, HTTP) hands its
//! payload to [`parse_payload`]. Payloads starting with `!` are commands;
//! anything else becomes a new rotation entry.

/// A recognized `!` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Choose,
    Prev,
    Next,
    First,
    Last,
    Delete,
    EndChoose,
    Pause,
    Unpause,
    MicOn,
    MicOff,
    /// Inject ads every n-th rotation step.
    AdCadence(u32),
    /// Shift brightness; `None` when no amount was given.
    Brightness(Option<i32>),
    /// Seek to the first entry containing the text.
    Search(String),
    /// Replace the ad templates with a script.
    AdScript(String),
}

/// What an inbound payload asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Command(Command),
    /// A `!` payload that matched no command.
    Malformed(String),
    Message(String),
}

const AD_SCRIPT_GLYPH: &str = "!\u{1F170}";
const MUTE_GLYPH: &str = "!\u{1F507}";

pub fn parse_payload(payload: &str) -> Payload {
    if !payload.starts_with('!') {
        return Payload::Message(payload.to_string());
    }
    match parse_command(payload) {
        Some(command) => Payload::Command(command),
        None => Payload::Malformed(payload.to_string()),
    }
}

/// Parse a `!` command. Returns `None` when nothing matches.
pub fn parse_command(cmd: &str) -> Option<Command> {
    let exact = match cmd.trim_end() {
        "!c" | "!choose" => Some(Command::Choose),
        "!pr" | "!prev" => Some(Command::Prev),
        "!ne" | "!next" => Some(Command::Next),
        "!first" => Some(Command::First),
        "!l" | "!last" => Some(Command::Last),
        "!d" | "!delete" => Some(Command::Delete),
        "!ec" | "!endchoose" => Some(Command::EndChoose),
        "!p" | "!pause" => Some(Command::Pause),
        "!up" | "!unpause" => Some(Command::Unpause),
        "!micOn" => Some(Command::MicOn),
        "!micOff" | MUTE_GLYPH => Some(Command::MicOff),
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }

    if let Some(script) = cmd.strip_prefix(AD_SCRIPT_GLYPH) {
        return Some(Command::AdScript(strip_presentation(script).to_string()));
    }
    if let Some(rest) = strip_prefix_ignore_case(cmd, "!B") {
        return Some(Command::Brightness(rest.trim().parse().ok()));
    }
    if let Some(rest) = strip_prefix_ignore_case(cmd, "!A") {
        return match rest.trim().parse::<i64>() {
            Ok(n) if n >= 1 => Some(Command::AdCadence(u32::try_from(n).unwrap_or(u32::MAX))),
            Ok(_) => None,
            Err(_) => Some(Command::AdScript(rest.to_string())),
        };
    }
    if strip_prefix_ignore_case(cmd, "!s").is_some()
        || strip_prefix_ignore_case(cmd, "!find").is_some()
    {
        let query = cmd.split(' ').skip(1).collect::<Vec<_>>().join(" ");
        return Some(Command::Search(query));
    }
    None
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Drop the emoji presentation selector that often trails a glyph.
fn strip_presentation(s: &str) -> &str {
    s.strip_prefix('\u{FE0F}').unwrap_or(s)
}
