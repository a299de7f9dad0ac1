// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk formats for the rotation and the ad templates.
//!
//! The rotation is one wire record per line, oldest entry first, so the file
//! reads in the reverse of the in-memory newest-first order. Ad templates are
//! a single JSON array of wire records.

use std::io::Write;
use std::path::Path;

use marquee_core::wire::{self, WireRecord};
use marquee_core::{Icon, MarqueeEntry, MarqueeError, Message, colors};
use tracing::warn;

/// Replace `path` with `contents` via a temp file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), MarqueeError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| MarqueeError::Storage {
        source: Box::new(e.error),
    })?;
    Ok(())
}

/// Render a newest-first rotation as file text.
pub fn encode_rotation(entries: &[MarqueeEntry]) -> Result<String, MarqueeError> {
    let mut out = String::new();
    for entry in entries.iter().rev() {
        out.push_str(&wire::encode_entry(entry)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse rotation file text into newest-first order.
///
/// Lines that fail to decode, or decode to blank text, are dropped with a
/// warning.
pub fn decode_rotation(text: &str) -> Vec<MarqueeEntry> {
    let mut entries: Vec<MarqueeEntry> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(number, line)| match wire::decode_entry(line) {
            Ok(entry) if !entry.text().trim().is_empty() => Some(entry),
            Ok(_) => None,
            Err(e) => {
                warn!(line = number + 1, error = %e, "dropping unreadable rotation line");
                None
            }
        })
        .collect();
    entries.reverse();
    entries
}

/// Read the rotation file. A missing file is an empty rotation.
pub fn read_rotation(path: &Path) -> Result<Vec<MarqueeEntry>, MarqueeError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(decode_rotation(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// The templates used until a script replaces them: two blue invaders.
pub fn default_ads() -> Vec<Message> {
    [Icon::Enemy1, Icon::Enemy2]
        .into_iter()
        .map(|icon| Message::IconInvader {
            icon,
            color: colors::ICON_BLUE,
        })
        .collect()
}

pub fn encode_ads(ads: &[Message]) -> Result<String, MarqueeError> {
    let records: Vec<WireRecord> = ads.iter().map(WireRecord::from).collect();
    serde_json::to_string(&records).map_err(|e| MarqueeError::codec(e.to_string()))
}

/// Parse the ads array. Individual records that fail to decode are skipped.
pub fn decode_ads(text: &str) -> Result<Vec<Message>, MarqueeError> {
    let records: Vec<WireRecord> =
        serde_json::from_str(text).map_err(|e| MarqueeError::codec(e.to_string()))?;
    Ok(records
        .into_iter()
        .filter_map(|record| match Message::try_from(record) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(error = %e, "dropping unreadable ad template");
                None
            }
        })
        .collect())
}

/// Read the ad templates, falling back to (and writing) the defaults when the
/// file is missing or unreadable.
pub fn read_ads(path: &Path) -> Vec<Message> {
    let loaded = std::fs::read_to_string(path)
        .map_err(MarqueeError::from)
        .and_then(|text| decode_ads(&text));
    match loaded {
        Ok(ads) => ads,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using default ad templates");
            let ads = default_ads();
            if let Err(e) = encode_ads(&ads).and_then(|text| write_atomic(path, &text)) {
                warn!(path = %path.display(), error = %e, "failed to write default ad templates");
            }
            ads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry() -> impl Strategy<Value = MarqueeEntry> {
        ("[!-~][ -~]{0,30}", any::<bool>()).prop_map(|(text, chonky)| {
            if chonky {
                MarqueeEntry::chonky(text)
            } else {
                MarqueeEntry::user(text)
            }
        })
    }

    proptest! {
        #[test]
        fn rotation_survives_save_and_load(entries in prop::collection::vec(entry(), 0..12)) {
            let text = encode_rotation(&entries).unwrap();
            prop_assert_eq!(text.lines().count(), entries.len());
            if let Some(oldest) = entries.last() {
                let first_line = text.lines().next().unwrap_or_default();
                prop_assert_eq!(wire::decode_entry(first_line).unwrap(), oldest.clone());
            }
            prop_assert_eq!(decode_rotation(&text), entries);
        }
    }

    #[test]
    fn rotation_file_is_oldest_first() {
        let entries = vec![MarqueeEntry::user("NEWEST"), MarqueeEntry::chonky("OLDEST")];
        let text = encode_rotation(&entries).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("OLDEST"));
        assert!(lines[1].contains("NEWEST"));
        assert_eq!(decode_rotation(&text), entries);
    }

    #[test]
    fn bad_and_blank_lines_are_dropped() {
        let text = concat!(
            "{\"str\":\"A\",\"type\":\"D\"}\n",
            "not json\n",
            "\n",
            "{\"str\":\"  \",\"type\":\"D\"}\n",
            "{\"str\":\"\",\"type\":\"S\"}\n",
            "{\"str\":\"B\",\"type\":\"N\"}\n",
        );
        assert_eq!(
            decode_rotation(text),
            vec![MarqueeEntry::chonky("B"), MarqueeEntry::user("A")]
        );
    }

    #[test]
    fn missing_rotation_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let entries = read_rotation(&dir.path().join("nope.jsonl")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn atomic_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/rotation.jsonl");
        write_atomic(&path, "x\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
        write_atomic(&path, "y\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "y\n");
    }

    #[test]
    fn missing_ads_file_yields_and_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ads.json");
        let ads = read_ads(&path);
        assert_eq!(ads, default_ads());
        assert!(path.exists());
        assert_eq!(read_ads(&path), default_ads());
    }

    #[test]
    fn corrupt_ads_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ads.json");
        std::fs::write(&path, "{{{").unwrap();
        assert_eq!(read_ads(&path), default_ads());
    }

    #[test]
    fn ads_round_trip_in_order() {
        let ads = vec![
            Message::chonky_slide("BUY", colors::PINK, 2000),
            Message::one_by_one("NOW", colors::YELLOW, 1000),
        ];
        assert_eq!(decode_ads(&encode_ads(&ads).unwrap()).unwrap(), ads);
    }
}
