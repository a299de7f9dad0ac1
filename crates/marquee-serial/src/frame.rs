// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frames written to the sign: one JSON wire record, no terminator.

use marquee_core::{Message, wire};
use tracing::{error, warn};

/// Encoding of [`Message::placeholder`], used if a message cannot be encoded.
const PLACEHOLDER_FRAME: &str = r#"{"str":" ","type":"D"}"#;

/// Encode `message` as a frame.
///
/// Frames longer than `max_frame_bytes` are still returned; the sign's JSON
/// buffer is fixed, so they are logged as likely to be cut short.
pub fn encode_frame(message: &Message, max_frame_bytes: usize) -> Vec<u8> {
    let json = match wire::encode(message) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "could not encode message; sending placeholder");
            PLACEHOLDER_FRAME.to_string()
        }
    };
    if json.len() > max_frame_bytes {
        error!(
            bytes = json.len(),
            max = max_frame_bytes,
            "frame is probably bigger than the sign will accept"
        );
    }
    json.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{MarqueeEntry, colors};

    #[test]
    fn frame_is_bare_json_record() {
        let frame = encode_frame(&Message::flashy("HI"), 700);
        let text = String::from_utf8(frame).unwrap();
        assert!(text.starts_with('{') && text.ends_with('}'));
        assert!(text.contains(r#""type":"F""#));
        assert!(text.contains(r#""time":200"#));
    }

    #[test]
    fn placeholder_constant_matches_encoder() {
        assert_eq!(wire::encode(&Message::placeholder()).unwrap(), PLACEHOLDER_FRAME);
    }

    #[test]
    fn oversized_frame_is_still_sent() {
        let long = "X".repeat(900);
        let frame = encode_frame(&Message::Marquee(MarqueeEntry::user(long)), 700);
        assert!(frame.len() > 900);
    }

    #[test]
    fn colored_record_carries_rgb() {
        let frame = encode_frame(&Message::chonky_slide("GO", colors::GREEN, 250), 700);
        let text = String::from_utf8(frame).unwrap();
        assert!(text.contains(r#""dly":250"#));
        assert!(text.contains(r#""r":"#));
    }
}
