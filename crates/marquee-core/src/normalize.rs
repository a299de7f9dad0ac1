// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text folding for the sign's ASCII-only font.

use crate::message::HEART;

/// Unicode punctuation with a close ASCII look-alike.
const FOLDS: &[(char, &str)] = &[
    ('\u{00AB}', "\""),
    ('\u{00AD}', "-"),
    ('\u{00B4}', "'"),
    ('\u{00BB}', "\""),
    ('\u{00F7}', "/"),
    ('\u{01C0}', "|"),
    ('\u{01C3}', "!"),
    ('\u{02B9}', "'"),
    ('\u{02BA}', "\""),
    ('\u{02BC}', "'"),
    ('\u{02C4}', "^"),
    ('\u{02C6}', "^"),
    ('\u{02C8}', "'"),
    ('\u{02CB}', "`"),
    ('\u{02CD}', "_"),
    ('\u{02DC}', "~"),
    ('\u{0300}', "`"),
    ('\u{0301}', "'"),
    ('\u{0302}', "^"),
    ('\u{0303}', "~"),
    ('\u{030B}', "\""),
    ('\u{030E}', "\""),
    ('\u{0331}', "_"),
    ('\u{0332}', "_"),
    ('\u{0338}', "/"),
    ('\u{0589}', ":"),
    ('\u{05C0}', "|"),
    ('\u{05C3}', ":"),
    ('\u{066A}', "%"),
    ('\u{066D}', "*"),
    ('\u{200B}', " "),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2015}', "--"),
    ('\u{2016}', "||"),
    ('\u{2017}', "_"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', ","),
    ('\u{201B}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{201F}', "\""),
    ('\u{2032}', "'"),
    ('\u{2033}', "\""),
    ('\u{2034}', "''"),
    ('\u{2035}', "`"),
    ('\u{2036}', "\""),
    ('\u{2037}', "''"),
    ('\u{2038}', "^"),
    ('\u{2039}', "<"),
    ('\u{203A}', ">"),
    ('\u{203D}', "?"),
    ('\u{2044}', "/"),
    ('\u{204E}', "*"),
    ('\u{2052}', "%"),
    ('\u{2053}', "~"),
    ('\u{2060}', " "),
    ('\u{20E5}', "\\"),
    ('\u{2212}', "-"),
    ('\u{2215}', "/"),
    ('\u{2216}', "\\"),
    ('\u{2217}', "*"),
    ('\u{2223}', "|"),
    ('\u{2236}', ":"),
    ('\u{223C}', "~"),
    ('\u{2264}', "<="),
    ('\u{2265}', ">="),
    ('\u{2266}', "<="),
    ('\u{2267}', ">="),
    ('\u{2303}', "^"),
    ('\u{2329}', "<"),
    ('\u{232A}', ">"),
    ('\u{266F}', "#"),
    ('\u{2731}', "*"),
    ('\u{2758}', "|"),
    ('\u{2762}', "!"),
    ('\u{27E6}', "["),
    ('\u{27E8}', "<"),
    ('\u{27E9}', ">"),
    ('\u{2983}', "{"),
    ('\u{2984}', "}"),
    ('\u{3003}', "\""),
    ('\u{3008}', "<"),
    ('\u{3009}', ">"),
    ('\u{301B}', "]"),
    ('\u{301C}', "~"),
    ('\u{301D}', "\""),
    ('\u{301E}', "\""),
    ('\u{FEFF}', " "),
];

/// Heart emoji drawn as the sign's own heart glyph.
const HEARTS: &[char] = &[
    '\u{2764}', // heavy black heart
    '\u{2665}', // heart suit
    '\u{1F493}',
    '\u{1F495}',
    '\u{1F496}',
    '\u{1F497}',
    '\u{1F498}',
    '\u{1F49D}',
    '\u{1F49E}',
];

/// Replace heart emoji with [`HEART`], dropping the emoji presentation selector.
pub fn convert_hearts(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if HEARTS.contains(&c) {
            out.push(HEART);
            if chars.peek() == Some(&'\u{FE0F}') {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Fold look-alike punctuation to ASCII, then strip everything non-ASCII.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some((_, folded)) = FOLDS.iter().find(|(from, _)| *from == c) {
            out.push_str(folded);
        }
    }
    out
}

/// Normalization applied to user-authored text: hearts first, then folding.
pub fn normalize_user_text(input: &str) -> String {
    normalize(&convert_hearts(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_smart_punctuation() {
        assert_eq!(normalize("\u{201C}hi\u{201D} \u{2014} it\u{2019}s"), "\"hi\" - it's");
        assert_eq!(normalize("a \u{2264} b"), "a <= b");
    }

    #[test]
    fn strips_remaining_non_ascii() {
        assert_eq!(normalize("caf\u{00E9} \u{1F680}go"), "caf go");
    }

    #[test]
    fn hearts_survive_as_sign_glyph() {
        let out = normalize_user_text("I \u{2764}\u{FE0F} U \u{1F496}");
        assert_eq!(out, "I \u{7F} U \u{7F}");
    }

    #[test]
    fn ascii_passes_through() {
        let s = "HELLO world !@#$%^&*()";
        assert_eq!(normalize(s), s);
    }
}
