//! Character classes used by the tokenizer.
//!
//! General-category data comes from `unicode-general-category`, so the set of
//! assigned code points is pinned to the Unicode version that crate ships.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Control-Z. Tolerated only as the very last character of a file.
pub const SUBSTITUTE: char = '\u{1A}';

pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// LF, VT, FF, CR, NEL, LS and PS.
#[inline]
pub fn is_line_terminator(ch: char) -> bool {
    matches!(
        ch,
        '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// White_Space characters that do not end a line.
#[inline]
pub fn is_whitespace(ch: char) -> bool {
    ch.is_whitespace() && !is_line_terminator(ch)
}

#[inline]
pub fn is_noncharacter(ch: char) -> bool {
    let cp = ch as u32;
    (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE
}

pub fn is_forbidden(ch: char) -> bool {
    if ch.is_whitespace() {
        return false;
    }

    if is_noncharacter(ch) {
        return true;
    }

    // Surrogates (Cs) never reach here: a `char` cannot hold one and
    // UTF-8 validation rejects their encoded form.
    matches!(
        get_general_category(ch),
        GeneralCategory::Control | GeneralCategory::Unassigned
    )
}

#[inline]
pub fn is_reserved_punctuator(ch: char) -> bool {
    matches!(ch, '"' | '#' | ';' | '{' | '}')
}

pub fn is_argument_char(ch: char) -> bool {
    !(is_whitespace(ch) || is_line_terminator(ch) || is_reserved_punctuator(ch) || is_forbidden(ch))
}

/// Whether `ch` may follow a backslash and be taken literally.
#[inline]
pub fn is_escapable(ch: char) -> bool {
    !(is_whitespace(ch) || is_line_terminator(ch) || is_forbidden(ch))
}

/// Splits `text` into lines the way the tokenizer counts them: every line
/// terminator ends a line and CRLF counts once. Line `n` of a [`Span`] is
/// element `n - 1`.
///
/// [`Span`]: crate::error::Span
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_terminator(ch) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + ch.len_utf8();
        if ch == '\r' && chars.peek().is_some_and(|&(_, next)| next == '\n') {
            chars.next();
            start += 1;
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
