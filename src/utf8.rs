//! Byte/grapheme-level primitives the editing engine is built on.
//!
//! These are plain, side-effect-free functions over `&str` slices. Motion
//! handlers use them to stay on grapheme boundaries; the redisplay engine
//! uses `grapheme_width` as the single source of truth for wrap math.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Length in bytes of the UTF-8 sequence starting with lead byte `b`, or 0 if
/// `b` cannot start a sequence (a continuation byte or an invalid lead).
pub fn char_len(b: u8) -> usize {
    match b {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

/// Decode `bytes` as a single UTF-8 scalar value, or `None` if it isn't
/// exactly one valid codepoint.
pub fn char_decode(bytes: &[u8]) -> Option<char> {
    let s = std::str::from_utf8(bytes).ok()?;
    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(c)
}

fn is_continuation_byte(b: u8) -> bool {
    b & 0xc0 == 0x80
}

/// Byte offset of the codepoint immediately before `point` in `s`.
///
/// Unlike [`grapheme_prev`], this steps back by exactly one codepoint, which
/// is what backspace uses (see the module docs on the buffer's UTF-8
/// policy).
pub fn char_prev(s: &str, point: usize) -> usize {
    if point == 0 {
        return 0;
    }
    let bytes = s.as_bytes();
    let mut i = point - 1;
    while i > 0 && is_continuation_byte(bytes[i]) {
        i -= 1;
    }
    i
}

/// Byte offset of the grapheme cluster boundary immediately before `point`.
pub fn grapheme_prev(s: &str, point: usize) -> usize {
    let mut last = 0;
    for (idx, _) in s.grapheme_indices(true) {
        if idx >= point {
            break;
        }
        last = idx;
    }
    last
}

/// Byte offset just past the grapheme cluster starting at `point`.
///
/// If `point` does not land on a grapheme boundary, or is at/past the end of
/// `s`, returns `s.len()`.
pub fn grapheme_next(s: &str, point: usize) -> usize {
    for (idx, g) in s.grapheme_indices(true) {
        if idx == point {
            return idx + g.len();
        }
    }
    s.len()
}

/// Display width (in terminal columns) of the grapheme cluster starting at
/// `point`, along with the byte offset just past it. Returns `(0, s.len())`
/// when `point` is at or past the end of `s`.
pub fn grapheme_width(s: &str, point: usize) -> (usize, usize) {
    for (idx, g) in s.grapheme_indices(true) {
        if idx == point {
            return (UnicodeWidthStr::width(g), idx + g.len());
        }
    }
    (0, s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_len_handles_ascii_and_multibyte_leads() {
        assert_eq!(char_len(b'a'), 1);
        assert_eq!(char_len(0xc2), 2); // lead of U+0080..U+07FF
        assert_eq!(char_len(0xe2), 3); // lead of e.g. U+2014
        assert_eq!(char_len(0xf0), 4); // lead of e.g. U+1F600
        assert_eq!(char_len(0x80), 0); // bare continuation byte
        assert_eq!(char_len(0xff), 0); // never a valid lead
    }

    #[test]
    fn char_decode_rejects_multi_codepoint_input() {
        assert_eq!(char_decode("é".as_bytes()), Some('é'));
        assert_eq!(char_decode("ab".as_bytes()), None);
        assert_eq!(char_decode(&[0xff]), None);
    }

    #[test]
    fn char_prev_skips_continuation_bytes() {
        let s = "a\u{e9}b"; // 'a', 'é' (2 bytes), 'b'
        assert_eq!(s.len(), 4);
        assert_eq!(char_prev(s, 1), 0); // before 'é' -> 'a'
        assert_eq!(char_prev(s, 3), 1); // before 'b' -> start of 'é'
        assert_eq!(char_prev(s, 0), 0);
    }

    #[test]
    fn grapheme_next_and_prev_roundtrip_over_ascii() {
        let s = "abc";
        let n = grapheme_next(s, 0);
        assert_eq!(n, 1);
        assert_eq!(grapheme_prev(s, n), 0);
    }

    #[test]
    fn grapheme_width_is_zero_past_end() {
        let s = "hi";
        assert_eq!(grapheme_width(s, 2), (0, 2));
        assert_eq!(grapheme_width(s, 0), (1, 1));
    }

    #[test]
    fn grapheme_width_counts_wide_glyphs_as_two_columns() {
        let s = "\u{4e2d}"; // CJK ideograph, double-width
        assert_eq!(grapheme_width(s, 0), (2, s.len()));
    }
}
