// encodings/utf8.rs - UTF-8 text addressed by byte offset.
//
// Positions are byte offsets that always sit on a character boundary.
// Moving by one character means skipping a lead byte plus its tail bytes.

use std::borrow::Cow;
use std::fmt;

use crate::charclass::{Locale, C_LOCALE};
use crate::context::{MatchContext, MatchState, OutOfString};
use crate::error::MatchError;

// === UTF-8 Helpers ===

#[inline]
fn utf8_islead(c: u8) -> bool {
    (c & 0xc0) != 0x80
}

/// Sequence length announced by a lead byte.
#[inline]
fn utf8_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    i = i.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Match context over UTF-8 text.
pub struct Utf8Context<'t> {
    text: Cow<'t, str>,
    end: usize,
    locale: &'t dyn Locale,
    state: MatchState,
}

impl<'t> Utf8Context<'t> {
    /// View `text` with the byte window `[start, end)`. Bounds are clamped to
    /// the text and moved back onto character boundaries.
    pub fn new(text: &'t str, start: usize, end: usize) -> Self {
        Self::from_cow(Cow::Borrowed(text), start, end)
    }

    /// Validate `bytes` as UTF-8 and view them.
    pub fn from_bytes(bytes: &'t [u8], start: usize, end: usize) -> Result<Self, MatchError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text, start, end))
    }

    pub fn owned(text: String, start: usize, end: usize) -> Self {
        Self::from_cow(Cow::Owned(text), start, end)
    }

    fn from_cow(text: Cow<'t, str>, start: usize, end: usize) -> Self {
        let end = floor_boundary(&text, end);
        let start = floor_boundary(&text, start.min(end));
        Utf8Context {
            text,
            end,
            locale: &C_LOCALE,
            state: MatchState::new(start),
        }
    }

    pub fn with_locale(mut self, locale: &'t dyn Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters before the byte offset `pos`.
    pub fn byte_to_char_index(&self, pos: usize) -> usize {
        self.text[..pos].chars().count()
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

impl fmt::Debug for Utf8Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utf8Context")
            .field("len", &self.text.len())
            .field("end", &self.end)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl MatchContext for Utf8Context<'_> {
    type Text = str;

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    #[inline]
    fn end(&self) -> usize {
        self.end
    }

    fn str(&self, pos: usize) -> u32 {
        let p = &self.bytes()[pos..];
        let len = utf8_len(p[0]);
        let c = p[0] as u32;
        if len == 1 {
            return c;
        }
        let mut n = c & ((1u32 << (7 - len)) - 1);
        for &b in &p[1..len] {
            n = (n << 6) | (b as u32 & 0x3f);
        }
        n
    }

    #[inline]
    fn next(&self, pos: usize) -> usize {
        pos + utf8_len(self.bytes()[pos])
    }

    fn prev(&self, pos: usize) -> Result<usize, OutOfString> {
        let mut p = pos.checked_sub(1).ok_or(OutOfString)?;
        let bytes = self.bytes();
        while !utf8_islead(bytes[p]) {
            p -= 1;
        }
        Ok(p)
    }

    fn next_n(&self, mut pos: usize, n: usize, bound: usize) -> Result<usize, OutOfString> {
        for _ in 0..n {
            if pos >= bound {
                return Err(OutOfString);
            }
            pos = self.next(pos);
        }
        Ok(pos)
    }

    fn prev_n(&self, mut pos: usize, n: usize, bound: usize) -> Result<usize, OutOfString> {
        for _ in 0..n {
            if pos <= bound {
                return Err(OutOfString);
            }
            pos = self.prev(pos)?;
        }
        Ok(pos)
    }

    fn maximum_distance(&self, lo: usize, hi: usize) -> usize {
        hi.saturating_sub(lo)
    }

    fn get_single_byte(&self, base: usize, i: usize) -> u32 {
        self.bytes()[base + i] as u32
    }

    fn bytes_difference(&self, a: usize, b: usize) -> usize {
        a - b
    }

    fn go_forward_by_bytes(&self, base: usize, n: usize) -> usize {
        base + n
    }

    fn locale(&self) -> &dyn Locale {
        self.locale
    }

    fn slice(&self, lo: usize, hi: usize) -> &str {
        &self.text[lo..hi]
    }

    fn find_literal(&self, from: usize, c: u32) -> Option<usize> {
        if from >= self.end {
            return None;
        }
        let hay = &self.bytes()[from..self.end];
        let found = if c < 0x80 {
            memchr::memchr(c as u8, hay)
        } else {
            let ch = char::from_u32(c)?;
            let mut buf = [0u8; 4];
            memchr::memmem::find(hay, ch.encode_utf8(&mut buf).as_bytes())
        };
        found.map(|i| from + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_width() {
        let text = "a\u{e9}\u{4e2d}\u{1f600}";
        let ctx = Utf8Context::new(text, 0, text.len());
        let mut pos = 0;
        let mut seen = Vec::new();
        while pos < ctx.end() {
            seen.push(ctx.str(pos));
            pos = ctx.next(pos);
        }
        assert_eq!(seen, vec![0x61, 0xe9, 0x4e2d, 0x1f600]);
        assert_eq!(ctx.prev(text.len()), Ok(6));
        assert_eq!(ctx.prev(3), Ok(1));
    }

    #[test]
    fn counted_moves_stop_at_bounds() {
        let text = "\u{e9}\u{e9}\u{e9}";
        let ctx = Utf8Context::new(text, 0, text.len());
        assert_eq!(ctx.next_n(0, 3, ctx.end()), Ok(6));
        assert_eq!(ctx.next_n(0, 4, ctx.end()), Err(OutOfString));
        assert_eq!(ctx.prev_n(6, 2, 0), Ok(2));
        assert_eq!(ctx.prev_n(6, 2, 4), Err(OutOfString));
        assert_eq!(ctx.maximum_distance(0, 6), 6);
    }

    #[test]
    fn window_snaps_to_boundaries() {
        let text = "x\u{e9}y";
        let ctx = Utf8Context::new(text, 2, 2);
        assert_eq!(ctx.match_start(), 1);
        assert_eq!(ctx.end(), 1);
    }

    #[test]
    fn rejects_invalid_bytes() {
        let err = Utf8Context::from_bytes(b"ok\xc3", 0, 3).unwrap_err();
        assert_eq!(err, MatchError::InvalidUtf8 { valid_up_to: 2 });
    }

    #[test]
    fn find_literal_and_char_index() {
        let text = "ab\u{4e2d}c\u{4e2d}";
        let ctx = Utf8Context::new(text, 0, text.len());
        assert_eq!(ctx.find_literal(0, 0x4e2d), Some(2));
        assert_eq!(ctx.find_literal(3, 0x4e2d), Some(6));
        assert_eq!(ctx.find_literal(0, 'c' as u32), Some(5));
        assert_eq!(ctx.byte_to_char_index(6), 4);
        assert_eq!(ctx.get_single_byte(2, 0), 0xe4);
    }
}
