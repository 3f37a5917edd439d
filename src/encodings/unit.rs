// encodings/unit.rs - Fixed-width texts: bytes, UCS-2 and UCS-4 code units.
//
// A position is an element index and every element is one character, so all
// position arithmetic is plain integer arithmetic.

use std::borrow::Cow;
use std::fmt;

use crate::charclass::{Locale, C_LOCALE};
use crate::context::{MatchContext, MatchState, OutOfString};

/// One storage element of a fixed-width text.
pub trait CodeUnit: Copy + Eq + fmt::Debug + 'static {
    fn to_u32(self) -> u32;

    /// Narrow a code point; `None` if it cannot occur in this unit width.
    fn from_u32(c: u32) -> Option<Self>;

    /// Index of the first `needle` in `hay`.
    fn find(hay: &[Self], needle: Self) -> Option<usize> {
        hay.iter().position(|&u| u == needle)
    }
}

impl CodeUnit for u8 {
    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    fn from_u32(c: u32) -> Option<Self> {
        u8::try_from(c).ok()
    }

    fn find(hay: &[u8], needle: u8) -> Option<usize> {
        memchr::memchr(needle, hay)
    }
}

impl CodeUnit for u16 {
    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    fn from_u32(c: u32) -> Option<Self> {
        u16::try_from(c).ok()
    }
}

impl CodeUnit for u32 {
    #[inline]
    fn to_u32(self) -> u32 {
        self
    }

    fn from_u32(c: u32) -> Option<Self> {
        Some(c)
    }
}

/// Match context over a slice of fixed-width code units.
pub struct UnitContext<'t, U: CodeUnit> {
    text: Cow<'t, [U]>,
    end: usize,
    locale: &'t dyn Locale,
    state: MatchState,
}

/// Context over a byte string.
pub type ByteContext<'t> = UnitContext<'t, u8>;

impl<'t, U: CodeUnit> UnitContext<'t, U> {
    /// View `text` with the window `[start, end)`; both bounds are clamped
    /// to the text length.
    pub fn new(text: &'t [U], start: usize, end: usize) -> Self {
        Self::from_cow(Cow::Borrowed(text), start, end)
    }

    /// Like [`UnitContext::new`] but owning the text.
    pub fn owned(text: Vec<U>, start: usize, end: usize) -> Self {
        Self::from_cow(Cow::Owned(text), start, end)
    }

    fn from_cow(text: Cow<'t, [U]>, start: usize, end: usize) -> Self {
        let end = end.min(text.len());
        let start = start.min(end);
        UnitContext {
            text,
            end,
            locale: &C_LOCALE,
            state: MatchState::new(start),
        }
    }

    /// Use `locale` for the locale-dependent opcodes.
    pub fn with_locale(mut self, locale: &'t dyn Locale) -> Self {
        self.locale = locale;
        self
    }

    /// The whole text, including anything past the window end.
    pub fn text(&self) -> &[U] {
        &self.text
    }
}

impl<U: CodeUnit> fmt::Debug for UnitContext<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitContext")
            .field("len", &self.text.len())
            .field("end", &self.end)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<U: CodeUnit> MatchContext for UnitContext<'_, U> {
    type Text = [U];

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

    #[inline]
    fn str(&self, pos: usize) -> u32 {
        self.text[pos].to_u32()
    }

    #[inline]
    fn next(&self, pos: usize) -> usize {
        pos + 1
    }

    #[inline]
    fn prev(&self, pos: usize) -> Result<usize, OutOfString> {
        pos.checked_sub(1).ok_or(OutOfString)
    }

    fn next_n(&self, pos: usize, n: usize, bound: usize) -> Result<usize, OutOfString> {
        pos.checked_add(n)
            .filter(|&p| p <= bound)
            .ok_or(OutOfString)
    }

    fn prev_n(&self, pos: usize, n: usize, bound: usize) -> Result<usize, OutOfString> {
        pos.checked_sub(n)
            .filter(|&p| p >= bound)
            .ok_or(OutOfString)
    }

    fn maximum_distance(&self, lo: usize, hi: usize) -> usize {
        hi.saturating_sub(lo)
    }

    fn get_single_byte(&self, base: usize, i: usize) -> u32 {
        self.text[base + i].to_u32()
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

    fn slice(&self, lo: usize, hi: usize) -> &[U] {
        &self.text[lo..hi]
    }

    fn find_literal(&self, from: usize, c: u32) -> Option<usize> {
        let unit = U::from_u32(c)?;
        if from >= self.end {
            return None;
        }
        U::find(&self.text[from..self.end], unit).map(|i| from + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_clamped() {
        let ctx = ByteContext::new(b"abc", 5, 10);
        assert_eq!(ctx.end(), 3);
        assert_eq!(ctx.match_start(), 3);
    }

    #[test]
    fn position_arithmetic() {
        let ctx = ByteContext::new(b"abcdef", 0, 4);
        assert_eq!(ctx.next(1), 2);
        assert_eq!(ctx.prev(0), Err(OutOfString));
        assert_eq!(ctx.next_n(1, 3, ctx.end()), Ok(4));
        assert_eq!(ctx.next_n(1, 4, ctx.end()), Err(OutOfString));
        assert_eq!(ctx.next_n(1, usize::MAX, ctx.end()), Err(OutOfString));
        assert_eq!(ctx.prev_n(3, 2, 1), Ok(1));
        assert_eq!(ctx.prev_n(3, 3, 1), Err(OutOfString));
        assert_eq!(ctx.maximum_distance(1, 4), 3);
    }

    #[test]
    fn find_literal_respects_window() {
        let ctx = ByteContext::new(b"xxaxxa", 0, 4);
        assert_eq!(ctx.find_literal(0, 'a' as u32), Some(2));
        assert_eq!(ctx.find_literal(3, 'a' as u32), None);
        assert_eq!(ctx.find_literal(0, 0x100), None);

        let wide: Vec<u16> = "h\u{4e2d}llo".encode_utf16().collect();
        let ctx = UnitContext::new(&wide[..], 0, wide.len());
        assert_eq!(ctx.find_literal(0, 0x4e2d), Some(1));
        assert_eq!(ctx.str(1), 0x4e2d);
    }

    #[test]
    fn owned_text() {
        let ctx = UnitContext::owned(vec![0x1f600u32, 'a' as u32], 0, 2);
        assert_eq!(ctx.str(0), 0x1f600);
        assert_eq!(ctx.slice(1, 2), &['a' as u32]);
    }
}
