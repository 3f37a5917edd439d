// encodings/mod.rs - Concrete match contexts, one module per text layout.

pub mod unit;
pub mod utf8;

pub use unit::{ByteContext, CodeUnit, UnitContext};
pub use utf8::Utf8Context;

use crate::context::MatchContext;

/// Growable owned text, used to assemble substitution results.
pub trait TextBuf: Default {
    type Piece: ?Sized;

    fn push_piece(&mut self, piece: &Self::Piece);
}

impl<U: CodeUnit> TextBuf for Vec<U> {
    type Piece = [U];

    fn push_piece(&mut self, piece: &[U]) {
        self.extend_from_slice(piece);
    }
}

impl TextBuf for String {
    type Piece = str;

    fn push_piece(&mut self, piece: &str) {
        self.push_str(piece);
    }
}

/// Text that can be wrapped into a match context.
pub trait Subject<'t>: Copy {
    /// Unsized text type handed out by [`Subject::slice`].
    type Text: ?Sized + 't;
    /// Owned form of the text.
    type Buf: TextBuf<Piece = Self::Text>;
    type Context: MatchContext<Text = Self::Text>;

    /// Wrap the text with the window `[start, end)`.
    fn into_context(self, start: usize, end: usize) -> Self::Context;

    /// Text between two positions of a context built from this subject.
    fn slice(self, lo: usize, hi: usize) -> &'t Self::Text;

    /// Length in positions (elements or bytes).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'t, U: CodeUnit> Subject<'t> for &'t [U] {
    type Text = [U];
    type Buf = Vec<U>;
    type Context = UnitContext<'t, U>;

    fn into_context(self, start: usize, end: usize) -> Self::Context {
        UnitContext::new(self, start, end)
    }

    fn slice(self, lo: usize, hi: usize) -> &'t [U] {
        &self[lo..hi]
    }

    fn len(&self) -> usize {
        <[U]>::len(self)
    }
}

impl<'t, U: CodeUnit, const N: usize> Subject<'t> for &'t [U; N] {
    type Text = [U];
    type Buf = Vec<U>;
    type Context = UnitContext<'t, U>;

    fn into_context(self, start: usize, end: usize) -> Self::Context {
        UnitContext::new(&self[..], start, end)
    }

    fn slice(self, lo: usize, hi: usize) -> &'t [U] {
        &self[lo..hi]
    }

    fn len(&self) -> usize {
        N
    }
}

impl<'t, U: CodeUnit> Subject<'t> for &'t Vec<U> {
    type Text = [U];
    type Buf = Vec<U>;
    type Context = UnitContext<'t, U>;

    fn into_context(self, start: usize, end: usize) -> Self::Context {
        UnitContext::new(self.as_slice(), start, end)
    }

    fn slice(self, lo: usize, hi: usize) -> &'t [U] {
        &self.as_slice()[lo..hi]
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<'t> Subject<'t> for &'t str {
    type Text = str;
    type Buf = String;
    type Context = Utf8Context<'t>;

    fn into_context(self, start: usize, end: usize) -> Self::Context {
        Utf8Context::new(self, start, end)
    }

    fn slice(self, lo: usize, hi: usize) -> &'t str {
        &self[lo..hi]
    }

    fn len(&self) -> usize {
        str::len(self)
    }
}

impl<'t> Subject<'t> for &'t String {
    type Text = str;
    type Buf = String;
    type Context = Utf8Context<'t>;

    fn into_context(self, start: usize, end: usize) -> Self::Context {
        Utf8Context::new(self.as_str(), start, end)
    }

    fn slice(self, lo: usize, hi: usize) -> &'t str {
        &self.as_str()[lo..hi]
    }

    fn len(&self) -> usize {
        String::len(self)
    }
}
