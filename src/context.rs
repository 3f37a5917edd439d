// context.rs - The text view and per-attempt state shared by the
// interpreter and the search drivers.
//
// A context owns (or borrows) the subject text, fixes the window end and
// records the outcome of the last successful attempt. Position arithmetic is
// encoding-specific and lives in the implementations under `encodings`.

use std::cell::OnceCell;

use crate::charclass::{self, Locale};
use crate::constants::CaseMode;
use crate::marks::{self, FlatMarks, Marks};

/// Moving a position would leave the allowed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfString;

/// What counts as a successful end of match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Any,
    /// The match must consume at least one character.
    NonEmpty,
    /// The match must end at the window end.
    Full,
}

/// Outcome of the most recent attempt on a context.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub match_start: usize,
    pub match_end: usize,
    pub match_mode: MatchMode,
    /// Capture groups of the pattern last run on this context.
    pub groups: usize,
    match_marks: Marks,
    flat: OnceCell<FlatMarks>,
}

impl MatchState {
    pub fn new(start: usize) -> Self {
        MatchState {
            match_start: start,
            match_end: start,
            match_mode: MatchMode::Any,
            groups: 0,
            match_marks: None,
            flat: OnceCell::new(),
        }
    }

    /// Prepare for a new attempt at `start`.
    pub fn reset(&mut self, start: usize) {
        self.match_start = start;
        self.match_end = start;
        self.match_marks = None;
        self.flat = OnceCell::new();
    }

    /// Record a successful end of match.
    pub fn set_match(&mut self, end: usize, marks: Marks) {
        self.match_end = end;
        self.match_marks = marks;
        self.flat = OnceCell::new();
    }

    pub fn match_marks(&self) -> &Marks {
        &self.match_marks
    }

    /// Group slot table of the recorded match, computed once.
    pub fn flat_marks(&self) -> &FlatMarks {
        self.flat
            .get_or_init(|| marks::flatten(&self.match_marks, self.groups))
    }
}

/// A view of the subject text plus the state of one attempt.
///
/// Positions are opaque `usize` values: element indices for fixed-width
/// texts, byte offsets for UTF-8. Only positions produced by this trait's
/// own arithmetic are valid.
pub trait MatchContext {
    /// Unsized text type returned by [`MatchContext::slice`].
    type Text: ?Sized;

    fn state(&self) -> &MatchState;
    fn state_mut(&mut self) -> &mut MatchState;

    /// Window end; positions never exceed it.
    fn end(&self) -> usize;

    /// Code point at `pos`; `pos` must be below [`MatchContext::end`].
    fn str(&self, pos: usize) -> u32;

    /// Position of the character after the one at `pos`.
    fn next(&self, pos: usize) -> usize;

    /// Position of the character before `pos`.
    fn prev(&self, pos: usize) -> Result<usize, OutOfString>;

    /// Advance `n` characters without passing `bound`.
    fn next_n(&self, pos: usize, n: usize, bound: usize) -> Result<usize, OutOfString>;

    /// Retreat `n` characters without going below `bound`.
    fn prev_n(&self, pos: usize, n: usize, bound: usize) -> Result<usize, OutOfString>;

    /// Upper bound on the number of characters in `[lo, hi)`.
    fn maximum_distance(&self, lo: usize, hi: usize) -> usize;

    /// Raw storage unit `i` units after `base`.
    fn get_single_byte(&self, base: usize, i: usize) -> u32;

    /// Storage units between two positions (`a >= b`).
    fn bytes_difference(&self, a: usize, b: usize) -> usize;

    fn go_forward_by_bytes(&self, base: usize, n: usize) -> usize;

    fn locale(&self) -> &dyn Locale;

    /// Raw text between two positions.
    fn slice(&self, lo: usize, hi: usize) -> &Self::Text;

    /// Lowercased code point at `pos`.
    fn lowstr(&self, pos: usize, mode: CaseMode) -> u32 {
        charclass::to_lower(self.str(pos), mode, self.locale())
    }

    /// First position in `[from, end)` holding the code point `c`.
    fn find_literal(&self, from: usize, c: u32) -> Option<usize> {
        let end = self.end();
        let mut pos = from;
        while pos < end {
            if self.str(pos) == c {
                return Some(pos);
            }
            pos = self.next(pos);
        }
        None
    }

    fn match_start(&self) -> usize {
        self.state().match_start
    }

    fn match_end(&self) -> usize {
        self.state().match_end
    }

    fn match_mode(&self) -> MatchMode {
        self.state().match_mode
    }

    fn reset(&mut self, start: usize) {
        self.state_mut().reset(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_marks() {
        let mut state = MatchState::new(0);
        state.groups = 1;
        state.set_match(3, marks::push(&None, 0, 1));
        assert_eq!(state.flat_marks().as_slice(), &[Some(1), None]);
        state.reset(2);
        assert_eq!(state.match_start, 2);
        assert_eq!(state.match_end, 2);
        assert!(state.match_marks().is_none());
        assert_eq!(state.flat_marks().as_slice(), &[None, None]);
    }

    #[test]
    fn set_match_invalidates_flat_cache() {
        let mut state = MatchState::new(0);
        state.groups = 1;
        assert_eq!(state.flat_marks().as_slice(), &[None, None]);
        state.set_match(2, marks::push(&None, 1, 2));
        assert_eq!(state.flat_marks().as_slice(), &[None, Some(2)]);
    }
}
