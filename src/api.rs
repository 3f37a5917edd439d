// api.rs - Match entry points and the helpers built on repeated search.
//
// The entry points wrap a subject into its match context, run one of the
// drivers and hand back the finished context. `Match` reads groups off any
// context; `FindIter`, `split` and `sub` walk a whole text.

use std::ops::Range;

use log::trace;
use smallvec::SmallVec;

use crate::context::{MatchContext, MatchMode};
use crate::encodings::{Subject, TextBuf};
use crate::error::MatchError;
use crate::marks;
use crate::pattern::CompiledPattern;
use crate::search::{match_context, search_context};

impl CompiledPattern {
    /// Anchored match at `pos`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sremat::prelude::*;
    ///
    /// // legacy numbering: LITERAL 'a', SUCCESS
    /// let pattern = CompiledPattern::builder([19, 97, 1])
    ///     .numbering(Numbering::Legacy)
    ///     .build()
    ///     .unwrap();
    /// assert!(pattern.match_at("abc", 0).is_some());
    /// assert!(pattern.match_at("abc", 1).is_none());
    /// ```
    pub fn match_at<'t, S: Subject<'t>>(&self, text: S, pos: usize) -> Option<S::Context> {
        self.match_range(text, pos, text.len())
    }

    /// Anchored match at `pos` with the text cut off at `endpos`.
    pub fn match_range<'t, S: Subject<'t>>(&self, text: S, pos: usize, endpos: usize) -> Option<S::Context> {
        let mut ctx = text.into_context(pos, endpos);
        match_context(&mut ctx, self).then_some(ctx)
    }

    /// Anchored match at `pos` that must run to the end of the text.
    pub fn fullmatch<'t, S: Subject<'t>>(&self, text: S, pos: usize) -> Option<S::Context> {
        self.fullmatch_range(text, pos, text.len())
    }

    /// Anchored match at `pos` that must run exactly to `endpos`.
    pub fn fullmatch_range<'t, S: Subject<'t>>(
        &self,
        text: S,
        pos: usize,
        endpos: usize,
    ) -> Option<S::Context> {
        let mut ctx = text.into_context(pos, endpos);
        ctx.state_mut().match_mode = MatchMode::Full;
        match_context(&mut ctx, self).then_some(ctx)
    }

    /// Leftmost match starting at or after `pos`.
    pub fn search<'t, S: Subject<'t>>(&self, text: S, pos: usize) -> Option<S::Context> {
        self.search_range(text, pos, text.len())
    }

    /// Leftmost match within `[pos, endpos)`.
    pub fn search_range<'t, S: Subject<'t>>(&self, text: S, pos: usize, endpos: usize) -> Option<S::Context> {
        let mut ctx = text.into_context(pos, endpos);
        search_context(&mut ctx, self).then_some(ctx)
    }

    pub fn is_match<'t, S: Subject<'t>>(&self, text: S) -> bool {
        self.search(text, 0).is_some()
    }

    /// Iterate over all non-overlapping matches in `text`.
    pub fn find_iter<'p, 't, S: Subject<'t>>(&'p self, text: S) -> FindIter<'p, S::Context> {
        FindIter {
            pattern: self,
            ctx: text.into_context(0, text.len()),
            pos: 0,
            last_was_empty: false,
            done: false,
        }
    }

    /// Split `text` at each match. The contents of every capture group are
    /// interleaved between the pieces. `maxsplit == 0` splits everywhere.
    ///
    /// # Examples
    ///
    /// ```
    /// use sremat::prelude::*;
    ///
    /// let mut e = Emitter::new();
    /// e.literal(',' as u32);
    /// e.op(Opcode::Success);
    /// let comma = e.into_pattern(SreFlag::empty()).unwrap();
    ///
    /// let pieces = comma.split("a,b,,c", 2);
    /// assert_eq!(pieces, vec![Some("a"), Some("b"), Some(",c")]);
    /// ```
    pub fn split<'t, S: Subject<'t>>(&self, text: S, maxsplit: usize) -> Vec<Option<&'t S::Text>> {
        let mut pieces = Vec::new();
        let mut last = 0;
        for caps in self.find_iter(text).take(limit(maxsplit)) {
            pieces.push(Some(text.slice(last, caps.start())));
            pieces.extend((1..caps.len()).map(|g| caps.text(text, g)));
            last = caps.end();
        }
        pieces.push(Some(text.slice(last, text.len())));
        pieces
    }

    /// Replace up to `count` matches (all of them when `count == 0`).
    /// `replacer` appends the replacement for each match to the output.
    pub fn sub<'t, S, F>(&self, text: S, count: usize, replacer: F) -> S::Buf
    where
        S: Subject<'t>,
        F: FnMut(&Captures, &mut S::Buf),
    {
        self.subn(text, count, replacer).0
    }

    /// [`CompiledPattern::sub`] that also reports the number of
    /// replacements made.
    ///
    /// # Examples
    ///
    /// ```
    /// use sremat::prelude::*;
    ///
    /// // x*
    /// let mut e = Emitter::new();
    /// e.repeat_one(0, None, |e| e.literal('x' as u32));
    /// e.op(Opcode::Success);
    /// let pattern = e.into_pattern(SreFlag::empty()).unwrap();
    ///
    /// let (out, n) = pattern.subn("abxd", 0, |_, out: &mut String| out.push('-'));
    /// assert_eq!(out, "-a-b--d-");
    /// assert_eq!(n, 5);
    /// ```
    pub fn subn<'t, S, F>(&self, text: S, count: usize, mut replacer: F) -> (S::Buf, usize)
    where
        S: Subject<'t>,
        F: FnMut(&Captures, &mut S::Buf),
    {
        let mut out = S::Buf::default();
        let mut last = 0;
        let mut n = 0;
        for caps in self.find_iter(text).take(limit(count)) {
            out.push_piece(text.slice(last, caps.start()));
            replacer(&caps, &mut out);
            last = caps.end();
            n += 1;
        }
        out.push_piece(text.slice(last, text.len()));
        trace!("sub: {} replacements", n);
        (out, n)
    }
}

fn limit(count: usize) -> usize {
    if count == 0 {
        usize::MAX
    } else {
        count
    }
}

// === Match ===

/// Group accessors for a context that holds a successful match.
///
/// Positions are those of the context: element indices for fixed-width
/// texts, byte offsets for UTF-8.
pub trait Match: MatchContext {
    /// Span of group `group` (0 is the whole match); `Ok(None)` when the
    /// group did not take part in the match.
    fn span(&self, group: usize) -> Result<Option<(usize, usize)>, MatchError> {
        let state = self.state();
        if group == 0 {
            return Ok(Some((state.match_start, state.match_end)));
        }
        if group > state.groups {
            return Err(MatchError::NoSuchGroup(group));
        }
        let flat = state.flat_marks();
        match (flat[2 * group - 2], flat[2 * group - 1]) {
            (Some(start), Some(stop)) if start <= stop => Ok(Some((start, stop))),
            _ => Ok(None),
        }
    }

    /// [`Match::span`] folding an unknown group into `None`.
    fn span_of(&self, group: usize) -> Option<(usize, usize)> {
        self.span(group).ok().flatten()
    }

    /// Text captured by group `group`.
    fn group(&self, group: usize) -> Result<Option<&Self::Text>, MatchError> {
        Ok(self.span(group)?.map(|(lo, hi)| self.slice(lo, hi)))
    }

    /// Texts of groups `1..=n`.
    fn groups(&self) -> Vec<Option<&Self::Text>> {
        (1..=self.state().groups)
            .map(|g| self.group(g).ok().flatten())
            .collect()
    }

    /// Highest-numbered group closed most recently (Python's `lastindex`).
    fn last_index(&self) -> Option<usize> {
        marks::last_index(self.state().match_marks())
    }

    /// Owned copy of every group span.
    fn captures(&self) -> Captures {
        let groups = self.state().groups;
        Captures {
            spans: (0..=groups).map(|g| self.span_of(g)).collect(),
            last_index: self.last_index(),
        }
    }
}

impl<C: MatchContext> Match for C {}

// === Captures ===

/// Spans of all groups of one match, detached from the context.
///
/// Group 0 is the entire match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    spans: SmallVec<[Option<(usize, usize)>; 4]>,
    last_index: Option<usize>,
}

impl Captures {
    /// Range of group `i`, or `None` if it did not participate.
    pub fn get(&self, i: usize) -> Option<Range<usize>> {
        let (start, end) = (*self.spans.get(i)?)?;
        Some(start..end)
    }

    pub fn start(&self) -> usize {
        self.spans[0].map_or(0, |(start, _)| start)
    }

    pub fn end(&self) -> usize {
        self.spans[0].map_or(0, |(_, end)| end)
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Number of groups including group 0.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Text of group `i` inside the subject the match was made on.
    pub fn text<'t, S: Subject<'t>>(&self, subject: S, i: usize) -> Option<&'t S::Text> {
        self.get(i).map(|r| subject.slice(r.start, r.end))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Range<usize>>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

// === FindIter ===

/// Iterator over all non-overlapping matches in a text.
///
/// After an empty match the next attempt at the same position must consume
/// something; otherwise the search resumes one character further on.
pub struct FindIter<'p, C> {
    pattern: &'p CompiledPattern,
    ctx: C,
    pos: usize,
    last_was_empty: bool,
    done: bool,
}

impl<C: MatchContext> FindIter<'_, C> {
    fn advance(&mut self) -> bool {
        let end = self.ctx.end();
        if !self.last_was_empty {
            self.ctx.reset(self.pos);
            return search_context(&mut self.ctx, self.pattern);
        }

        self.ctx.reset(self.pos);
        self.ctx.state_mut().match_mode = MatchMode::NonEmpty;
        let found = match_context(&mut self.ctx, self.pattern);
        self.ctx.state_mut().match_mode = MatchMode::Any;
        if found {
            return true;
        }
        if self.pos >= end {
            return false;
        }
        let next = self.ctx.next(self.pos);
        self.ctx.reset(next);
        search_context(&mut self.ctx, self.pattern)
    }
}

impl<C: MatchContext> Iterator for FindIter<'_, C> {
    type Item = Captures;

    fn next(&mut self) -> Option<Captures> {
        if self.done {
            return None;
        }
        if !self.advance() {
            self.done = true;
            return None;
        }
        let (start, end) = (self.ctx.match_start(), self.ctx.match_end());
        self.last_was_empty = start == end;
        self.pos = end;
        Some(self.ctx.captures())
    }
}
