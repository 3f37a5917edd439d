// result.rs - Resumable choice points.
//
// `sre_match` returns a `MatchResult` describing how it reached SUCCESS.
// Every variant except `Matched` keeps enough state to produce the next
// alternative on demand, which is how backtracking into an already
// finished sub-match works without recursion on the text length.

use crate::constants::Opcode;
use crate::context::MatchContext;
use crate::interp::{char_ok, sre_match, sre_match_any};
use crate::marks::Marks;
use crate::pattern::CompiledPattern;

/// A successful match together with its pending alternatives.
#[derive(Debug)]
pub enum MatchResult {
    /// Reached SUCCESS with no choice point left behind.
    Matched,
    Branch(Box<BranchResult>),
    RepeatOne(Box<RepeatOneResult>),
    MinRepeatOne(Box<MinRepeatOneResult>),
    MaxUntil(Box<UntilResult>),
    MinUntil(Box<UntilResult>),
}

impl MatchResult {
    /// Produce the next alternative match, or `None` once exhausted.
    ///
    /// On success the context's match end and marks describe the new match.
    pub fn move_to_next_result<C: MatchContext>(
        self,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<MatchResult> {
        match self {
            MatchResult::Matched => None,
            MatchResult::Branch(r) => r.move_to_next_result(ctx, pattern).map(MatchResult::Branch),
            MatchResult::RepeatOne(r) => {
                r.move_to_next_result(ctx, pattern).map(MatchResult::RepeatOne)
            }
            MatchResult::MinRepeatOne(r) => r
                .move_to_next_result(ctx, pattern)
                .map(MatchResult::MinRepeatOne),
            MatchResult::MaxUntil(r) => r
                .move_to_next_result(ctx, pattern)
                .map(MatchResult::MaxUntil),
            MatchResult::MinUntil(r) => r
                .move_to_next_result(ctx, pattern)
                .map(MatchResult::MinUntil),
        }
    }
}

/// Shared resumption protocol: first exhaust the sub-result, then advance
/// this choice point itself.
pub trait Continuation: Sized {
    fn subresult(&mut self) -> &mut Option<MatchResult>;

    fn find_next_result<C: MatchContext>(
        self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>>;

    fn move_to_next_result<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        let sub = self.subresult().take()?;
        match sub.move_to_next_result(ctx, pattern) {
            Some(next) => {
                *self.subresult() = Some(next);
                Some(self)
            }
            None => self.find_next_result(ctx, pattern),
        }
    }
}

// === Branch ===

/// Alternatives of a BRANCH, tried in order.
#[derive(Debug)]
pub struct BranchResult {
    /// Skip word of the next alternative to try.
    ppos: usize,
    start_ptr: usize,
    start_marks: Marks,
    subresult: Option<MatchResult>,
}

impl BranchResult {
    pub fn new(ppos: usize, ptr: usize, marks: Marks) -> Box<Self> {
        Box::new(BranchResult {
            ppos,
            start_ptr: ptr,
            start_marks: marks,
            subresult: None,
        })
    }

    pub fn find_first_result<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        let mut ppos = self.ppos;
        loop {
            let skip = pattern.pat(ppos) as usize;
            if skip == 0 {
                return None;
            }
            let result = sre_match(ctx, pattern, ppos + 1, self.start_ptr, self.start_marks.clone());
            ppos += skip;
            if let Some(result) = result {
                self.subresult = Some(result);
                self.ppos = ppos;
                return Some(self);
            }
        }
    }
}

impl Continuation for BranchResult {
    fn subresult(&mut self) -> &mut Option<MatchResult> {
        &mut self.subresult
    }

    fn find_next_result<C: MatchContext>(
        self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        self.find_first_result(ctx, pattern)
    }
}

// === RepeatOne ===

/// Greedy single-character repeat: start from the longest run and give
/// back one character per retry.
#[derive(Debug)]
pub struct RepeatOneResult {
    nextppos: usize,
    minptr: usize,
    /// Next end of run to try; `None` once the run would go below position 0.
    ptr: Option<usize>,
    start_marks: Marks,
    subresult: Option<MatchResult>,
}

impl RepeatOneResult {
    pub fn new(nextppos: usize, minptr: usize, ptr: usize, marks: Marks) -> Box<Self> {
        Box::new(RepeatOneResult {
            nextppos,
            minptr,
            ptr: Some(ptr),
            start_marks: marks,
            subresult: None,
        })
    }

    pub fn find_first_result<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        // A tail starting with a literal cannot match where that literal is absent.
        let literal = match pattern.op(self.nextppos) {
            Opcode::Literal => Some(pattern.pat(self.nextppos + 1)),
            _ => None,
        };
        while let Some(ptr) = self.ptr {
            if ptr < self.minptr {
                break;
            }
            let prev = ctx.prev(ptr).ok();
            if let Some(c) = literal {
                if ptr >= ctx.end() || ctx.str(ptr) != c {
                    self.ptr = prev;
                    continue;
                }
            }
            let result = sre_match(ctx, pattern, self.nextppos, ptr, self.start_marks.clone());
            self.ptr = prev;
            if let Some(result) = result {
                self.subresult = Some(result);
                return Some(self);
            }
        }
        None
    }
}

impl Continuation for RepeatOneResult {
    fn subresult(&mut self) -> &mut Option<MatchResult> {
        &mut self.subresult
    }

    fn find_next_result<C: MatchContext>(
        self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        self.find_first_result(ctx, pattern)
    }
}

// === MinRepeatOne ===

/// Lazy single-character repeat: try the tail first, then extend the run
/// by one character.
#[derive(Debug)]
pub struct MinRepeatOneResult {
    nextppos: usize,
    /// The repeated item.
    itemppos: usize,
    /// Extensions still allowed; `usize::MAX` when unbounded.
    max_count: usize,
    start_ptr: usize,
    start_marks: Marks,
    subresult: Option<MatchResult>,
}

impl MinRepeatOneResult {
    pub fn new(
        nextppos: usize,
        itemppos: usize,
        max_count: usize,
        ptr: usize,
        marks: Marks,
    ) -> Box<Self> {
        Box::new(MinRepeatOneResult {
            nextppos,
            itemppos,
            max_count,
            start_ptr: ptr,
            start_marks: marks,
            subresult: None,
        })
    }

    pub fn find_first_result<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        let mut ptr = self.start_ptr;
        let mut max_count = self.max_count;
        loop {
            if let Some(result) = sre_match(ctx, pattern, self.nextppos, ptr, self.start_marks.clone()) {
                self.subresult = Some(result);
                self.start_ptr = ptr;
                self.max_count = max_count;
                return Some(self);
            }
            if max_count == 0 || !self.next_char_ok(ctx, pattern, ptr) {
                return None;
            }
            ptr = ctx.next(ptr);
            max_count -= 1;
        }
    }

    fn next_char_ok<C: MatchContext>(&self, ctx: &mut C, pattern: &CompiledPattern, ptr: usize) -> bool {
        if ptr >= ctx.end() {
            return false;
        }
        match char_ok(ctx, pattern, ptr, self.itemppos) {
            Some(ok) => ok,
            // not one of the single-character opcodes; run it
            None => sre_match_any(ctx, pattern, self.itemppos, ptr, self.start_marks.clone()).is_some(),
        }
    }
}

impl Continuation for MinRepeatOneResult {
    fn subresult(&mut self) -> &mut Option<MatchResult> {
        &mut self.subresult
    }

    fn find_next_result<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        let ptr = self.start_ptr;
        if self.max_count == 0 || !self.next_char_ok(ctx, pattern, ptr) {
            return None;
        }
        self.start_ptr = ctx.next(ptr);
        self.max_count -= 1;
        self.find_first_result(ctx, pattern)
    }
}

// === MaxUntil / MinUntil ===

/// One recorded iteration of a REPEAT item: where it started and how to
/// ask it for its next alternative.
#[derive(Debug)]
pub struct Pending {
    ptr: usize,
    marks: Marks,
    result: MatchResult,
    next: Option<Box<Pending>>,
}

impl Drop for Pending {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut p) = next {
            next = p.next.take();
        }
    }
}

/// State of a general REPEAT, shared by the greedy and lazy flavors.
#[derive(Debug)]
pub struct UntilResult {
    /// MAX_UNTIL rather than MIN_UNTIL.
    greedy: bool,
    /// Skip word of the REPEAT; `min` and `max` follow it.
    ppos: usize,
    tailppos: usize,
    cur_ptr: usize,
    cur_marks: Marks,
    pending: Option<Box<Pending>>,
    num_pending: usize,
    subresult: Option<MatchResult>,
}

impl UntilResult {
    pub fn new(greedy: bool, ppos: usize, tailppos: usize, ptr: usize, marks: Marks) -> Box<Self> {
        Box::new(UntilResult {
            greedy,
            ppos,
            tailppos,
            cur_ptr: ptr,
            cur_marks: marks,
            pending: None,
            num_pending: 0,
            subresult: None,
        })
    }

    pub fn find_first_result<C: MatchContext>(
        self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        self.search_next(ctx, pattern, false)
    }

    fn search_next<C: MatchContext>(
        self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
        resume: bool,
    ) -> Option<Box<Self>> {
        if self.greedy {
            self.max_search_next(ctx, pattern, resume)
        } else {
            self.min_search_next(ctx, pattern, resume)
        }
    }

    fn bounds(&self, pattern: &CompiledPattern) -> (usize, Option<usize>) {
        let min = pattern.pat(self.ppos + 1) as usize;
        let max = pattern.pat(self.ppos + 2);
        let max = if max == pattern.maxrepeat() {
            None
        } else {
            Some(max as usize)
        };
        (min, max)
    }

    fn push(&mut self, ptr: usize, marks: Marks, result: MatchResult) {
        let next = self.pending.take();
        self.pending = Some(Box::new(Pending {
            ptr,
            marks,
            result,
            next,
        }));
        self.num_pending += 1;
    }

    /// Pop the most recent iteration.
    fn pop(&mut self) -> Option<(usize, Marks, MatchResult)> {
        let mut p = self.pending.take()?;
        self.pending = p.next.take();
        self.num_pending -= 1;
        let result = std::mem::replace(&mut p.result, MatchResult::Matched);
        Some((p.ptr, p.marks.take(), result))
    }

    fn accept(mut self: Box<Self>, ptr: usize, marks: Marks, result: MatchResult) -> Box<Self> {
        self.subresult = Some(result);
        self.cur_ptr = ptr;
        self.cur_marks = marks;
        self
    }

    /// Greedy search: as many items as possible, then the tail.
    fn max_search_next<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
        mut resume: bool,
    ) -> Option<Box<Self>> {
        let (min, max) = self.bounds(pattern);
        let mut ptr = self.cur_ptr;
        let mut marks = self.cur_marks.clone();
        loop {
            let item = if resume {
                let (p_ptr, p_marks, p_result) = self.pop()?;
                ptr = p_ptr;
                marks = p_marks;
                p_result.move_to_next_result(ctx, pattern)
            } else if max.map_or(true, |max| self.num_pending < max) {
                sre_match(ctx, pattern, self.ppos + 3, ptr, marks.clone())
            } else {
                None
            };

            if let Some(item) = item {
                let end = ctx.match_end();
                let end_marks = ctx.state().match_marks().clone();
                self.push(ptr, marks, item);
                let empty = end == ptr;
                ptr = end;
                marks = end_marks;
                // after an empty iteration, stop repeating once min is met
                if !(empty && self.num_pending >= min) {
                    resume = false;
                    continue;
                }
            }

            if self.num_pending >= min {
                if let Some(result) = sre_match(ctx, pattern, self.tailppos, ptr, marks.clone()) {
                    return Some(self.accept(ptr, marks, result));
                }
            }
            resume = true;
        }
    }

    /// Lazy search: the tail first, one more item only when it fails.
    fn min_search_next<C: MatchContext>(
        mut self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
        mut resume: bool,
    ) -> Option<Box<Self>> {
        let (min, max) = self.bounds(pattern);
        let mut ptr = self.cur_ptr;
        let mut marks = self.cur_marks.clone();
        loop {
            if !resume && self.num_pending >= min {
                if let Some(result) = sre_match(ctx, pattern, self.tailppos, ptr, marks.clone()) {
                    return Some(self.accept(ptr, marks, result));
                }
            }
            resume = false;

            let mut item = if max.map_or(true, |max| self.num_pending < max) {
                sre_match(ctx, pattern, self.ppos + 3, ptr, marks.clone())
            } else {
                None
            };
            let item = loop {
                // an empty iteration past min cannot lead anywhere new
                if self.num_pending >= min {
                    while item.is_some() && ctx.match_end() == ptr {
                        item = item.and_then(|r| r.move_to_next_result(ctx, pattern));
                    }
                }
                if let Some(result) = item {
                    break result;
                }
                let (p_ptr, p_marks, p_result) = self.pop()?;
                ptr = p_ptr;
                marks = p_marks;
                item = p_result.move_to_next_result(ctx, pattern);
            };

            let end = ctx.match_end();
            let end_marks = ctx.state().match_marks().clone();
            self.push(ptr, marks, item);
            ptr = end;
            marks = end_marks;
        }
    }
}

impl Continuation for UntilResult {
    fn subresult(&mut self) -> &mut Option<MatchResult> {
        &mut self.subresult
    }

    fn find_next_result<C: MatchContext>(
        self: Box<Self>,
        ctx: &mut C,
        pattern: &CompiledPattern,
    ) -> Option<Box<Self>> {
        self.search_next(ctx, pattern, true)
    }
}
