// interp.rs - The bytecode interpreter.
//
// `sre_match` walks the program from `ppos` with the text at `ptr`. Straight
// line opcodes loop in place; every opcode that leaves a choice behind hands
// control to a continuation in `crate::result` and returns it, so the Rust
// call depth depends on the program, never on the text.

use crate::charclass::{
    self, category_dispatch, char_loc_ignore, check_charset, check_charset_loc_ignore,
    is_boundary_word,
};
use crate::constants::{AtCode, CaseMode, Opcode};
use crate::context::{MatchContext, MatchMode};
use crate::marks::{self, Marks};
use crate::pattern::CompiledPattern;
use crate::result::{
    BranchResult, MatchResult, MinRepeatOneResult, RepeatOneResult, UntilResult,
};

/// Run the program from `ppos` against the text from `ptr`.
///
/// On success the context records the match end and marks; the returned
/// value can be asked for further alternatives.
pub fn sre_match<C: MatchContext>(
    ctx: &mut C,
    pattern: &CompiledPattern,
    mut ppos: usize,
    mut ptr: usize,
    mut marks: Marks,
) -> Option<MatchResult> {
    let end = ctx.end();
    loop {
        let op = pattern.op(ppos);
        ppos += 1;

        match op {
            Opcode::Failure => return None,

            Opcode::Success => {
                match ctx.match_mode() {
                    MatchMode::Full if ptr != end => return None,
                    MatchMode::NonEmpty if ptr == ctx.match_start() => return None,
                    _ => {}
                }
                ctx.state_mut().set_match(ptr, marks);
                return Some(MatchResult::Matched);
            }

            // end of a REPEAT item
            Opcode::MaxUntil | Opcode::MinUntil => {
                ctx.state_mut().set_match(ptr, marks);
                return Some(MatchResult::Matched);
            }

            Opcode::Any => {
                if ptr >= end || charclass::is_linebreak(ctx.str(ptr)) {
                    return None;
                }
                ptr = ctx.next(ptr);
            }

            Opcode::AnyAll => {
                if ptr >= end {
                    return None;
                }
                ptr = ctx.next(ptr);
            }

            // <ASSERT> <skip> <back> pattern <SUCCESS>
            Opcode::Assert => {
                let back = pattern.pat(ppos + 1) as usize;
                let start = ctx.prev_n(ptr, back, 0).ok()?;
                sre_match_any(ctx, pattern, ppos + 2, start, marks)?;
                marks = ctx.state().match_marks().clone();
                ppos += pattern.pat(ppos) as usize;
            }

            Opcode::AssertNot => {
                let back = pattern.pat(ppos + 1) as usize;
                if let Ok(start) = ctx.prev_n(ptr, back, 0) {
                    if sre_match_any(ctx, pattern, ppos + 2, start, marks.clone()).is_some() {
                        return None;
                    }
                }
                ppos += pattern.pat(ppos) as usize;
            }

            Opcode::At => {
                if !at(ctx, ptr, pattern.pat(ppos)) {
                    return None;
                }
                ppos += 1;
            }

            // <BRANCH> <skip> alt <JUMP> ... <0>
            Opcode::Branch => {
                return BranchResult::new(ppos, ptr, marks)
                    .find_first_result(ctx, pattern)
                    .map(MatchResult::Branch);
            }

            Opcode::Category => {
                if ptr >= end || !category_dispatch(pattern.pat(ppos), ctx.str(ptr), ctx.locale()) {
                    return None;
                }
                ptr = ctx.next(ptr);
                ppos += 1;
            }

            Opcode::GroupRef => {
                let (start, stop) = group_span(&marks, pattern.pat(ppos))?;
                ptr = match_repeated(ctx, ptr, start, stop)?;
                ppos += 1;
            }

            Opcode::GroupRefIgnore | Opcode::GroupRefLocIgnore | Opcode::GroupRefUniIgnore => {
                let mode = match op {
                    Opcode::GroupRefIgnore => CaseMode::Ascii,
                    Opcode::GroupRefLocIgnore => CaseMode::Locale,
                    _ => CaseMode::Unicode,
                };
                let (start, stop) = group_span(&marks, pattern.pat(ppos))?;
                ptr = match_repeated_ignore(ctx, ptr, start, stop, mode)?;
                ppos += 1;
            }

            // <GROUPREF_EXISTS> <group> <skip> yes <JUMP> no
            Opcode::GroupRefExists => {
                if group_span(&marks, pattern.pat(ppos)).is_some() {
                    ppos += 2;
                } else {
                    ppos += pattern.pat(ppos + 1) as usize;
                }
            }

            Opcode::In | Opcode::InIgnore | Opcode::InUniIgnore | Opcode::InLocIgnore => {
                if ptr >= end || !in_set(ctx, pattern, op, ppos, ptr) {
                    return None;
                }
                ppos += pattern.pat(ppos) as usize;
                ptr = ctx.next(ptr);
            }

            // <INFO> <skip> <flags> <min> ...
            Opcode::Info => {
                if ctx.maximum_distance(ptr, end) < pattern.pat(ppos + 2) as usize {
                    return None;
                }
                ppos += pattern.pat(ppos) as usize;
            }

            Opcode::Jump => {
                ppos += pattern.pat(ppos) as usize;
            }

            Opcode::Literal
            | Opcode::LiteralIgnore
            | Opcode::LiteralUniIgnore
            | Opcode::LiteralLocIgnore
            | Opcode::NotLiteral
            | Opcode::NotLiteralIgnore
            | Opcode::NotLiteralUniIgnore
            | Opcode::NotLiteralLocIgnore => {
                if ptr >= end || !literal_ok(ctx, op, pattern.pat(ppos), ptr) {
                    return None;
                }
                ppos += 1;
                ptr = ctx.next(ptr);
            }

            Opcode::Mark => {
                marks = marks::push(&marks, pattern.pat(ppos) as usize, ptr);
                ppos += 1;
            }

            // <REPEAT> <skip> <min> <max> item <MAX_UNTIL|MIN_UNTIL> tail
            Opcode::Repeat => {
                let untilppos = ppos + pattern.pat(ppos) as usize;
                let greedy = match pattern.op(untilppos) {
                    Opcode::MaxUntil => true,
                    Opcode::MinUntil => false,
                    other => panic!("REPEAT at {} closed by {:?}", ppos - 1, other),
                };
                let result = UntilResult::new(greedy, ppos, untilppos + 1, ptr, marks)
                    .find_first_result(ctx, pattern)?;
                return Some(if greedy {
                    MatchResult::MaxUntil(result)
                } else {
                    MatchResult::MinUntil(result)
                });
            }

            // <REPEAT_ONE> <skip> <min> <max> item <SUCCESS> tail
            Opcode::RepeatOne => {
                let min = pattern.pat(ppos + 1) as usize;
                let minptr = ctx.next_n(ptr, min, end).ok()?;
                let runend = find_repetition_end(ctx, pattern, ppos + 3, ptr, pattern.pat(ppos + 2), &marks);
                let nextppos = ppos + pattern.pat(ppos) as usize;
                return RepeatOneResult::new(nextppos, minptr, runend, marks)
                    .find_first_result(ctx, pattern)
                    .map(MatchResult::RepeatOne);
            }

            // <MIN_REPEAT_ONE> <skip> <min> <max> item <SUCCESS> tail
            Opcode::MinRepeatOne => {
                let min = pattern.pat(ppos + 1);
                if min > 0 {
                    let minptr = ctx.next_n(ptr, min as usize, end).ok()?;
                    ptr = find_repetition_end(ctx, pattern, ppos + 3, ptr, min, &marks);
                    if ptr < minptr {
                        return None;
                    }
                }
                let max = pattern.pat(ppos + 2);
                let max_count = if max == pattern.maxrepeat() {
                    usize::MAX
                } else {
                    (max - min) as usize
                };
                let nextppos = ppos + pattern.pat(ppos) as usize;
                return MinRepeatOneResult::new(nextppos, ppos + 3, max_count, ptr, marks)
                    .find_first_result(ctx, pattern)
                    .map(MatchResult::MinRepeatOne);
            }

            // <POSSESSIVE_REPEAT_ONE> <skip> <min> <max> item <SUCCESS> tail
            Opcode::PossessiveRepeatOne => {
                let min = pattern.pat(ppos + 1) as usize;
                let minptr = ctx.next_n(ptr, min, end).ok()?;
                ptr = find_repetition_end(ctx, pattern, ppos + 3, ptr, pattern.pat(ppos + 2), &marks);
                if ptr < minptr {
                    return None;
                }
                ppos += pattern.pat(ppos) as usize;
            }

            // <POSSESSIVE_REPEAT> <skip> <min> <max> item <SUCCESS> tail
            Opcode::PossessiveRepeat => {
                let min = pattern.pat(ppos + 1) as usize;
                let max = pattern.pat(ppos + 2);
                let unbounded = max == pattern.maxrepeat();
                let mut count = 0usize;
                while unbounded || count < max as usize {
                    if sre_match_any(ctx, pattern, ppos + 3, ptr, marks.clone()).is_none() {
                        break;
                    }
                    let before = ptr;
                    ptr = ctx.match_end();
                    marks = ctx.state().match_marks().clone();
                    count += 1;
                    if ptr == before && count >= min {
                        break;
                    }
                }
                if count < min {
                    return None;
                }
                ppos += pattern.pat(ppos) as usize;
            }

            // <ATOMIC_GROUP> <skip> pattern <SUCCESS> tail
            Opcode::AtomicGroup => {
                sre_match_any(ctx, pattern, ppos + 1, ptr, marks)?;
                ptr = ctx.match_end();
                marks = ctx.state().match_marks().clone();
                ppos += pattern.pat(ppos) as usize;
            }

            Opcode::Charset
            | Opcode::BigCharset
            | Opcode::Negate
            | Opcode::Range
            | Opcode::RangeUniIgnore
            | Opcode::Subpattern => {
                panic!("{:?} outside of a set at code index {}", op, ppos - 1)
            }
        }
    }
}

/// `sre_match` with the end-of-match mode relaxed to `Any`, for
/// sub-programs whose SUCCESS is not the end of the whole match.
pub fn sre_match_any<C: MatchContext>(
    ctx: &mut C,
    pattern: &CompiledPattern,
    ppos: usize,
    ptr: usize,
    marks: Marks,
) -> Option<MatchResult> {
    let saved = ctx.match_mode();
    ctx.state_mut().match_mode = MatchMode::Any;
    let result = sre_match(ctx, pattern, ppos, ptr, marks);
    ctx.state_mut().match_mode = saved;
    result
}

// === Single-character tests ===

fn literal_ok<C: MatchContext>(ctx: &C, op: Opcode, code: u32, ptr: usize) -> bool {
    match op {
        Opcode::Literal => ctx.str(ptr) == code,
        Opcode::LiteralIgnore => ctx.lowstr(ptr, CaseMode::Ascii) == code,
        Opcode::LiteralUniIgnore => ctx.lowstr(ptr, CaseMode::Unicode) == code,
        Opcode::LiteralLocIgnore => char_loc_ignore(code, ctx.str(ptr), ctx.locale()),
        Opcode::NotLiteral => ctx.str(ptr) != code,
        Opcode::NotLiteralIgnore => ctx.lowstr(ptr, CaseMode::Ascii) != code,
        Opcode::NotLiteralUniIgnore => ctx.lowstr(ptr, CaseMode::Unicode) != code,
        Opcode::NotLiteralLocIgnore => !char_loc_ignore(code, ctx.str(ptr), ctx.locale()),
        _ => unreachable!(),
    }
}

/// `ppos` is the skip word of the IN instruction.
fn in_set<C: MatchContext>(ctx: &C, pattern: &CompiledPattern, op: Opcode, ppos: usize, ptr: usize) -> bool {
    let set = ppos + 1;
    match op {
        Opcode::In => check_charset(pattern, set, ctx.str(ptr), ctx.locale()),
        Opcode::InIgnore => check_charset(pattern, set, ctx.lowstr(ptr, CaseMode::Ascii), ctx.locale()),
        Opcode::InUniIgnore => {
            check_charset(pattern, set, ctx.lowstr(ptr, CaseMode::Unicode), ctx.locale())
        }
        Opcode::InLocIgnore => check_charset_loc_ignore(pattern, set, ctx.str(ptr), ctx.locale()),
        _ => unreachable!(),
    }
}

/// Test the single-character instruction at `ppos` against the character
/// at `ptr` (which must be below the window end).
///
/// Returns `None` when the instruction is not a single-character one.
pub fn char_ok<C: MatchContext>(ctx: &C, pattern: &CompiledPattern, ptr: usize, ppos: usize) -> Option<bool> {
    let op = pattern.op(ppos);
    let ok = match op {
        Opcode::Any => !charclass::is_linebreak(ctx.str(ptr)),
        Opcode::AnyAll => true,
        Opcode::In | Opcode::InIgnore | Opcode::InUniIgnore | Opcode::InLocIgnore => {
            in_set(ctx, pattern, op, ppos + 1, ptr)
        }
        Opcode::Literal
        | Opcode::LiteralIgnore
        | Opcode::LiteralUniIgnore
        | Opcode::LiteralLocIgnore
        | Opcode::NotLiteral
        | Opcode::NotLiteralIgnore
        | Opcode::NotLiteralUniIgnore
        | Opcode::NotLiteralLocIgnore => literal_ok(ctx, op, pattern.pat(ppos + 1), ptr),
        Opcode::Category => category_dispatch(pattern.pat(ppos + 1), ctx.str(ptr), ctx.locale()),
        _ => return None,
    };
    Some(ok)
}

/// Advance from `ptr` over at most `maxcount` repetitions of the
/// single-character item at `ppos`; returns the end of the run.
pub fn find_repetition_end<C: MatchContext>(
    ctx: &mut C,
    pattern: &CompiledPattern,
    ppos: usize,
    mut ptr: usize,
    maxcount: u32,
    marks: &Marks,
) -> usize {
    let mut end = ctx.end();
    if maxcount != pattern.maxrepeat() {
        if let Ok(limit) = ctx.next_n(ptr, maxcount as usize, end) {
            end = limit;
        }
    }
    if ptr >= end {
        return ptr;
    }
    if pattern.op(ppos) == Opcode::AnyAll {
        return end;
    }
    if char_ok(ctx, pattern, ptr, ppos).is_some() {
        while ptr < end && char_ok(ctx, pattern, ptr, ppos) == Some(true) {
            ptr = ctx.next(ptr);
        }
        return ptr;
    }
    while ptr < end && sre_match_any(ctx, pattern, ppos, ptr, marks.clone()).is_some() {
        ptr = ctx.next(ptr);
    }
    ptr
}

// === Backreferences ===

/// Span of capture group `group` (0-based) if both of its marks are set.
fn group_span(marks: &Marks, group: u32) -> Option<(usize, usize)> {
    let gid = group as usize * 2;
    let start = marks::get_mark(marks, gid)?;
    let stop = marks::get_mark(marks, gid + 1)?;
    (stop >= start).then_some((start, stop))
}

fn match_repeated<C: MatchContext>(ctx: &C, ptr: usize, start: usize, stop: usize) -> Option<usize> {
    let length = ctx.bytes_difference(stop, start);
    if ctx.bytes_difference(ctx.end(), ptr) < length {
        return None;
    }
    for i in 0..length {
        if ctx.get_single_byte(ptr, i) != ctx.get_single_byte(start, i) {
            return None;
        }
    }
    Some(ctx.go_forward_by_bytes(ptr, length))
}

fn match_repeated_ignore<C: MatchContext>(
    ctx: &C,
    mut ptr: usize,
    mut start: usize,
    stop: usize,
    mode: CaseMode,
) -> Option<usize> {
    let end = ctx.end();
    while start < stop {
        if ptr >= end || ctx.lowstr(ptr, mode) != ctx.lowstr(start, mode) {
            return None;
        }
        ptr = ctx.next(ptr);
        start = ctx.next(start);
    }
    Some(ptr)
}

// === AT ===

/// Evaluate a zero-width position assertion.
pub fn at<C: MatchContext>(ctx: &C, ptr: usize, code: u32) -> bool {
    let Ok(at) = AtCode::try_from(code) else {
        panic!("unknown AT code {}", code);
    };
    let end = ctx.end();
    let newline = '\n' as u32;
    match at {
        AtCode::Beginning | AtCode::BeginningString => ptr == 0,
        AtCode::BeginningLine => match ctx.prev(ptr) {
            Ok(p) => ctx.str(p) == newline,
            Err(_) => true,
        },
        AtCode::End => ptr == end || (ctx.str(ptr) == newline && ctx.next(ptr) == end),
        AtCode::EndLine => ptr == end || ctx.str(ptr) == newline,
        AtCode::EndString => ptr == end,
        AtCode::Boundary
        | AtCode::LocBoundary
        | AtCode::UniBoundary => end != 0 && word_before(ctx, at, ptr) != word_at(ctx, at, ptr),
        AtCode::NonBoundary
        | AtCode::LocNonBoundary
        | AtCode::UniNonBoundary => end != 0 && word_before(ctx, at, ptr) == word_at(ctx, at, ptr),
    }
}

fn word_before<C: MatchContext>(ctx: &C, at: AtCode, ptr: usize) -> bool {
    ctx.prev(ptr)
        .map_or(false, |p| is_boundary_word(at, ctx.str(p), ctx.locale()))
}

fn word_at<C: MatchContext>(ctx: &C, at: AtCode, ptr: usize) -> bool {
    ptr < ctx.end() && is_boundary_word(at, ctx.str(ptr), ctx.locale())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ChCode, SreFlag};
    use crate::emit::Emitter;
    use crate::encodings::{ByteContext, Utf8Context};

    fn compile(build: impl FnOnce(&mut Emitter)) -> CompiledPattern {
        let mut e = Emitter::new();
        build(&mut e);
        e.op(Opcode::Success);
        let groups = e.groups();
        CompiledPattern::new(e.into_code(), SreFlag::empty(), groups).unwrap()
    }

    fn run(pattern: &CompiledPattern, text: &str) -> Option<usize> {
        let mut ctx = ByteContext::new(text.as_bytes(), 0, text.len());
        sre_match(&mut ctx, pattern, 0, 0, None).map(|_| ctx.match_end())
    }

    #[test]
    fn literals_and_any() {
        let p = compile(|e| {
            e.literal('a' as u32);
            e.op(Opcode::Any);
            e.literal('c' as u32);
        });
        assert_eq!(run(&p, "abcd"), Some(3));
        assert_eq!(run(&p, "a\nc"), None);
        assert_eq!(run(&p, "ab"), None);
    }

    #[test]
    fn greedy_run_gives_back() {
        // a*ab
        let p = compile(|e| {
            e.repeat_one(0, None, |e| e.literal('a' as u32));
            e.literal('a' as u32);
            e.literal('b' as u32);
        });
        assert_eq!(run(&p, "aaab"), Some(4));
        assert_eq!(run(&p, "b"), None);
    }

    #[test]
    fn lazy_run_extends() {
        // a*?b
        let p = compile(|e| {
            e.min_repeat_one(0, None, |e| e.literal('a' as u32));
            e.literal('b' as u32);
        });
        assert_eq!(run(&p, "aab"), Some(3));
        assert_eq!(run(&p, "aac"), None);
    }

    #[test]
    fn bounded_repeat_one() {
        // a{2,3}
        let p = compile(|e| e.repeat_one(2, Some(3), |e| e.literal('a' as u32)));
        assert_eq!(run(&p, "a"), None);
        assert_eq!(run(&p, "aa"), Some(2));
        assert_eq!(run(&p, "aaaaa"), Some(3));
    }

    #[test]
    fn general_repeat_with_tail() {
        // (?:ab)*ab
        let p = compile(|e| {
            e.repeat(0, None, true, |e| {
                e.literal('a' as u32);
                e.literal('b' as u32);
            });
            e.literal('a' as u32);
            e.literal('b' as u32);
        });
        assert_eq!(run(&p, "ababab"), Some(6));
        assert_eq!(run(&p, "ab"), Some(2));
        assert_eq!(run(&p, "a"), None);
    }

    #[test]
    fn lazy_general_repeat() {
        // (?:ab)*?ab
        let p = compile(|e| {
            e.repeat(0, None, false, |e| {
                e.literal('a' as u32);
                e.literal('b' as u32);
            });
            e.literal('a' as u32);
            e.literal('b' as u32);
        });
        assert_eq!(run(&p, "ababab"), Some(2));
    }

    #[test]
    fn empty_iterations_terminate() {
        // (a?)*y and (a?)+y
        for min in [0, 1] {
            let p = compile(|e| {
                e.repeat(min, None, true, |e| {
                    e.group(1, |e| e.repeat_one(0, Some(1), |e| e.literal('a' as u32)));
                });
                e.literal('y' as u32);
            });
            assert_eq!(run(&p, "aay"), Some(3));
            assert_eq!(run(&p, "y"), Some(1));
            assert_eq!(run(&p, "aax"), None);
        }
    }

    #[test]
    fn lazy_empty_iterations_terminate() {
        // (a?)*?y
        let p = compile(|e| {
            e.repeat(0, None, false, |e| {
                e.group(1, |e| e.repeat_one(0, Some(1), |e| e.literal('a' as u32)));
            });
            e.literal('y' as u32);
        });
        assert_eq!(run(&p, "aay"), Some(3));
        assert_eq!(run(&p, "aax"), None);
        assert_eq!(run(&p, "ax"), None);
    }

    #[test]
    fn lazy_loop_over_greedy_star_fails_cleanly() {
        // (?:a*)*?b
        let p = compile(|e| {
            e.repeat(0, None, false, |e| e.repeat_one(0, None, |e| e.literal('a' as u32)));
            e.literal('b' as u32);
        });
        assert_eq!(run(&p, "aab"), Some(3));
        assert_eq!(run(&p, "aac"), None);
        assert_eq!(run(&p, "c"), None);
    }

    #[test]
    fn assertions() {
        // a(?=b) and a(?!b)
        let ahead = compile(|e| {
            e.literal('a' as u32);
            e.assert(false, 0, |e| e.literal('b' as u32));
        });
        assert_eq!(run(&ahead, "ab"), Some(1));
        assert_eq!(run(&ahead, "ac"), None);

        let not_ahead = compile(|e| {
            e.literal('a' as u32);
            e.assert(true, 0, |e| e.literal('b' as u32));
        });
        assert_eq!(run(&not_ahead, "ab"), None);
        assert_eq!(run(&not_ahead, "ac"), Some(1));

        // (?<=a)b starting at position 1
        let behind = compile(|e| {
            e.assert(false, 1, |e| e.literal('a' as u32));
            e.literal('b' as u32);
        });
        let mut ctx = ByteContext::new(b"ab", 0, 2);
        assert!(sre_match(&mut ctx, &behind, 0, 1, None).is_some());
        assert!(sre_match(&mut ctx, &behind, 0, 0, None).is_none());
    }

    #[test]
    fn atomic_group_does_not_backtrack() {
        // (?>a*)a never matches; (?>a*)b does
        let p = compile(|e| {
            e.atomic(|e| e.repeat_one(0, None, |e| e.literal('a' as u32)));
            e.literal('a' as u32);
        });
        assert_eq!(run(&p, "aaa"), None);
        let p = compile(|e| {
            e.atomic(|e| e.repeat_one(0, None, |e| e.literal('a' as u32)));
            e.literal('b' as u32);
        });
        assert_eq!(run(&p, "aab"), Some(3));
    }

    #[test]
    fn possessive_repeats() {
        // a*+a and (?:ab)*+ab never match
        let p = compile(|e| {
            e.possessive_repeat_one(0, None, |e| e.literal('a' as u32));
            e.literal('a' as u32);
        });
        assert_eq!(run(&p, "aaa"), None);
        let p = compile(|e| {
            e.possessive_repeat(0, None, |e| {
                e.literal('a' as u32);
                e.literal('b' as u32);
            });
            e.literal('c' as u32);
        });
        assert_eq!(run(&p, "ababc"), Some(5));
    }

    #[test]
    fn backreference_and_conditional() {
        // (a|b)\1
        let p = compile(|e| {
            e.group(1, |e| {
                e.branch(|b| {
                    b.alt(|e| e.literal('a' as u32));
                    b.alt(|e| e.literal('b' as u32));
                });
            });
            e.groupref(1);
        });
        assert_eq!(run(&p, "bb"), Some(2));
        assert_eq!(run(&p, "ba"), None);

        // (a)?(?(1)b|c)
        let p = compile(|e| {
            e.repeat(0, Some(1), true, |e| e.group(1, |e| e.literal('a' as u32)));
            e.groupref_exists(1, |e| e.literal('b' as u32), |e| e.literal('c' as u32));
        });
        assert_eq!(run(&p, "ab"), Some(2));
        assert_eq!(run(&p, "c"), Some(1));
        assert_eq!(run(&p, "ac"), None);
    }

    #[test]
    fn at_codes() {
        let ctx = ByteContext::new(b"ab\ncd\n", 0, 6);
        assert!(at(&ctx, 0, AtCode::Beginning as u32));
        assert!(!at(&ctx, 3, AtCode::Beginning as u32));
        assert!(at(&ctx, 3, AtCode::BeginningLine as u32));
        assert!(at(&ctx, 5, AtCode::End as u32));
        assert!(!at(&ctx, 2, AtCode::End as u32));
        assert!(at(&ctx, 2, AtCode::EndLine as u32));
        assert!(at(&ctx, 0, AtCode::Boundary as u32));
        assert!(at(&ctx, 2, AtCode::Boundary as u32));
        assert!(at(&ctx, 1, AtCode::NonBoundary as u32));

        let empty = ByteContext::new(b"", 0, 0);
        assert!(!at(&empty, 0, AtCode::Boundary as u32));
        assert!(!at(&empty, 0, AtCode::NonBoundary as u32));

        let text = "\u{e9}t\u{e9}";
        let uni = Utf8Context::new(text, 0, text.len());
        assert!(!at(&uni, 2, AtCode::UniBoundary as u32));
        assert!(at(&uni, 2, AtCode::Boundary as u32));
    }

    #[test]
    fn category_repeat() {
        // \d+
        let p = compile(|e| e.repeat_one(1, None, |e| e.category(ChCode::Digit as u32)));
        assert_eq!(run(&p, "2024-01"), Some(4));
        assert_eq!(run(&p, "x1"), None);
    }

    #[test]
    fn full_and_non_empty_modes() {
        let p = compile(|e| e.repeat_one(0, None, |e| e.literal('a' as u32)));
        let mut ctx = ByteContext::new(b"aab", 0, 3);
        ctx.state_mut().match_mode = MatchMode::Full;
        assert!(sre_match(&mut ctx, &p, 0, 0, None).is_none());

        let mut ctx = ByteContext::new(b"b", 0, 1);
        ctx.state_mut().match_mode = MatchMode::NonEmpty;
        assert!(sre_match(&mut ctx, &p, 0, 0, None).is_none());
        ctx.state_mut().match_mode = MatchMode::Any;
        assert!(sre_match(&mut ctx, &p, 0, 0, None).is_some());
    }
}
