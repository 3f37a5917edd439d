// search.rs - Entry points: anchored match and the search drivers.
//
// A search tries successive start positions. When the program begins with
// an INFO block the driver can skip positions that cannot start a match:
// a known literal prefix (KMP scan over the inline overlap table), a known
// first character, or a known first-character set.

use log::trace;

use crate::charclass::check_charset;
use crate::constants::{AtCode, Opcode, SreInfo};
use crate::context::MatchContext;
use crate::interp::sre_match;
use crate::pattern::CompiledPattern;

// INFO block offsets, relative to the INFO opcode.
const INFO_SKIP: usize = 1;
const INFO_FLAGS: usize = 2;
const INFO_MIN: usize = 3;
const INFO_PREFIX_LEN: usize = 5;
const INFO_PREFIX_SKIP: usize = 6;
const INFO_PREFIX: usize = 7;
const INFO_CHARSET: usize = 5;

/// How a search picks its candidate start positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Decide from the program's INFO block and first instruction.
    #[default]
    Auto,
    /// KMP scan for the INFO literal prefix.
    Prefix,
    /// Jump between occurrences of the leading LITERAL.
    Literal,
    /// Test each position against the INFO charset first.
    Charset,
    /// Try every position.
    Regular,
}

/// Try the program anchored at the context's match start.
pub fn match_context<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern) -> bool {
    let start = prepare(ctx, pattern);
    sre_match(ctx, pattern, 0, start, None).is_some()
}

/// Find the leftmost match at or after the context's match start.
pub fn search_context<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern) -> bool {
    search_with(ctx, pattern, Strategy::Auto)
}

/// Like [`search_context`] with a forced strategy. A strategy the program
/// carries no data for degrades to [`Strategy::Regular`].
pub fn search_with<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern, strategy: Strategy) -> bool {
    let start = prepare(ctx, pattern);
    let info = Info::read(pattern);
    if let Some(info) = &info {
        if ctx.maximum_distance(start, ctx.end()) < info.min {
            trace!("search: window from {} shorter than {}", start, info.min);
            return false;
        }
    }
    let base = info.as_ref().map_or(0, |i| i.body);

    if pattern.op(base) == Opcode::At {
        let code = pattern.pat(base + 1);
        if code == AtCode::Beginning as u32 || code == AtCode::BeginningString as u32 {
            trace!("search: anchored at beginning, single attempt at {}", start);
            return start == 0 && sre_match(ctx, pattern, base, start, None).is_some();
        }
    }

    let has_prefix = info.as_ref().map_or(false, |i| i.flags.contains(SreInfo::PREFIX) && i.prefix_len(pattern) > 1);
    let has_charset = info.as_ref().map_or(false, |i| {
        !i.flags.contains(SreInfo::PREFIX) && i.flags.contains(SreInfo::CHARSET)
    });
    let has_literal = pattern.op(base) == Opcode::Literal;

    let chosen = match strategy {
        Strategy::Auto if has_prefix => Strategy::Prefix,
        Strategy::Auto if has_literal => Strategy::Literal,
        Strategy::Auto if has_charset => Strategy::Charset,
        Strategy::Auto => Strategy::Regular,
        Strategy::Prefix if has_prefix => Strategy::Prefix,
        Strategy::Literal if has_literal => Strategy::Literal,
        Strategy::Charset if has_charset => Strategy::Charset,
        _ => Strategy::Regular,
    };
    trace!("search: {:?} from {} to {}", chosen, start, ctx.end());

    match chosen {
        Strategy::Prefix => fast_search(ctx, pattern),
        Strategy::Literal => literal_search(ctx, pattern, base),
        Strategy::Charset => charset_search(ctx, pattern, base),
        _ => regular_search(ctx, pattern, base),
    }
}

fn prepare<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern) -> usize {
    let start = ctx.match_start();
    let state = ctx.state_mut();
    state.groups = pattern.groups();
    state.reset(start);
    start
}

/// The parts of a leading INFO block the drivers use.
struct Info {
    flags: SreInfo,
    min: usize,
    /// First instruction after the block.
    body: usize,
}

impl Info {
    fn read(pattern: &CompiledPattern) -> Option<Info> {
        if pattern.op(0) != Opcode::Info {
            return None;
        }
        Some(Info {
            flags: SreInfo::from_bits_truncate(pattern.pat(INFO_FLAGS)),
            min: pattern.pat(INFO_MIN) as usize,
            body: INFO_SKIP + pattern.pat(INFO_SKIP) as usize,
        })
    }

    fn prefix_len(&self, pattern: &CompiledPattern) -> usize {
        pattern.pat(INFO_PREFIX_LEN) as usize
    }
}

/// Try every start position up to and including the window end.
pub fn regular_search<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern, base: usize) -> bool {
    let end = ctx.end();
    let mut start = ctx.match_start();
    loop {
        ctx.reset(start);
        if sre_match(ctx, pattern, base, start, None).is_some() {
            return true;
        }
        if start >= end {
            return false;
        }
        start = ctx.next(start);
    }
}

/// The instruction at `base` is a LITERAL: only its occurrences can start
/// a match.
pub fn literal_search<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern, base: usize) -> bool {
    let c = pattern.pat(base + 1);
    let mut from = ctx.match_start();
    while let Some(start) = ctx.find_literal(from, c) {
        ctx.reset(start);
        let ptr = ctx.next(start);
        if sre_match(ctx, pattern, base + 2, ptr, None).is_some() {
            return true;
        }
        from = ptr;
    }
    false
}

/// The INFO block carries the set of possible first characters.
pub fn charset_search<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern, base: usize) -> bool {
    let end = ctx.end();
    let mut start = ctx.match_start();
    while start < end {
        if check_charset(pattern, INFO_CHARSET, ctx.str(start), ctx.locale()) {
            ctx.reset(start);
            if sre_match(ctx, pattern, base, start, None).is_some() {
                return true;
            }
        }
        start = ctx.next(start);
    }
    false
}

/// Every match begins with the INFO literal prefix; find its occurrences
/// with a KMP scan and run the rest of the program behind each one.
pub fn fast_search<C: MatchContext>(ctx: &mut C, pattern: &CompiledPattern) -> bool {
    let end = ctx.end();
    let mut pos = ctx.match_start();
    if pos >= end {
        return false;
    }
    let prefix_len = pattern.pat(INFO_PREFIX_LEN) as usize;
    let prefix_skip = pattern.pat(INFO_PREFIX_SKIP) as usize;
    // overlap[i - 1] for `i` characters matched
    let overlap = INFO_PREFIX + prefix_len - 1;
    let flags = SreInfo::from_bits_truncate(pattern.pat(INFO_FLAGS));
    let body = INFO_SKIP + pattern.pat(INFO_SKIP) as usize + 2 * prefix_skip;

    let mut i = 0usize;
    loop {
        if ctx.str(pos) != pattern.pat(INFO_PREFIX + i) {
            if i > 0 {
                i = pattern.pat(overlap + i) as usize;
                continue;
            }
        } else {
            i += 1;
            if i == prefix_len {
                let Ok(start) = ctx.prev_n(pos, prefix_len - 1, 0) else {
                    unreachable!("prefix scanned forward from the search start");
                };
                ctx.reset(start);
                if flags.contains(SreInfo::LITERAL) {
                    let stop = ctx.next(pos);
                    ctx.state_mut().set_match(stop, None);
                    return true;
                }
                let Ok(ptr) = ctx.next_n(start, prefix_skip, end) else {
                    unreachable!("prefix_skip exceeds the scanned prefix");
                };
                if sre_match(ctx, pattern, body, ptr, None).is_some() {
                    return true;
                }
                i = pattern.pat(overlap + i) as usize;
            }
        }
        pos = ctx.next(pos);
        if pos >= end {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SreFlag;
    use crate::emit::Emitter;
    use crate::encodings::{ByteContext, Utf8Context};

    fn chars(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    fn span<C: MatchContext>(ctx: &C) -> (usize, usize) {
        (ctx.match_start(), ctx.match_end())
    }

    // "abcabd" with a full INFO prefix
    fn prefix_program(literal: bool) -> CompiledPattern {
        let mut e = Emitter::new();
        e.info_prefix(6, Some(6), &chars("abcabd"), 6, literal);
        e.literal_str("abcabd");
        e.op(Opcode::Success);
        e.into_pattern(SreFlag::empty()).unwrap()
    }

    #[test]
    fn match_is_anchored() {
        let mut e = Emitter::new();
        e.literal_str("ab");
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let mut ctx = ByteContext::new(b"xab", 0, 3);
        assert!(!match_context(&mut ctx, &p));
        let mut ctx = ByteContext::new(b"xab", 1, 3);
        assert!(match_context(&mut ctx, &p));
        assert_eq!(span(&ctx), (1, 3));
    }

    #[test]
    fn kmp_prefix_scan() {
        let text = "abcabcabd!";
        for literal in [false, true] {
            let p = prefix_program(literal);
            let mut ctx = Utf8Context::new(text, 0, text.len());
            assert!(search_context(&mut ctx, &p));
            assert_eq!(span(&ctx), (3, 9));
        }
        let p = prefix_program(true);
        let mut ctx = Utf8Context::new("abcabcab", 0, 8);
        assert!(!search_context(&mut ctx, &p));
    }

    #[test]
    fn prefix_with_partial_skip() {
        // INFO prefix "ab" of the program ab\d; only "a" is skipped
        let mut e = Emitter::new();
        e.info_prefix(3, Some(3), &chars("ab"), 1, false);
        e.literal('a' as u32);
        e.literal('b' as u32);
        e.category(crate::constants::ChCode::Digit as u32);
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let mut ctx = ByteContext::new(b"abxab7", 0, 6);
        assert!(search_context(&mut ctx, &p));
        assert_eq!(span(&ctx), (3, 6));
    }

    #[test]
    fn strategies_agree() {
        let mut e = Emitter::new();
        e.info_charset(2, None, |e| e.range('0' as u32, '9' as u32));
        e.set(Opcode::In, |e| e.range('0' as u32, '9' as u32));
        e.literal('x' as u32);
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let text = b"ab1y22x3x";
        for strategy in [Strategy::Auto, Strategy::Charset, Strategy::Regular, Strategy::Prefix] {
            let mut ctx = ByteContext::new(text, 0, text.len());
            assert!(search_with(&mut ctx, &p, strategy), "{:?}", strategy);
            assert_eq!(span(&ctx), (5, 7), "{:?}", strategy);
        }
    }

    #[test]
    fn literal_search_jumps() {
        let mut e = Emitter::new();
        e.literal('q' as u32);
        e.repeat_one(1, None, |e| e.literal('u' as u32));
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let mut ctx = ByteContext::new(b"qaquux", 0, 6);
        assert!(search_with(&mut ctx, &p, Strategy::Literal));
        assert_eq!(span(&ctx), (2, 5));
    }

    #[test]
    fn empty_match_at_window_end() {
        let mut e = Emitter::new();
        e.at(AtCode::EndString);
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let mut ctx = ByteContext::new(b"abc", 0, 3);
        assert!(search_context(&mut ctx, &p));
        assert_eq!(span(&ctx), (3, 3));
    }

    #[test]
    fn anchored_program_stops_after_first_position() {
        let mut e = Emitter::new();
        e.at(AtCode::Beginning);
        e.literal('a' as u32);
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let mut ctx = ByteContext::new(b"ba", 0, 2);
        assert!(!search_context(&mut ctx, &p));
        let mut ctx = ByteContext::new(b"ab", 0, 2);
        assert!(search_context(&mut ctx, &p));
        let mut ctx = ByteContext::new(b"ba", 1, 2);
        assert!(!search_context(&mut ctx, &p));
    }

    #[test]
    fn info_min_rejects_short_windows() {
        let mut e = Emitter::new();
        e.info(3, None);
        e.repeat_one(3, None, |e| e.op(Opcode::AnyAll));
        e.op(Opcode::Success);
        let p = e.into_pattern(SreFlag::empty()).unwrap();
        let mut ctx = ByteContext::new(b"ab", 0, 2);
        assert!(!search_context(&mut ctx, &p));
        let mut ctx = ByteContext::new(b"abc", 0, 3);
        assert!(search_context(&mut ctx, &p));
    }
}
