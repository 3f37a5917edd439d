// emit.rs - Programmatic construction of modern-numbering SRE programs.
//
// This is not a regex compiler: callers describe the program structure
// directly and the emitter takes care of skip offsets, repeat bounds, group
// mark numbering and the INFO prefix tables.

use crate::constants::{AtCode, Opcode, SreFlag, SreInfo};
use crate::error::MatchError;
use crate::pattern::CompiledPattern;

const MAXREPEAT: u32 = u32::MAX;

/// Writes a 32-bit program word by word.
///
/// # Examples
///
/// ```
/// use sremat::api::Match;
/// use sremat::emit::Emitter;
/// use sremat::constants::{Opcode, SreFlag};
///
/// // (a|b)+c
/// let mut e = Emitter::new();
/// e.repeat(1, None, true, |e| {
///     e.group(1, |e| {
///         e.branch(|alts| {
///             alts.alt(|e| e.literal('a' as u32));
///             alts.alt(|e| e.literal('b' as u32));
///         });
///     });
/// });
/// e.literal('c' as u32);
/// e.op(Opcode::Success);
/// let pattern = e.into_pattern(SreFlag::empty()).unwrap();
///
/// let m = pattern.search("xxabac", 0).unwrap();
/// assert_eq!(m.span_of(0), Some((2, 6)));
/// assert_eq!(m.span_of(1), Some((4, 5)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    code: Vec<u32>,
    groups: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Highest group number seen by [`Emitter::group`].
    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn into_code(self) -> Vec<u32> {
        self.code
    }

    /// Finish into a pattern that declares every emitted group.
    pub fn into_pattern(self, flags: SreFlag) -> Result<CompiledPattern, MatchError> {
        let groups = self.groups;
        CompiledPattern::new(self.code, flags, groups)
    }

    pub fn op(&mut self, op: Opcode) {
        self.code.push(op as u32);
    }

    pub fn word(&mut self, w: u32) {
        self.code.push(w);
    }

    fn hole(&mut self) -> usize {
        self.code.push(0);
        self.code.len() - 1
    }

    /// Point the skip word at `hole` to the current end.
    fn patch(&mut self, hole: usize) {
        self.code[hole] = (self.code.len() - hole) as u32;
    }

    // === Single characters ===

    pub fn literal(&mut self, c: u32) {
        self.literal_op(Opcode::Literal, c);
    }

    /// Any LITERAL / NOT_LITERAL variant.
    pub fn literal_op(&mut self, op: Opcode, c: u32) {
        self.op(op);
        self.word(c);
    }

    /// A LITERAL per character of `s`.
    pub fn literal_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.literal(ch as u32);
        }
    }

    pub fn category(&mut self, code: u32) {
        self.op(Opcode::Category);
        self.word(code);
    }

    pub fn at(&mut self, code: AtCode) {
        self.op(Opcode::At);
        self.word(code as u32);
    }

    /// `<IN*> <skip> members FAILURE`; `op` picks the folding flavor.
    pub fn set(&mut self, op: Opcode, members: impl FnOnce(&mut Emitter)) {
        self.op(op);
        let skip = self.hole();
        members(self);
        self.op(Opcode::Failure);
        self.patch(skip);
    }

    // === Set members ===

    pub fn range(&mut self, lo: u32, hi: u32) {
        self.op(Opcode::Range);
        self.word(lo);
        self.word(hi);
    }

    pub fn range_uni_ignore(&mut self, lo: u32, hi: u32) {
        self.op(Opcode::RangeUniIgnore);
        self.word(lo);
        self.word(hi);
    }

    /// CHARSET bitmap of the members below 256; others are dropped.
    pub fn charset_bitmap(&mut self, members: &[u32]) {
        self.op(Opcode::Charset);
        self.code.extend(bitmap(members.iter().copied().filter(|&c| c < 256)));
    }

    /// BIGCHARSET of the members below U+10000; others are dropped.
    pub fn bigcharset(&mut self, members: &[u32]) {
        let mut blocks: Vec<[u32; 8]> = Vec::new();
        let mut index = [0u8; 256];
        for (hi, slot) in index.iter_mut().enumerate() {
            let block = bitmap(
                members
                    .iter()
                    .filter(|&&c| c < 0x10000 && (c >> 8) as usize == hi)
                    .map(|&c| c & 0xff),
            );
            let pos = match blocks.iter().position(|b| *b == block) {
                Some(pos) => pos,
                None => {
                    blocks.push(block);
                    blocks.len() - 1
                }
            };
            *slot = pos as u8;
        }
        self.op(Opcode::BigCharset);
        self.word(blocks.len() as u32);
        for chunk in index.chunks(4) {
            self.word(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        for block in &blocks {
            self.code.extend_from_slice(block);
        }
    }

    // === Groups ===

    pub fn mark(&mut self, gid: u32) {
        self.op(Opcode::Mark);
        self.word(gid);
    }

    /// Capture group `group` (1-based) around `body`.
    pub fn group(&mut self, group: usize, body: impl FnOnce(&mut Emitter)) {
        assert!(group >= 1, "group numbers start at 1");
        self.groups = self.groups.max(group);
        let gid = (group as u32 - 1) * 2;
        self.mark(gid);
        body(self);
        self.mark(gid + 1);
    }

    /// Backreference to `group` (1-based).
    pub fn groupref(&mut self, group: usize) {
        self.groupref_op(Opcode::GroupRef, group);
    }

    /// Any GROUPREF variant.
    pub fn groupref_op(&mut self, op: Opcode, group: usize) {
        assert!(group >= 1, "group numbers start at 1");
        self.op(op);
        self.word(group as u32 - 1);
    }

    /// `(?(group)yes|no)`.
    pub fn groupref_exists(
        &mut self,
        group: usize,
        yes: impl FnOnce(&mut Emitter),
        no: impl FnOnce(&mut Emitter),
    ) {
        assert!(group >= 1, "group numbers start at 1");
        self.op(Opcode::GroupRefExists);
        self.word(group as u32 - 1);
        let skip_yes = self.hole();
        yes(self);
        self.op(Opcode::Jump);
        let skip_no = self.hole();
        // measured from the group word
        self.code[skip_yes] = (self.code.len() - skip_yes + 1) as u32;
        no(self);
        self.patch(skip_no);
    }

    // === Control flow ===

    /// `<BRANCH>` with the alternatives added through [`Alternatives::alt`].
    pub fn branch(&mut self, build: impl FnOnce(&mut Alternatives<'_>)) {
        self.op(Opcode::Branch);
        let mut alts = Alternatives {
            emitter: self,
            jumps: Vec::new(),
        };
        build(&mut alts);
        let jumps = alts.jumps;
        self.word(0);
        for jump in jumps {
            self.patch(jump);
        }
    }

    /// General repeat of `body`; `max == None` is unbounded.
    pub fn repeat(&mut self, min: u32, max: Option<u32>, greedy: bool, body: impl FnOnce(&mut Emitter)) {
        self.op(Opcode::Repeat);
        let skip = self.hole();
        self.word(min);
        self.word(max.unwrap_or(MAXREPEAT));
        body(self);
        self.patch(skip);
        self.op(if greedy { Opcode::MaxUntil } else { Opcode::MinUntil });
    }

    /// Greedy repeat of a single-character `item`.
    pub fn repeat_one(&mut self, min: u32, max: Option<u32>, item: impl FnOnce(&mut Emitter)) {
        self.single_repeat(Opcode::RepeatOne, min, max, item);
    }

    /// Lazy repeat of a single-character `item`.
    pub fn min_repeat_one(&mut self, min: u32, max: Option<u32>, item: impl FnOnce(&mut Emitter)) {
        self.single_repeat(Opcode::MinRepeatOne, min, max, item);
    }

    pub fn possessive_repeat_one(&mut self, min: u32, max: Option<u32>, item: impl FnOnce(&mut Emitter)) {
        self.single_repeat(Opcode::PossessiveRepeatOne, min, max, item);
    }

    pub fn possessive_repeat(&mut self, min: u32, max: Option<u32>, body: impl FnOnce(&mut Emitter)) {
        self.single_repeat(Opcode::PossessiveRepeat, min, max, body);
    }

    fn single_repeat(&mut self, op: Opcode, min: u32, max: Option<u32>, item: impl FnOnce(&mut Emitter)) {
        self.op(op);
        let skip = self.hole();
        self.word(min);
        self.word(max.unwrap_or(MAXREPEAT));
        item(self);
        self.op(Opcode::Success);
        self.patch(skip);
    }

    /// Lookahead (`back == 0`) or fixed-width lookbehind over `back`
    /// characters.
    pub fn assert(&mut self, negate: bool, back: u32, body: impl FnOnce(&mut Emitter)) {
        self.op(if negate { Opcode::AssertNot } else { Opcode::Assert });
        let skip = self.hole();
        self.word(back);
        body(self);
        self.op(Opcode::Success);
        self.patch(skip);
    }

    pub fn atomic(&mut self, body: impl FnOnce(&mut Emitter)) {
        self.op(Opcode::AtomicGroup);
        let skip = self.hole();
        body(self);
        self.op(Opcode::Success);
        self.patch(skip);
    }

    // === INFO blocks ===

    /// INFO with only the width bounds.
    pub fn info(&mut self, min: u32, max: Option<u32>) {
        let skip = self.info_head(SreInfo::empty(), min, max);
        self.patch(skip);
    }

    /// INFO announcing that every match starts with `prefix`. The first
    /// `prefix_skip` characters of the prefix are also the program's first
    /// LITERAL instructions; `literal` marks a program that is nothing but
    /// the prefix.
    pub fn info_prefix(&mut self, min: u32, max: Option<u32>, prefix: &[u32], prefix_skip: u32, literal: bool) {
        let mut flags = SreInfo::PREFIX;
        if literal {
            flags |= SreInfo::LITERAL;
        }
        let skip = self.info_head(flags, min, max);
        self.word(prefix.len() as u32);
        self.word(prefix_skip);
        self.code.extend_from_slice(prefix);
        self.code.extend(overlap_table(prefix));
        self.patch(skip);
    }

    /// INFO with the set of possible first characters.
    pub fn info_charset(&mut self, min: u32, max: Option<u32>, members: impl FnOnce(&mut Emitter)) {
        let skip = self.info_head(SreInfo::CHARSET, min, max);
        members(self);
        self.op(Opcode::Failure);
        self.patch(skip);
    }

    fn info_head(&mut self, flags: SreInfo, min: u32, max: Option<u32>) -> usize {
        self.op(Opcode::Info);
        let skip = self.hole();
        self.word(flags.bits());
        self.word(min);
        self.word(max.unwrap_or(0));
        skip
    }
}

/// Alternatives of a BRANCH under construction.
pub struct Alternatives<'e> {
    emitter: &'e mut Emitter,
    jumps: Vec<usize>,
}

impl Alternatives<'_> {
    pub fn alt(&mut self, body: impl FnOnce(&mut Emitter)) {
        let e = &mut *self.emitter;
        let skip = e.hole();
        body(e);
        e.op(Opcode::Jump);
        self.jumps.push(e.hole());
        e.patch(skip);
    }
}

fn bitmap(members: impl Iterator<Item = u32>) -> [u32; 8] {
    let mut words = [0u32; 8];
    for c in members {
        words[(c / 32) as usize] |= 1 << (c % 32);
    }
    words
}

/// KMP failure table: entry `i` is the length of the longest proper prefix
/// of `prefix[..=i]` that is also its suffix.
pub fn overlap_table(prefix: &[u32]) -> Vec<u32> {
    let mut table = vec![0u32; prefix.len()];
    for i in 1..prefix.len() {
        let mut idx = table[i - 1] as usize;
        loop {
            if prefix[i] == prefix[idx] {
                table[i] = idx as u32 + 1;
                break;
            }
            if idx == 0 {
                break;
            }
            idx = table[idx - 1] as usize;
        }
    }
    table
}
