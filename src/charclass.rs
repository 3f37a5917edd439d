// charclass.rs - Character classification, case folding and the charset
// evaluator used by IN / CHARSET / CATEGORY instructions.
//
// Three flavors of every predicate exist: ASCII (no flag), locale (the
// injected `Locale`) and Unicode (`crate::unicode`).

use std::fmt;

use crate::constants::{
    AtCode, CaseMode, ChCode, Opcode, CATEGORY_GENERAL, CATEGORY_GENERAL_NEGATE,
};
use crate::pattern::CompiledPattern;
use crate::unicode;

// === Locale ===

/// Character tables for the locale-dependent opcodes.
///
/// Only code points below 256 are ever locale-sensitive; implementations
/// should leave everything above unchanged.
pub trait Locale: Send + Sync + fmt::Debug {
    fn is_alnum(&self, c: u32) -> bool;
    fn to_lower(&self, c: u32) -> u32;
    fn to_upper(&self, c: u32) -> u32;
}

/// The "C" locale: ASCII behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct CLocale;

impl Locale for CLocale {
    fn is_alnum(&self, c: u32) -> bool {
        u8::try_from(c).map_or(false, |b| b.is_ascii_alphanumeric())
    }

    fn to_lower(&self, c: u32) -> u32 {
        lower_ascii(c)
    }

    fn to_upper(&self, c: u32) -> u32 {
        upper_ascii(c)
    }
}

pub static C_LOCALE: CLocale = CLocale;

// === ASCII predicates ===

#[inline]
fn ascii(c: u32) -> Option<u8> {
    if c < 128 {
        Some(c as u8)
    } else {
        None
    }
}

pub fn is_digit(c: u32) -> bool {
    ascii(c).map_or(false, |b| b.is_ascii_digit())
}

pub fn is_space(c: u32) -> bool {
    matches!(ascii(c), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
}

pub fn is_word(c: u32) -> bool {
    ascii(c).map_or(false, |b| b == b'_' || b.is_ascii_alphanumeric())
}

pub fn is_linebreak(c: u32) -> bool {
    c == '\n' as u32
}

pub fn is_loc_word(c: u32, locale: &dyn Locale) -> bool {
    c == '_' as u32 || (c < 256 && locale.is_alnum(c))
}

#[inline]
pub fn lower_ascii(c: u32) -> u32 {
    ascii(c).map_or(c, |b| b.to_ascii_lowercase() as u32)
}

#[inline]
pub fn upper_ascii(c: u32) -> u32 {
    ascii(c).map_or(c, |b| b.to_ascii_uppercase() as u32)
}

/// Lowercase `c` with the tables selected by `mode`.
pub fn to_lower(c: u32, mode: CaseMode, locale: &dyn Locale) -> u32 {
    match mode {
        CaseMode::Ascii => lower_ascii(c),
        CaseMode::Locale if c < 256 => locale.to_lower(c),
        CaseMode::Locale => c,
        CaseMode::Unicode => unicode::to_lower(c),
    }
}

/// Uppercase `c` with the tables selected by `mode`.
pub fn to_upper(c: u32, mode: CaseMode, locale: &dyn Locale) -> u32 {
    match mode {
        CaseMode::Ascii => upper_ascii(c),
        CaseMode::Locale if c < 256 => locale.to_upper(c),
        CaseMode::Locale => c,
        CaseMode::Unicode => unicode::to_upper(c),
    }
}

/// `LITERAL_LOC_IGNORE`: the operand may equal the character or either of
/// its locale case forms.
pub fn char_loc_ignore(code: u32, c: u32, locale: &dyn Locale) -> bool {
    code == c
        || code == to_lower(c, CaseMode::Locale, locale)
        || code == to_upper(c, CaseMode::Locale, locale)
}

// === Categories ===

/// Evaluate a CATEGORY operand against `c`.
pub fn category_dispatch(code: u32, c: u32, locale: &dyn Locale) -> bool {
    if code & CATEGORY_GENERAL != 0 {
        let major = ((code >> 7) & 0x7f) as u8;
        let minor = (code & 0x7f) as u8;
        let hit = unicode::in_general_category(c, major, minor);
        return hit != (code & CATEGORY_GENERAL_NEGATE != 0);
    }
    let Ok(cat) = ChCode::try_from(code) else {
        panic!("unknown category code {}", code);
    };
    match cat {
        ChCode::Digit => is_digit(c),
        ChCode::NotDigit => !is_digit(c),
        ChCode::Space => is_space(c),
        ChCode::NotSpace => !is_space(c),
        ChCode::Word => is_word(c),
        ChCode::NotWord => !is_word(c),
        ChCode::Linebreak => is_linebreak(c),
        ChCode::NotLinebreak => !is_linebreak(c),
        ChCode::LocWord => is_loc_word(c, locale),
        ChCode::LocNotWord => !is_loc_word(c, locale),
        ChCode::UniDigit => unicode::is_digit(c),
        ChCode::UniNotDigit => !unicode::is_digit(c),
        ChCode::UniSpace => unicode::is_space(c),
        ChCode::UniNotSpace => !unicode::is_space(c),
        ChCode::UniWord => unicode::is_word(c),
        ChCode::UniNotWord => !unicode::is_word(c),
        ChCode::UniLinebreak => unicode::is_linebreak(c),
        ChCode::UniNotLinebreak => !unicode::is_linebreak(c),
    }
}

/// Word predicate matching the flavor of a boundary AT code.
pub fn is_boundary_word(at: AtCode, c: u32, locale: &dyn Locale) -> bool {
    match at {
        AtCode::LocBoundary | AtCode::LocNonBoundary => is_loc_word(c, locale),
        AtCode::UniBoundary | AtCode::UniNonBoundary => unicode::is_word(c),
        _ => is_word(c),
    }
}

// === Charset evaluator ===

/// Test `c` against the set starting at `ppos` and ending with FAILURE.
///
/// Members are OR-ed; each NEGATE inverts the final answer.
pub fn check_charset(pattern: &CompiledPattern, mut ppos: usize, c: u32, locale: &dyn Locale) -> bool {
    let size = pattern.code_size();
    let bits = size.bits();
    let bitmap_words = size.bitmap_words();
    let mut ok = true;
    loop {
        match pattern.op(ppos) {
            Opcode::Failure => return !ok,
            Opcode::Literal => {
                if c == pattern.pat(ppos + 1) {
                    return ok;
                }
                ppos += 2;
            }
            Opcode::Category => {
                if category_dispatch(pattern.pat(ppos + 1), c, locale) {
                    return ok;
                }
                ppos += 2;
            }
            Opcode::Charset => {
                if c < 256 && bitmap_test(pattern, ppos + 1, c, bits) {
                    return ok;
                }
                ppos += 1 + bitmap_words;
            }
            Opcode::Range => {
                if pattern.pat(ppos + 1) <= c && c <= pattern.pat(ppos + 2) {
                    return ok;
                }
                ppos += 3;
            }
            Opcode::RangeUniIgnore => {
                let (lo, hi) = (pattern.pat(ppos + 1), pattern.pat(ppos + 2));
                if lo <= c && c <= hi {
                    return ok;
                }
                let up = unicode::to_upper(c);
                if lo <= up && up <= hi {
                    return ok;
                }
                ppos += 3;
            }
            Opcode::Negate => {
                ok = !ok;
                ppos += 1;
            }
            Opcode::BigCharset => {
                let count = pattern.pat(ppos + 1) as usize;
                let index_base = ppos + 2;
                let blocks_base = index_base + size.block_index_words();
                if c < 0x10000 {
                    let per_word = bits / 8;
                    let hi = c >> 8;
                    let word = pattern.pat(index_base + (hi / per_word) as usize);
                    let block = ((word >> ((hi % per_word) * 8)) & 0xff) as usize;
                    if bitmap_test(pattern, blocks_base + block * bitmap_words, c & 0xff, bits) {
                        return ok;
                    }
                }
                ppos = blocks_base + count * bitmap_words;
            }
            other => panic!("unexpected {:?} in charset at code index {}", other, ppos),
        }
    }
}

#[inline]
fn bitmap_test(pattern: &CompiledPattern, base: usize, c: u32, bits: u32) -> bool {
    pattern.pat(base + (c / bits) as usize) & (1u32 << (c % bits)) != 0
}

/// `IN_LOC_IGNORE`: try the locale lowercase form, then the uppercase one.
pub fn check_charset_loc_ignore(
    pattern: &CompiledPattern,
    ppos: usize,
    c: u32,
    locale: &dyn Locale,
) -> bool {
    let lo = to_lower(c, CaseMode::Locale, locale);
    if check_charset(pattern, ppos, lo, locale) {
        return true;
    }
    let up = to_upper(c, CaseMode::Locale, locale);
    up != lo && check_charset(pattern, ppos, up, locale)
}
