// constants.rs - SRE opcode numbering, AT/category codes and flag words.
//
// Two bytecode numberings exist: the CPython 2.7 one (`Legacy`) and the
// CPython 3.11+ one (`Modern`). Both are decoded into the single internal
// `Opcode` enum through a table built once per pattern, so the interpreter
// never branches on the numbering.

use bitflags::bitflags;
use num_enum::TryFromPrimitive;

// === Internal opcode set ===

/// Every instruction the interpreter knows. Discriminants follow the modern
/// numbering, which makes decoding a modern program a plain `try_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
pub enum Opcode {
    Failure = 0,
    Success = 1,
    Any = 2,
    AnyAll = 3,
    Assert = 4,
    AssertNot = 5,
    At = 6,
    Branch = 7,
    Category = 8,
    Charset = 9,
    BigCharset = 10,
    GroupRef = 11,
    GroupRefExists = 12,
    In = 13,
    Info = 14,
    Jump = 15,
    Literal = 16,
    Mark = 17,
    MaxUntil = 18,
    MinUntil = 19,
    NotLiteral = 20,
    Negate = 21,
    Range = 22,
    Repeat = 23,
    RepeatOne = 24,
    Subpattern = 25,
    MinRepeatOne = 26,
    AtomicGroup = 27,
    PossessiveRepeat = 28,
    PossessiveRepeatOne = 29,
    GroupRefIgnore = 30,
    InIgnore = 31,
    LiteralIgnore = 32,
    NotLiteralIgnore = 33,
    GroupRefLocIgnore = 34,
    InLocIgnore = 35,
    LiteralLocIgnore = 36,
    NotLiteralLocIgnore = 37,
    GroupRefUniIgnore = 38,
    InUniIgnore = 39,
    LiteralUniIgnore = 40,
    NotLiteralUniIgnore = 41,
    RangeUniIgnore = 42,
}

/// The CPython 2.7 numbering. Case-insensitive opcodes carry no folding
/// mode of their own; the pattern flags pick it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
enum LegacyOpcode {
    Failure = 0,
    Success = 1,
    Any = 2,
    AnyAll = 3,
    Assert = 4,
    AssertNot = 5,
    At = 6,
    Branch = 7,
    Call = 8,
    Category = 9,
    Charset = 10,
    BigCharset = 11,
    GroupRef = 12,
    GroupRefExists = 13,
    GroupRefIgnore = 14,
    In = 15,
    InIgnore = 16,
    Info = 17,
    Jump = 18,
    Literal = 19,
    LiteralIgnore = 20,
    Mark = 21,
    MaxUntil = 22,
    MinUntil = 23,
    NotLiteral = 24,
    NotLiteralIgnore = 25,
    Negate = 26,
    Range = 27,
    Repeat = 28,
    RepeatOne = 29,
    Subpattern = 30,
    MinRepeatOne = 31,
}

/// Size of the per-pattern decode table; both numberings stay below it.
pub const OPCODE_TABLE_SIZE: usize = 64;

pub type DecodeTable = [Option<Opcode>; OPCODE_TABLE_SIZE];

/// Which bytecode numbering a program was compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    /// CPython 2.7: `*_IGNORE` opcodes fold according to the pattern flags.
    Legacy,
    /// CPython 3.11+: separate ASCII / locale / Unicode folding opcodes.
    #[default]
    Modern,
}

impl Numbering {
    /// Build the raw-word to `Opcode` table for a program with `flags`.
    pub fn decode_table(self, flags: SreFlag) -> DecodeTable {
        let mut table: DecodeTable = [None; OPCODE_TABLE_SIZE];
        for (raw, slot) in table.iter_mut().enumerate() {
            *slot = match self {
                Numbering::Modern => Opcode::try_from(raw as u32).ok(),
                Numbering::Legacy => LegacyOpcode::try_from(raw as u32)
                    .ok()
                    .and_then(|op| legacy_to_internal(op, CaseMode::from_flags(flags))),
            };
        }
        table
    }
}

fn legacy_to_internal(op: LegacyOpcode, mode: CaseMode) -> Option<Opcode> {
    let op = match op {
        LegacyOpcode::Failure => Opcode::Failure,
        LegacyOpcode::Success => Opcode::Success,
        LegacyOpcode::Any => Opcode::Any,
        LegacyOpcode::AnyAll => Opcode::AnyAll,
        LegacyOpcode::Assert => Opcode::Assert,
        LegacyOpcode::AssertNot => Opcode::AssertNot,
        LegacyOpcode::At => Opcode::At,
        LegacyOpcode::Branch => Opcode::Branch,
        // never emitted by any released compiler
        LegacyOpcode::Call => return None,
        LegacyOpcode::Category => Opcode::Category,
        LegacyOpcode::Charset => Opcode::Charset,
        LegacyOpcode::BigCharset => Opcode::BigCharset,
        LegacyOpcode::GroupRef => Opcode::GroupRef,
        LegacyOpcode::GroupRefExists => Opcode::GroupRefExists,
        LegacyOpcode::In => Opcode::In,
        LegacyOpcode::Info => Opcode::Info,
        LegacyOpcode::Jump => Opcode::Jump,
        LegacyOpcode::Literal => Opcode::Literal,
        LegacyOpcode::Mark => Opcode::Mark,
        LegacyOpcode::MaxUntil => Opcode::MaxUntil,
        LegacyOpcode::MinUntil => Opcode::MinUntil,
        LegacyOpcode::NotLiteral => Opcode::NotLiteral,
        LegacyOpcode::Negate => Opcode::Negate,
        LegacyOpcode::Range => Opcode::Range,
        LegacyOpcode::Repeat => Opcode::Repeat,
        LegacyOpcode::RepeatOne => Opcode::RepeatOne,
        LegacyOpcode::Subpattern => Opcode::Subpattern,
        LegacyOpcode::MinRepeatOne => Opcode::MinRepeatOne,
        LegacyOpcode::GroupRefIgnore => match mode {
            CaseMode::Ascii => Opcode::GroupRefIgnore,
            CaseMode::Locale => Opcode::GroupRefLocIgnore,
            CaseMode::Unicode => Opcode::GroupRefUniIgnore,
        },
        LegacyOpcode::InIgnore => match mode {
            CaseMode::Ascii => Opcode::InIgnore,
            CaseMode::Locale => Opcode::InLocIgnore,
            CaseMode::Unicode => Opcode::InUniIgnore,
        },
        LegacyOpcode::LiteralIgnore => match mode {
            CaseMode::Ascii => Opcode::LiteralIgnore,
            CaseMode::Locale => Opcode::LiteralLocIgnore,
            CaseMode::Unicode => Opcode::LiteralUniIgnore,
        },
        LegacyOpcode::NotLiteralIgnore => match mode {
            CaseMode::Ascii => Opcode::NotLiteralIgnore,
            CaseMode::Locale => Opcode::NotLiteralLocIgnore,
            CaseMode::Unicode => Opcode::NotLiteralUniIgnore,
        },
    };
    Some(op)
}

// === Case folding modes ===

/// Which character tables a case-insensitive operation consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Ascii,
    Locale,
    Unicode,
}

impl CaseMode {
    /// Folding mode implied by pattern flags (legacy programs only).
    pub fn from_flags(flags: SreFlag) -> CaseMode {
        if flags.contains(SreFlag::LOCALE) {
            CaseMode::Locale
        } else if flags.contains(SreFlag::UNICODE) {
            CaseMode::Unicode
        } else {
            CaseMode::Ascii
        }
    }
}

// === AT codes ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum AtCode {
    Beginning = 0,
    BeginningLine = 1,
    BeginningString = 2,
    Boundary = 3,
    NonBoundary = 4,
    End = 5,
    EndLine = 6,
    EndString = 7,
    LocBoundary = 8,
    LocNonBoundary = 9,
    UniBoundary = 10,
    UniNonBoundary = 11,
}

// === Category codes ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum ChCode {
    Digit = 0,
    NotDigit = 1,
    Space = 2,
    NotSpace = 3,
    Word = 4,
    NotWord = 5,
    Linebreak = 6,
    NotLinebreak = 7,
    LocWord = 8,
    LocNotWord = 9,
    UniDigit = 10,
    UniNotDigit = 11,
    UniSpace = 12,
    UniNotSpace = 13,
    UniWord = 14,
    UniNotWord = 15,
    UniLinebreak = 16,
    UniNotLinebreak = 17,
}

/// Category operand bit marking a Unicode general-category test.
pub const CATEGORY_GENERAL: u32 = 0x8000;
/// Inverts a general-category test.
pub const CATEGORY_GENERAL_NEGATE: u32 = 0x4000;

/// Pack a general-category test (`"L"`, `"Lu"`, ...) into a category operand.
///
/// Returns `None` unless `name` is one or two ASCII letters.
pub fn general_category_code(name: &str, negate: bool) -> Option<u32> {
    let bytes = name.as_bytes();
    let (major, minor) = match bytes {
        [a] if a.is_ascii_alphabetic() => (*a, 0),
        [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => (*a, *b),
        _ => return None,
    };
    let mut code = CATEGORY_GENERAL | ((major as u32) << 7) | minor as u32;
    if negate {
        code |= CATEGORY_GENERAL_NEGATE;
    }
    Some(code)
}

// === Flags ===

bitflags! {
    /// Pattern flags as stored next to the program.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SreFlag: u16 {
        const TEMPLATE = 1;
        const IGNORECASE = 2;
        const LOCALE = 4;
        const MULTILINE = 8;
        const DOTALL = 16;
        const UNICODE = 32;
        const VERBOSE = 64;
        const DEBUG = 128;
        const ASCII = 256;
    }
}

bitflags! {
    /// Flags word of a leading INFO block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SreInfo: u32 {
        const PREFIX = 1;
        const LITERAL = 2;
        const CHARSET = 4;
    }
}

// === Code word width ===

/// Width of one code word as produced by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeSize {
    U16,
    #[default]
    U32,
}

impl CodeSize {
    /// The "unbounded" repeat count for this width.
    pub const fn maxrepeat(self) -> u32 {
        match self {
            CodeSize::U16 => u16::MAX as u32,
            CodeSize::U32 => u32::MAX,
        }
    }

    /// Bits stored per code word.
    pub const fn bits(self) -> u32 {
        match self {
            CodeSize::U16 => 16,
            CodeSize::U32 => 32,
        }
    }

    /// Words needed for a 256-bit bitmap.
    pub const fn bitmap_words(self) -> usize {
        256 / self.bits() as usize
    }

    /// Words holding the 256 one-byte block indices of a BIGCHARSET.
    pub const fn block_index_words(self) -> usize {
        256 / (self.bits() as usize / 8)
    }
}
