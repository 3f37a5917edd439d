// pattern.rs - Compiled SRE programs and their builder.
//
// A `CompiledPattern` is immutable and cheap to clone; all per-attempt state
// lives in the match context. The opcode numbering is resolved once here so
// the interpreter only ever sees `Opcode`.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::constants::{CodeSize, DecodeTable, Numbering, Opcode, SreFlag};
use crate::error::MatchError;

/// An SRE bytecode program plus the metadata needed to run it.
#[derive(Clone)]
pub struct CompiledPattern {
    code: Arc<[u32]>,
    decode: Arc<DecodeTable>,
    flags: SreFlag,
    code_size: CodeSize,
    numbering: Numbering,
    groups: usize,
}

impl CompiledPattern {
    /// Start building a pattern from raw code words.
    pub fn builder(code: impl Into<Vec<u32>>) -> PatternBuilder {
        PatternBuilder::new(code)
    }

    /// Shorthand for a modern, 32-bit program.
    pub fn new(code: impl Into<Vec<u32>>, flags: SreFlag, groups: usize) -> Result<Self, MatchError> {
        PatternBuilder::new(code).flags(flags).groups(groups).build()
    }

    /// Raw code word at `index`.
    #[inline]
    pub fn pat(&self, index: usize) -> u32 {
        self.code[index]
    }

    /// Decoded opcode at `index`. Panics on a word that is not an opcode.
    #[inline]
    pub fn op(&self, index: usize) -> Opcode {
        let raw = self.code[index];
        match self.decode.get(raw as usize) {
            Some(Some(op)) => *op,
            _ => panic!("unknown opcode {} at code index {}", raw, index),
        }
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn code(&self) -> &[u32] {
        &self.code
    }

    pub fn flags(&self) -> SreFlag {
        self.flags
    }

    pub fn code_size(&self) -> CodeSize {
        self.code_size
    }

    pub fn numbering(&self) -> Numbering {
        self.numbering
    }

    /// Number of capture groups, not counting group 0.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// The repeat bound meaning "no upper limit".
    #[inline]
    pub fn maxrepeat(&self) -> u32 {
        self.code_size.maxrepeat()
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("len", &self.code.len())
            .field("flags", &self.flags)
            .field("code_size", &self.code_size)
            .field("numbering", &self.numbering)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

// === PatternBuilder ===

/// Builder for a [`CompiledPattern`] with non-default metadata.
///
/// # Examples
///
/// ```
/// use sremat::constants::{CodeSize, Numbering, SreFlag};
/// use sremat::pattern::CompiledPattern;
///
/// // LITERAL 'a', SUCCESS in the 2.7 numbering
/// let pattern = CompiledPattern::builder(vec![19, 97, 1])
///     .numbering(Numbering::Legacy)
///     .code_size(CodeSize::U16)
///     .flags(SreFlag::UNICODE)
///     .build()
///     .unwrap();
/// assert!(pattern.match_at("abc", 0).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    code: Vec<u32>,
    flags: SreFlag,
    code_size: CodeSize,
    numbering: Numbering,
    groups: usize,
}

impl PatternBuilder {
    pub fn new(code: impl Into<Vec<u32>>) -> Self {
        PatternBuilder {
            code: code.into(),
            flags: SreFlag::empty(),
            code_size: CodeSize::default(),
            numbering: Numbering::default(),
            groups: 0,
        }
    }

    /// Set the pattern flags (replaces any previous value).
    pub fn flags(mut self, flags: SreFlag) -> Self {
        self.flags = flags;
        self
    }

    /// Width of the code words as emitted by the compiler (default: 32 bits).
    pub fn code_size(mut self, code_size: CodeSize) -> Self {
        self.code_size = code_size;
        self
    }

    /// Opcode numbering of the program (default: modern).
    pub fn numbering(mut self, numbering: Numbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Number of capture groups the program declares.
    pub fn groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    pub fn build(self) -> Result<CompiledPattern, MatchError> {
        if self.code.is_empty() {
            return Err(MatchError::EmptyProgram);
        }
        if self.code_size == CodeSize::U16 {
            if let Some((index, &value)) = self
                .code
                .iter()
                .enumerate()
                .find(|&(_, &w)| w > u16::MAX as u32)
            {
                return Err(MatchError::CodeWordTooWide { index, value });
            }
        }
        let decode = self.numbering.decode_table(self.flags);
        debug!(
            "sre pattern: {} words, {:?}, {:?}, {} groups, flags {:?}",
            self.code.len(),
            self.numbering,
            self.code_size,
            self.groups,
            self.flags
        );
        Ok(CompiledPattern {
            code: self.code.into(),
            decode: Arc::new(decode),
            flags: self.flags,
            code_size: self.code_size,
            numbering: self.numbering,
            groups: self.groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_program() {
        let err = PatternBuilder::new(Vec::new()).build().unwrap_err();
        assert_eq!(err, MatchError::EmptyProgram);
    }

    #[test]
    fn rejects_wide_word_in_16_bit_program() {
        let err = PatternBuilder::new(vec![16, 0x1_0000, 1])
            .code_size(CodeSize::U16)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            MatchError::CodeWordTooWide {
                index: 1,
                value: 0x1_0000
            }
        );
    }

    #[test]
    fn decodes_through_numbering() {
        let modern = CompiledPattern::new(vec![16, 97, 1], SreFlag::empty(), 0).unwrap();
        assert_eq!(modern.op(0), Opcode::Literal);
        assert_eq!(modern.op(2), Opcode::Success);
        assert_eq!(modern.maxrepeat(), u32::MAX);

        let legacy = PatternBuilder::new(vec![20, 97, 1])
            .numbering(Numbering::Legacy)
            .code_size(CodeSize::U16)
            .build()
            .unwrap();
        assert_eq!(legacy.op(0), Opcode::LiteralIgnore);
        assert_eq!(legacy.maxrepeat(), 0xFFFF);
    }

    #[test]
    #[should_panic(expected = "unknown opcode")]
    fn unknown_opcode_panics() {
        let pattern = CompiledPattern::new(vec![63, 1], SreFlag::empty(), 0).unwrap();
        pattern.op(0);
    }

    #[test]
    fn pattern_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledPattern>();
    }
}
