// error.rs - Error type for the recoverable API-level conditions.
//
// Ordinary mismatches are `None`, running off either end of the text is the
// local `OutOfString` marker, and malformed bytecode panics. What remains is
// collected here.

use std::fmt;

/// Error type for pattern construction and match inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A group index beyond the number of groups the pattern declares.
    NoSuchGroup(usize),
    /// A byte buffer handed to the UTF-8 context is not valid UTF-8.
    InvalidUtf8 { valid_up_to: usize },
    /// A program with no code words.
    EmptyProgram,
    /// A 16-bit program carrying a word that does not fit in 16 bits.
    CodeWordTooWide { index: usize, value: u32 },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NoSuchGroup(g) => write!(f, "no such group: {}", g),
            MatchError::InvalidUtf8 { valid_up_to } => {
                write!(f, "invalid utf-8 after byte {}", valid_up_to)
            }
            MatchError::EmptyProgram => write!(f, "empty program"),
            MatchError::CodeWordTooWide { index, value } => write!(
                f,
                "code word {} at index {} does not fit in 16 bits",
                value, index
            ),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<std::str::Utf8Error> for MatchError {
    fn from(err: std::str::Utf8Error) -> Self {
        MatchError::InvalidUtf8 {
            valid_up_to: err.valid_up_to(),
        }
    }
}
