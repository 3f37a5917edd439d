// prelude.rs - Convenient re-exports for the public API.
//
//! # Prelude
//!
//! ```
//! use sremat::prelude::*;
//!
//! let mut e = Emitter::new();
//! e.literal_str("42");
//! e.op(Opcode::Success);
//! let pattern = e.into_pattern(SreFlag::empty()).unwrap();
//! let m = pattern.search("answer: 42", 0).unwrap();
//! assert_eq!(m.group(0).unwrap(), Some("42"));
//! ```

pub use crate::api::{Captures, FindIter, Match};
pub use crate::charclass::{Locale, C_LOCALE};
pub use crate::constants::{AtCode, ChCode, CodeSize, Numbering, Opcode, SreFlag};
pub use crate::context::{MatchContext, MatchMode};
pub use crate::emit::Emitter;
pub use crate::encodings::{ByteContext, Subject, UnitContext, Utf8Context};
pub use crate::error::MatchError;
pub use crate::pattern::{CompiledPattern, PatternBuilder};
pub use crate::search::Strategy;
