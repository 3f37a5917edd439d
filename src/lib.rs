//! # sremat
//!
//! Backtracking matcher for compiled SRE bytecode, the program format
//! produced by Python's `sre_compile`. The engine never recurses on the
//! native stack: every backtracking point is a heap-allocated continuation
//! that can be asked for its next result.
//!
//! Subjects may be byte strings, 16- or 32-bit code-unit arrays, or UTF-8
//! text; all of them share one interpreter through the [`MatchContext`]
//! trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use sremat::prelude::*;
//!
//! // (\d+)-(\d+)
//! let mut e = Emitter::new();
//! e.group(1, |e| e.repeat_one(1, None, |e| e.category(ChCode::Digit as u32)));
//! e.literal('-' as u32);
//! e.group(2, |e| e.repeat_one(1, None, |e| e.category(ChCode::Digit as u32)));
//! e.op(Opcode::Success);
//! let pattern = e.into_pattern(SreFlag::empty()).unwrap();
//!
//! let m = pattern.search("pages 12-40", 0).unwrap();
//! assert_eq!(m.span(0).unwrap(), Some((6, 11)));
//! assert_eq!(m.group(2).unwrap(), Some("40"));
//! ```
//!
//! Programs coming from an actual `sre_compile` run are loaded with
//! [`CompiledPattern::builder`]:
//!
//! ```rust
//! use sremat::prelude::*;
//!
//! // CPython 2.7 numbering: LITERAL 'a', LITERAL 'b', SUCCESS
//! let pattern = CompiledPattern::builder([19, 97, 19, 98, 1])
//!     .numbering(Numbering::Legacy)
//!     .build()
//!     .unwrap();
//! assert!(pattern.search(b"xxab".as_slice(), 0).is_some());
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Opcode numbering tables, AT / CATEGORY codes, flags |
//! | [`pattern`] | `CompiledPattern` and its builder |
//! | [`charclass`] | Character predicates, case folding, set membership |
//! | [`unicode`] | Unicode database lookups |
//! | [`context`] | `MatchContext` trait and per-attempt state |
//! | [`encodings`] | Byte, code-unit and UTF-8 contexts |
//! | [`marks`] | Persistent capture mark lists |
//! | [`result`] | Backtracking continuations |
//! | [`interp`] | The opcode interpreter |
//! | [`search`] | Anchored match and search drivers |
//! | [`api`] | `match_at` / `search` / `find_iter` / `split` / `sub` |
//! | [`emit`] | Programmatic bytecode construction |

pub mod api;
pub mod charclass;
pub mod constants;
pub mod context;
pub mod emit;
pub mod encodings;
pub mod error;
pub mod interp;
pub mod marks;
pub mod pattern;
pub mod prelude;
pub mod result;
pub mod search;
pub mod unicode;

pub use context::MatchContext;
