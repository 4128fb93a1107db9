//! Hash synthesis pipeline.
//!
//! Turns a [`FormatDescriptor`](crate::infer::FormatDescriptor) into
//! specialized hash functions that read only the information-bearing bytes
//! of a key:
//!
//! ```text
//! FormatDescriptor ──► OffsetPlan ──┬──► HashSynthesizer ──► source text
//!                      MaskPlan  ───┘         │
//!                                             └─ exec::compile ──► callable
//! ```
//!
//! 1. **Offset planning** ([`offsets`]): the minimal set of word-sized read
//!    positions covering every variable range, with the final read clamped
//!    so nothing crosses the end of the key buffer.
//! 2. **Mask planning** ([`masks`]): one word-wide bitmask per read,
//!    marking the bits that vary across the corpus, re-aligned to match
//!    the tail clamp.
//! 3. **Generation** ([`generator`]): per-family source text built from
//!    the shared plans; the runtime equivalents live in
//!    [`exec`](crate::exec).

pub mod generator;
pub mod masks;
pub mod offsets;

pub use generator::{Family, HashSynthesizer};
pub use masks::{MaskPlan, MaskWindow};
pub use offsets::OffsetPlan;

use thiserror::Error;

/// Word size of the scalar (u64) hash families.
pub const SCALAR_WORD: usize = 8;
/// Word size of the wide-register (u128) hash family.
pub const WIDE_WORD: usize = 16;

/// Synthesis error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// The descriptor has no variable ranges; no specialized family
    /// applies and callers should fall back to a generic whole-key hash.
    #[error("no variable structure found in key format")]
    NoVariableStructure,
    /// The key is shorter than one machine word of the requested family.
    #[error("key length {length} is shorter than the {word}-byte word size")]
    KeyTooShort { length: usize, word: usize },
}
