//! keysmith: key-format inference and specialized hash synthesis.
//!
//! This crate provides:
//! - Byte classification and range envelopes for fixed-width keys
//! - Format inference: sample corpus to literal/range pattern descriptor
//! - A parser for the compact pattern language
//! - Offset and mask planning over machine-word read windows
//! - Source-text synthesis of specialized hash-function families
//! - Runtime callables and a family registry for benchmarking harnesses
//!
//! The pipeline is a pure, single-pass transformation: sample keys flow
//! into a [`FormatDescriptor`], the descriptor into read/mask plans, and
//! the plans into emitted function bodies and runtime callables.

pub mod classify;
pub mod exec;
pub mod infer;
pub mod mix;
pub mod pattern;
pub mod range;
pub mod registry;
pub mod synth;

// Re-exports for convenience
pub use classify::{CharClass, ClassSet};
pub use exec::{fnv1a, HashFn};
pub use infer::{
    FormatDescriptor, FormatInferencer, InferConfig, InferError, LengthPolicy, MergePolicy,
};
pub use pattern::{parse_pattern, PatternError};
pub use range::{ByteEnvelope, Range};
pub use registry::HashRegistry;
pub use synth::{Family, HashSynthesizer, MaskPlan, OffsetPlan, SynthError};
