//! Key format inference.
//!
//! Scans a corpus of equal-length sample keys and produces a
//! [`FormatDescriptor`]: the ordered sequence of literal bytes and variable
//! byte ranges that tile the key template. The first sample establishes the
//! template length; every later sample widens the per-position byte
//! envelopes; a final left-to-right walk merges adjacent positions into
//! printed ranges.
//!
//! # Example
//!
//! ```rust
//! use keysmith::infer::{FormatInferencer, InferConfig};
//!
//! let inferencer = FormatInferencer::new(InferConfig::default());
//! let descriptor = inferencer
//!     .infer_samples([b"123-45-6789".as_slice(), b"987-65-4321", b"000-00-0001"])
//!     .unwrap();
//! assert_eq!(descriptor.to_string(), "[0-9]{3}-[0-9]{2}-[0-9]{4}");
//! ```

use std::fmt;
use std::io::BufRead;

use thiserror::Error;
use tracing::warn;

use crate::classify::class_envelope;
use crate::pattern::is_reserved;
use crate::range::{ByteEnvelope, Range};

/// Inference error type.
#[derive(Error, Debug)]
pub enum InferError {
    #[error("no sample keys provided")]
    EmptyCorpus,
    #[error("line {line}: sample length {found} does not match template length {expected}")]
    LengthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("failed to read sample corpus: {0}")]
    Io(#[from] std::io::Error),
}

/// What to do when a sample's length differs from the template length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Abort, naming the offending line.
    #[default]
    Fail,
    /// Warn and ignore the sample.
    Skip,
    /// Warn and shrink the template to the minimum length ever observed.
    Truncate,
}

/// When to merge two adjacent key positions into one printed range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Merge when the envelopes cover the same character classes; the
    /// merged range stores the class-representative envelope.
    #[default]
    ByClass,
    /// Merge only byte-identical envelopes; the merged range stores the
    /// exact observed bytes.
    Exact,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InferConfig {
    pub length_policy: LengthPolicy,
    pub merge_policy: MergePolicy,
}

/// Ordered literal/range tiling of a key template.
///
/// Ranges are ordered by strictly increasing offset and cover
/// `[0, length)` exactly once, with literal bytes represented as
/// single-position ranges whose bounds coincide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub ranges: Vec<Range>,
    pub length: usize,
}

impl FormatDescriptor {
    pub fn new(ranges: Vec<Range>, length: usize) -> FormatDescriptor {
        FormatDescriptor { ranges, length }
    }

    /// The variable (non-literal) ranges, in offset order.
    pub fn variable_ranges(&self) -> impl Iterator<Item = &Range> {
        self.ranges.iter().filter(|r| !r.is_literal())
    }

    /// A descriptor with no variable ranges describes a fully-constant
    /// corpus; no specialized hash family applies to it.
    pub fn is_constant(&self) -> bool {
        self.variable_ranges().next().is_none()
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for range in &self.ranges {
            if range.is_literal() {
                for _ in 0..range.repetition {
                    if is_reserved(range.start) {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", range.start as char)?;
                }
            } else {
                write!(f, "[{}-{}]", range.start as char, range.end as char)?;
                if range.repetition > 1 {
                    write!(f, "{{{}}}", range.repetition)?;
                }
            }
        }
        Ok(())
    }
}

/// Running corpus scan: one envelope per key position.
struct Scan {
    envelopes: Vec<ByteEnvelope>,
}

impl Scan {
    fn begin(sample: &[u8]) -> Scan {
        Scan {
            envelopes: sample.iter().map(|&b| ByteEnvelope::new(b)).collect(),
        }
    }

    fn observe(
        &mut self,
        sample: &[u8],
        line: usize,
        policy: LengthPolicy,
    ) -> Result<(), InferError> {
        let expected = self.envelopes.len();
        if sample.len() != expected {
            match policy {
                LengthPolicy::Fail => {
                    return Err(InferError::LengthMismatch {
                        line,
                        expected,
                        found: sample.len(),
                    });
                }
                LengthPolicy::Skip => {
                    warn!(line, expected, found = sample.len(), "skipping sample with mismatched length");
                    return Ok(());
                }
                LengthPolicy::Truncate => {
                    warn!(line, expected, found = sample.len(), "truncating to shorter of template and sample");
                    if sample.len() < expected {
                        self.envelopes.truncate(sample.len());
                    }
                }
            }
        }
        // Under Truncate a longer sample only contributes its prefix.
        for (envelope, &byte) in self.envelopes.iter_mut().zip(sample) {
            envelope.widen(byte);
        }
        Ok(())
    }

    /// Merge consecutive positions into maximal runs.
    fn finish(self, policy: MergePolicy) -> FormatDescriptor {
        let envelopes = self.envelopes;
        let length = envelopes.len();
        let mut ranges = Vec::new();
        let mut i = 0;
        while i < length {
            let env = envelopes[i];
            if env.is_constant() {
                ranges.push(Range::new(env.start, env.end, i, 1));
                i += 1;
                continue;
            }
            let mut repetition = 1;
            let mut j = i + 1;
            while j < length && mergeable(env, envelopes[j], policy) {
                repetition += 1;
                j += 1;
            }
            let (start, end) = match policy {
                MergePolicy::ByClass => class_envelope(env.start, env.end),
                MergePolicy::Exact => (env.start, env.end),
            };
            ranges.push(Range::new(start, end, i, repetition));
            i = j;
        }
        FormatDescriptor::new(ranges, length)
    }
}

fn mergeable(run: ByteEnvelope, next: ByteEnvelope, policy: MergePolicy) -> bool {
    match policy {
        MergePolicy::ByClass => run.class_set() == next.class_set(),
        MergePolicy::Exact => run == next,
    }
}

/// Infers a [`FormatDescriptor`] from a sample corpus.
pub struct FormatInferencer {
    config: InferConfig,
}

impl FormatInferencer {
    pub fn new(config: InferConfig) -> FormatInferencer {
        FormatInferencer { config }
    }

    /// Scan newline-terminated samples from a byte stream, one key per
    /// line. The trailing newline is not part of the key.
    pub fn infer_reader<R: BufRead>(&self, reader: R) -> Result<FormatDescriptor, InferError> {
        let mut scan: Option<Scan> = None;
        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            match scan.as_mut() {
                None => scan = Some(Scan::begin(&line)),
                Some(s) => s.observe(&line, index + 1, self.config.length_policy)?,
            }
        }
        let scan = scan.ok_or(InferError::EmptyCorpus)?;
        Ok(scan.finish(self.config.merge_policy))
    }

    /// Scan an in-memory sequence of samples.
    pub fn infer_samples<'a, I>(&self, samples: I) -> Result<FormatDescriptor, InferError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut scan: Option<Scan> = None;
        for (index, sample) in samples.into_iter().enumerate() {
            match scan.as_mut() {
                None => scan = Some(Scan::begin(sample)),
                Some(s) => s.observe(sample, index + 1, self.config.length_policy)?,
            }
        }
        let scan = scan.ok_or(InferError::EmptyCorpus)?;
        Ok(scan.finish(self.config.merge_policy))
    }
}
