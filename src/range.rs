//! Key template ranges.
//!
//! A [`Range`] is one contiguous span of key positions sharing a single
//! observed byte envelope: the bounds, the byte offset where the span
//! begins, the run length, and a derived 8-bit mask of the bits that vary
//! somewhere inside the envelope. A range whose bounds coincide denotes a
//! literal (constant) byte of the template.

use crate::classify::ClassSet;

/// Minimum and maximum byte observed at one key position.
///
/// Starts out pinned to the first sample's byte and only ever widens as
/// more samples are scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteEnvelope {
    pub start: u8,
    pub end: u8,
}

impl ByteEnvelope {
    pub fn new(byte: u8) -> ByteEnvelope {
        ByteEnvelope { start: byte, end: byte }
    }

    /// Widen the envelope to include `byte`.
    pub fn widen(&mut self, byte: u8) {
        self.start = self.start.min(byte);
        self.end = self.end.max(byte);
    }

    pub fn is_constant(&self) -> bool {
        self.start == self.end
    }

    pub fn class_set(&self) -> ClassSet {
        ClassSet::of_envelope(self.start, self.end)
    }
}

/// Compute the 8-bit mask of bits that differ somewhere in `[start, end]`.
///
/// `any` accumulates every bit that is one for at least one byte in the
/// range, `all` every bit that is one for all of them. Bits that are always
/// zero (`!any`) or always one (`all`) are constant across the range; the
/// mask is the complement of those.
pub fn derive_mask(start: u8, end: u8) -> u8 {
    debug_assert!(start <= end);
    let mut any = 0u8;
    let mut all = 0xFFu8;
    for byte in start..=end {
        any |= byte;
        all &= byte;
    }
    !(!any | all)
}

/// One contiguous span of the key template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    /// Smallest byte of the envelope.
    pub start: u8,
    /// Largest byte of the envelope.
    pub end: u8,
    /// Byte position in the key where the run begins.
    pub offset: usize,
    /// Run length: consecutive positions sharing this envelope.
    pub repetition: usize,
    /// Cached bit mask for the envelope; never changes after construction.
    pub mask: u8,
}

impl Range {
    pub fn new(start: u8, end: u8, offset: usize, repetition: usize) -> Range {
        Range {
            start,
            end,
            offset,
            repetition,
            mask: derive_mask(start, end),
        }
    }

    /// A range with coinciding bounds is a literal byte, not a variable
    /// field.
    pub fn is_literal(&self) -> bool {
        self.start == self.end
    }

    /// The cached mask, or `0x7F` (the low seven ASCII bits) when it is
    /// zero. Bit-compression call sites need a non-trivial mask: a zero
    /// mask would make the range contribute nothing to the hash.
    pub fn mask_or_default(&self) -> u8 {
        if self.mask == 0 {
            0x7F
        } else {
            self.mask
        }
    }

    /// Byte position one past the end of the run.
    pub fn end_offset(&self) -> usize {
        self.offset + self.repetition
    }

    /// Whether `next` begins exactly where this run ends.
    pub fn is_contiguous_with(&self, next: &Range) -> bool {
        next.offset == self.end_offset()
    }
}
