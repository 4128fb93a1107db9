//! Read-offset planning.
//!
//! Computes the minimal ordered set of word-sized read positions covering
//! every variable range of a descriptor. Contiguous ranges share reads,
//! literal gaps are jumped, and the final read is clamped backwards so it
//! never crosses the key's declared length.

use crate::infer::FormatDescriptor;
use crate::range::Range;
use crate::synth::SynthError;

/// Ordered word-sized read positions for one descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetPlan {
    /// Word size in bytes (8 or 16).
    pub word: usize,
    /// Strictly increasing read positions; every one satisfies
    /// `offset + word <= length`.
    pub offsets: Vec<usize>,
    /// Backward shift applied to the final offset by the tail clamp, in
    /// bytes. Zero when the naive tiling already fit.
    pub last_shift: usize,
}

impl OffsetPlan {
    /// Plan reads of `word` bytes covering every variable range.
    pub fn new(descriptor: &FormatDescriptor, word: usize) -> Result<OffsetPlan, SynthError> {
        let ranges: Vec<&Range> = descriptor.variable_ranges().collect();
        if ranges.is_empty() {
            return Err(SynthError::NoVariableStructure);
        }
        if descriptor.length < word {
            return Err(SynthError::KeyTooShort {
                length: descriptor.length,
                word,
            });
        }

        let mut offsets = Vec::new();
        let mut index = 0;
        let mut cursor = ranges[0].offset;
        while index < ranges.len() {
            offsets.push(cursor);
            cursor += word;
            if cursor >= ranges[index].end_offset() {
                // The active range is covered; skip every range the read
                // already swallowed, then jump over any literal gap.
                index += 1;
                while index < ranges.len() && cursor >= ranges[index].end_offset() {
                    index += 1;
                }
                if index < ranges.len() && ranges[index].offset > cursor {
                    cursor = ranges[index].offset;
                }
            }
        }

        // Tail clamp: pull the final read back so it ends exactly at the
        // key's last byte instead of overrunning the buffer.
        let mut last_shift = 0;
        if let Some(last) = offsets.last_mut() {
            if *last + word > descriptor.length {
                let clamped = descriptor.length - word;
                last_shift = *last - clamped;
                *last = clamped;
            }
        }

        Ok(OffsetPlan {
            word,
            offsets,
            last_shift,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;
    use crate::synth::{SCALAR_WORD, WIDE_WORD};

    fn plan(pattern: &str, word: usize) -> OffsetPlan {
        OffsetPlan::new(&parse_pattern(pattern).unwrap(), word).unwrap()
    }

    fn assert_no_overrun(plan: &OffsetPlan, length: usize) {
        let mut previous = None;
        for &offset in &plan.offsets {
            assert!(offset + plan.word <= length, "read at {offset} overruns");
            if let Some(previous) = previous {
                assert!(offset > previous, "offsets must strictly increase");
            }
            previous = Some(offset);
        }
    }

    #[test]
    fn test_ssn_plan_clamps_tail() {
        // 11-byte key: naive tiling reads at 0 and 8, but 8 + 8 > 11.
        let plan = plan("[0-9]{3}-[0-9]{2}-[0-9]{4}", SCALAR_WORD);
        assert_eq!(plan.offsets, vec![0, 3]);
        assert_eq!(plan.last_shift, 5);
        assert_no_overrun(&plan, 11);
    }

    #[test]
    fn test_exact_fit_needs_no_shift() {
        let plan = plan("[0-9]{16}", SCALAR_WORD);
        assert_eq!(plan.offsets, vec![0, 8]);
        assert_eq!(plan.last_shift, 0);
        assert_no_overrun(&plan, 16);
    }

    #[test]
    fn test_leading_literals_skipped() {
        // The first read starts at the first variable byte, not at zero.
        let plan = plan("id:[0-9]{8}", SCALAR_WORD);
        assert_eq!(plan.offsets, vec![3]);
        assert_eq!(plan.last_shift, 0);
    }

    #[test]
    fn test_wide_clamp_reports_shift() {
        // 20-byte key whose variable run begins at byte 8: the single
        // 16-byte read at 8 would overrun, so it is pulled back to 4.
        let plan = plan("basename[0-9]{12}", WIDE_WORD);
        assert_eq!(plan.word, 16);
        assert_eq!(plan.offsets, vec![4]);
        assert_eq!(plan.last_shift, 4);
        assert_no_overrun(&plan, 20);
    }

    #[test]
    fn test_large_literal_gap_jumps_cursor() {
        // Two digit runs separated by a 16-byte literal gap: the second
        // read starts at the second run, not in the middle of the gap.
        let literal_gap = "x".repeat(16);
        let pattern = format!("[0-9]{{4}}{literal_gap}[0-9]{{4}}");
        let plan = plan(&pattern, SCALAR_WORD);
        // The second read jumps to byte 20 and is then clamped to 16 so it
        // ends exactly at the 24-byte key boundary.
        assert_eq!(plan.offsets, vec![0, 16]);
        assert_eq!(plan.last_shift, 4);
        assert_no_overrun(&plan, 24);
    }

    #[test]
    fn test_small_gap_bridged_by_one_read() {
        // [0-9]{2}-[0-9]{2}: one 8-byte read covers both runs and the
        // literal between them.
        let plan = plan("[0-9]{2}-[0-9]{2}xyz", SCALAR_WORD);
        assert_eq!(plan.offsets, vec![0]);
        assert_eq!(plan.last_shift, 0);
    }

    #[test]
    fn test_constant_descriptor_rejected() {
        let descriptor = parse_pattern("HELLO").unwrap();
        assert_eq!(
            OffsetPlan::new(&descriptor, SCALAR_WORD).unwrap_err(),
            SynthError::NoVariableStructure
        );
    }

    #[test]
    fn test_short_key_rejected() {
        let descriptor = parse_pattern("[0-9]{6}").unwrap();
        assert_eq!(
            OffsetPlan::new(&descriptor, WIDE_WORD).unwrap_err(),
            SynthError::KeyTooShort { length: 6, word: 16 }
        );
    }

    #[test]
    fn test_no_overrun_across_word_sizes() {
        for pattern in [
            "[0-9]{3}-[0-9]{2}-[0-9]{4}[a-z]{9}",
            "[0-9]{17}",
            "ab[0-9]{20}cd[a-f]{6}",
            "[a-z]{30}",
        ] {
            let descriptor = parse_pattern(pattern).unwrap();
            for word in [SCALAR_WORD, WIDE_WORD] {
                let plan = OffsetPlan::new(&descriptor, word).unwrap();
                assert_no_overrun(&plan, descriptor.length);
            }
        }
    }
}
