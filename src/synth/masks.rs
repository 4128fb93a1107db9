//! Mask planning.
//!
//! Builds, for each planned read offset, the word-wide bitmask of bits
//! that vary across the corpus at that read. The whole key is first laid
//! out as one logical mask string (per-range masks repeated run-length
//! times, zero bytes over literals and gaps), then re-chunked into word
//! windows aligned with the offset plan. The final window is shifted to
//! match the plan's tail clamp so the same logical bits are selected at
//! the corrected read alignment. Windows with no live bits are dropped
//! along with their read.

use crate::infer::FormatDescriptor;
use crate::synth::{OffsetPlan, SCALAR_WORD};

/// One word-wide mask, attached to its (clamped) read offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskWindow {
    /// Read position this mask applies to.
    pub offset: usize,
    /// Little-endian mask over the 8 bytes read at `offset`.
    pub mask: u64,
    /// Number of zero bits in `mask`, used for shift selection.
    pub zeros: u32,
}

/// Per-offset masks for the bit-compression family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskPlan {
    pub windows: Vec<MaskWindow>,
}

impl MaskPlan {
    /// Chunk the descriptor's logical mask into windows aligned with
    /// `plan`. Only defined for the scalar word size.
    pub fn new(descriptor: &FormatDescriptor, plan: &OffsetPlan) -> MaskPlan {
        debug_assert_eq!(plan.word, SCALAR_WORD);

        // Logical whole-key mask: live bits per variable position, zero
        // over literals.
        let mut logical = vec![0u8; descriptor.length];
        for range in descriptor.variable_ranges() {
            for position in range.offset..range.end_offset() {
                logical[position] = range.mask_or_default();
            }
        }

        let mut windows = Vec::with_capacity(plan.offsets.len());
        for (index, &offset) in plan.offsets.iter().enumerate() {
            let is_last = index + 1 == plan.offsets.len();

            // The last window's mask is built at the pre-clamp alignment,
            // then shifted up to the clamped read position.
            let logical_offset = if is_last { offset + plan.last_shift } else { offset };
            let mut word = [0u8; SCALAR_WORD];
            for (lane, byte) in word.iter_mut().enumerate() {
                if let Some(&mask) = logical.get(logical_offset + lane) {
                    *byte = mask;
                }
            }
            let mut mask = u64::from_le_bytes(word);
            if is_last {
                // Re-interpret at the corrected alignment: the read moved
                // back by `last_shift` bytes, so every live bit moves up.
                mask <<= 8 * plan.last_shift as u32;
            }

            // A window with no live bits carries no information; skip the
            // read entirely.
            if mask == 0 {
                continue;
            }
            windows.push(MaskWindow {
                offset,
                mask,
                zeros: mask.count_zeros(),
            });
        }
        MaskPlan { windows }
    }

    /// Left-shift amount per window: even-indexed extracted values stay
    /// unshifted, odd-indexed ones are shifted by the zero-bit count of
    /// the previous window's mask so narrow fields land in disjoint bit
    /// ranges before combination.
    pub fn shift_amounts(&self) -> Vec<u32> {
        self.windows
            .iter()
            .enumerate()
            .map(|(index, _)| {
                if index % 2 == 1 {
                    self.windows[index - 1].zeros
                } else {
                    0
                }
            })
            .collect()
    }
}
