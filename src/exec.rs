//! Runtime hash callables.
//!
//! Interpreted equivalents of every emitted hash family, driven by the
//! same offset and mask plans as the generated source text. The external
//! benchmarking harness consumes these as opaque callables taking a
//! fixed-length byte slice and returning an unsigned integer.

use std::collections::VecDeque;

use crate::infer::FormatDescriptor;
use crate::mix;
use crate::synth::{Family, MaskPlan, OffsetPlan, SynthError, SCALAR_WORD, WIDE_WORD};

/// An instantiated hash function.
pub type HashFn = Box<dyn Fn(&[u8]) -> u64 + Send + Sync>;

/// Whole-key FNV-1a, the generic fallback family.
pub fn fnv1a(key: &[u8]) -> u64 {
    const INIT: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = INIT;
    for &byte in key {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Parallel bit extract: pack the mask-selected bits of `value`
/// contiguously into the low bits of the result, preserving order.
pub fn pext64(value: u64, mut mask: u64) -> u64 {
    let mut out = 0u64;
    let mut bit = 0u32;
    while mask != 0 {
        let lowest = mask & mask.wrapping_neg();
        if value & lowest != 0 {
            out |= 1 << bit;
        }
        bit += 1;
        mask ^= lowest;
    }
    out
}

fn load_u64_le(key: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; SCALAR_WORD];
    word.copy_from_slice(&key[offset..offset + SCALAR_WORD]);
    u64::from_le_bytes(word)
}

fn load_u128_le(key: &[u8], offset: usize) -> u128 {
    let mut word = [0u8; WIDE_WORD];
    word.copy_from_slice(&key[offset..offset + WIDE_WORD]);
    u128::from_le_bytes(word)
}

/// Binary combination tree: repeatedly combine the front two values and
/// enqueue the result until one remains.
fn reduce<T: Copy>(mut queue: VecDeque<T>, combine: impl Fn(T, T) -> T) -> T {
    while queue.len() > 1 {
        let a = queue.pop_front().unwrap();
        let b = queue.pop_front().unwrap();
        queue.push_back(combine(a, b));
    }
    queue[0]
}

/// Build the runtime callable for one family.
///
/// Follows the same fallback policy as source generation: scalar families
/// on single-word keys and any family on a constant descriptor degrade as
/// documented, except that a constant descriptor is reported as an error
/// so the caller can choose the generic family explicitly.
pub fn compile(descriptor: &FormatDescriptor, family: Family) -> Result<HashFn, SynthError> {
    match family {
        Family::Generic => Ok(Box::new(fnv1a)),
        _ if descriptor.is_constant() => Err(SynthError::NoVariableStructure),
        Family::Pext | Family::OffXor if descriptor.length <= SCALAR_WORD => Ok(Box::new(fnv1a)),
        Family::Pext => {
            let plan = OffsetPlan::new(descriptor, SCALAR_WORD)?;
            let masks = MaskPlan::new(descriptor, &plan);
            let shifts = masks.shift_amounts();
            let windows: Vec<(usize, u64, u32)> = masks
                .windows
                .iter()
                .zip(shifts)
                .map(|(window, shift)| (window.offset, window.mask, shift))
                .collect();
            Ok(Box::new(move |key| {
                let values: VecDeque<u64> = windows
                    .iter()
                    .map(|&(offset, mask, shift)| pext64(load_u64_le(key, offset), mask) << shift)
                    .collect();
                reduce(values, |a, b| a ^ b)
            }))
        }
        Family::OffXor => {
            let plan = OffsetPlan::new(descriptor, SCALAR_WORD)?;
            let offsets = plan.offsets;
            Ok(Box::new(move |key| {
                let values: VecDeque<u64> =
                    offsets.iter().map(|&offset| load_u64_le(key, offset)).collect();
                reduce(values, |a, b| a ^ b)
            }))
        }
        Family::Wide if descriptor.length <= WIDE_WORD => {
            let length = descriptor.length;
            Ok(Box::new(move |key| {
                let mut padded = [0u8; WIDE_WORD];
                padded[..length].copy_from_slice(&key[..length]);
                mix::fold(mix::aes_round(u128::from_le_bytes(padded), mix::ROUND_KEY))
            }))
        }
        Family::Wide => {
            let plan = OffsetPlan::new(descriptor, WIDE_WORD)?;
            let offsets = plan.offsets;
            Ok(Box::new(move |key| {
                let values: VecDeque<u128> =
                    offsets.iter().map(|&offset| load_u128_le(key, offset)).collect();
                mix::fold(reduce(values, mix::aes_round))
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;

    fn hasher(pattern: &str, family: Family) -> HashFn {
        compile(&parse_pattern(pattern).unwrap(), family).unwrap()
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_pext64_packs_selected_bits() {
        assert_eq!(pext64(0b1010_1010, 0b1111_0000), 0b1010);
        assert_eq!(pext64(0xFF, 0x0F), 0x0F);
        assert_eq!(pext64(0x1234, 0), 0);
        assert_eq!(pext64(u64::MAX, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_families_are_deterministic() {
        let ssn = "[0-9]{3}-[0-9]{2}-[0-9]{4}";
        for family in Family::ALL {
            let hash = hasher(ssn, family);
            assert_eq!(hash(b"123-45-6789"), hash(b"123-45-6789"));
        }
    }

    #[test]
    fn test_pext_sees_every_digit() {
        let hash = hasher("[0-9]{3}-[0-9]{2}-[0-9]{4}", Family::Pext);
        let base = hash(b"123-45-6789");
        // Flipping any single digit must change the hash.
        for (index, variant) in [
            b"523-45-6789".as_slice(),
            b"153-45-6789",
            b"125-45-6789",
            b"123-95-6789",
            b"123-41-6789",
            b"123-45-1789",
            b"123-45-6189",
            b"123-45-6719",
            b"123-45-6781",
        ]
        .iter()
        .enumerate()
        {
            assert_ne!(hash(variant), base, "digit flip {index} was invisible");
        }
    }

    #[test]
    fn test_pext_ignores_literal_bytes() {
        // Literal separators are masked out entirely; only off-xor keeps
        // them as noise.
        let pext = hasher("[0-9]{3}-[0-9]{2}-[0-9]{4}", Family::Pext);
        let off_xor = hasher("[0-9]{3}-[0-9]{2}-[0-9]{4}", Family::OffXor);
        assert_eq!(pext(b"123-45-6789"), pext(b"123x45x6789"));
        assert_ne!(off_xor(b"123-45-6789"), off_xor(b"123x45x6789"));
    }

    #[test]
    fn test_pext_compacts_narrow_fields() {
        // Two digit fields compress to 4 bits each; the odd one is
        // shifted into a disjoint bit range before combination.
        let hash = hasher("[0-9]{16}", Family::Pext);
        assert_ne!(hash(b"0000000000000001"), hash(b"0000000010000000"));
    }

    #[test]
    fn test_off_xor_reads_clamped_tail() {
        let hash = hasher("[0-9]{3}-[0-9]{2}-[0-9]{4}", Family::OffXor);
        let base = hash(b"123-45-6789");
        assert_ne!(hash(b"123-45-6780"), base);
    }

    #[test]
    fn test_wide_short_key_pads() {
        // 6-byte key: single mixing round over the zero-padded key.
        let hash = hasher("[0-9]{6}", Family::Wide);
        let padded = {
            let mut buf = [0u8; 16];
            buf[..6].copy_from_slice(b"123456");
            buf
        };
        assert_eq!(
            hash(b"123456"),
            mix::fold(mix::aes_round(u128::from_le_bytes(padded), mix::ROUND_KEY))
        );
    }

    #[test]
    fn test_wide_windows_cover_key_tail() {
        let hash = hasher("basename[0-9]{12}", Family::Wide);
        let base = hash(b"basename000000000000");
        assert_ne!(hash(b"basename000000000001"), base);
        assert_ne!(hash(b"basename100000000000"), base);
    }

    #[test]
    fn test_constant_descriptor_is_an_error() {
        let descriptor = parse_pattern("CONST").unwrap();
        for family in [Family::Pext, Family::OffXor, Family::Wide] {
            assert!(matches!(
                compile(&descriptor, family),
                Err(SynthError::NoVariableStructure)
            ));
        }
        let generic = compile(&descriptor, Family::Generic).unwrap();
        assert_eq!(generic(b"CONST"), fnv1a(b"CONST"));
    }

    #[test]
    fn test_single_word_key_degrades_to_generic() {
        let hash = hasher("[0-9]{3}:[0-9]", Family::Pext);
        assert_eq!(hash(b"123:4"), fnv1a(b"123:4"));
    }
}
