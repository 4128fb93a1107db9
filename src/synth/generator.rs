//! Hash function source generation.
//!
//! Emits, for each hash-function family, a self-contained piece of Rust
//! source: helper functions, one `pub fn hash_<family>(key: &[u8]) -> u64`,
//! constant mask declarations, per-offset extraction statements, shift
//! statements, and a binary combination tree ending in the returned value.
//! The text is meant to be embedded verbatim into a calling program; it is
//! never compiled or executed here.
//!
//! # Example
//!
//! ```rust
//! use keysmith::pattern::parse_pattern;
//! use keysmith::synth::{Family, HashSynthesizer};
//!
//! let descriptor = parse_pattern("[0-9]{3}-[0-9]{2}-[0-9]{4}").unwrap();
//! let code = HashSynthesizer::new(&descriptor)
//!     .generate(Family::Pext)
//!     .unwrap();
//! assert!(code.contains("pub fn hash_pext"));
//! ```

use std::collections::VecDeque;
use std::fmt::Write;

use crate::infer::FormatDescriptor;
use crate::mix::{ROUND_KEY_HI, ROUND_KEY_LO};
use crate::synth::{MaskPlan, OffsetPlan, SynthError, SCALAR_WORD, WIDE_WORD};

/// Hash-function families the synthesizer can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Bit-compression: extract only the live bits of each word.
    Pext,
    /// Raw-word XOR: cheapest per byte, keeps literal bits as noise.
    OffXor,
    /// 16-byte windows combined with AES rounds.
    Wide,
    /// Whole-key FNV-1a; the fallback when no specialization applies.
    Generic,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Pext, Family::OffXor, Family::Wide, Family::Generic];

    /// Stable family name, used as the registry key.
    pub fn name(self) -> &'static str {
        match self {
            Family::Pext => "pext",
            Family::OffXor => "off-xor",
            Family::Wide => "wide-aes",
            Family::Generic => "generic",
        }
    }

    fn fn_name(self) -> &'static str {
        match self {
            Family::Pext => "hash_pext",
            Family::OffXor => "hash_off_xor",
            Family::Wide => "hash_wide_aes",
            Family::Generic => "hash_generic",
        }
    }
}

const LOAD_U64_HELPER: &str = r#"/// Little-endian 8-byte load, bounds-checked by slicing.
#[inline]
fn load_u64_le(key: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&key[offset..offset + 8]);
    u64::from_le_bytes(word)
}
"#;

const PEXT_HELPER: &str = r#"/// Parallel bit extract: pack the mask-selected bits of `value`
/// contiguously into the low bits of the result, preserving order.
#[inline]
fn pext64(value: u64, mut mask: u64) -> u64 {
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
"#;

const GENERIC_BODY: &str = r#"/// Whole-key FNV-1a hash.
pub fn hash_generic(key: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for &byte in key {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
"#;

/// Emits specialized hash-function source text from a format descriptor.
pub struct HashSynthesizer<'a> {
    descriptor: &'a FormatDescriptor,
}

impl<'a> HashSynthesizer<'a> {
    pub fn new(descriptor: &'a FormatDescriptor) -> HashSynthesizer<'a> {
        HashSynthesizer { descriptor }
    }

    /// Generate the source text for one family.
    ///
    /// A descriptor with no variable ranges is not hashable by any
    /// specialized family; keys that fit in a single word fall back to
    /// the generic body, and the wide family switches to a zero-padded
    /// single mixing round when the key fits in one wide register.
    pub fn generate(&self, family: Family) -> Result<String, SynthError> {
        match family {
            Family::Generic => Ok(GENERIC_BODY.to_string()),
            _ if self.descriptor.is_constant() => Err(SynthError::NoVariableStructure),
            Family::Pext | Family::OffXor if self.descriptor.length <= SCALAR_WORD => {
                Ok(self.generate_short_scalar())
            }
            Family::Pext => self.generate_pext(),
            Family::OffXor => self.generate_off_xor(),
            Family::Wide if self.descriptor.length <= WIDE_WORD => Ok(self.generate_wide_short()),
            Family::Wide => self.generate_wide(),
        }
    }

    fn generate_short_scalar(&self) -> String {
        format!(
            "// Key fits in a single {SCALAR_WORD}-byte word; range-based specialization\n\
             // is not worthwhile.\n{GENERIC_BODY}"
        )
    }

    fn generate_pext(&self) -> Result<String, SynthError> {
        let plan = OffsetPlan::new(self.descriptor, SCALAR_WORD)?;
        let masks = MaskPlan::new(self.descriptor, &plan);
        let shifts = masks.shift_amounts();

        let mut code = String::new();
        code.push_str(LOAD_U64_HELPER);
        code.push('\n');
        code.push_str(PEXT_HELPER);
        code.push('\n');
        writeln!(code, "pub fn {}(key: &[u8]) -> u64 {{", Family::Pext.fn_name()).unwrap();
        writeln!(code, "    debug_assert_eq!(key.len(), {});", self.descriptor.length).unwrap();
        for (index, window) in masks.windows.iter().enumerate() {
            writeln!(code, "    const MASK{index}: u64 = 0x{:016x};", window.mask).unwrap();
        }
        for (index, window) in masks.windows.iter().enumerate() {
            writeln!(
                code,
                "    let hashable{index} = pext64(load_u64_le(key, {}), MASK{index});",
                window.offset
            )
            .unwrap();
        }
        for (index, &shift) in shifts.iter().enumerate() {
            if shift == 0 {
                writeln!(code, "    let shift{index} = hashable{index};").unwrap();
            } else {
                writeln!(code, "    let shift{index} = hashable{index} << {shift};").unwrap();
            }
        }
        let names = (0..masks.windows.len()).map(|i| format!("shift{i}")).collect();
        let result = emit_cascade(&mut code, names, "^");
        writeln!(code, "    {result}").unwrap();
        writeln!(code, "}}").unwrap();
        Ok(code)
    }

    fn generate_off_xor(&self) -> Result<String, SynthError> {
        let plan = OffsetPlan::new(self.descriptor, SCALAR_WORD)?;

        let mut code = String::new();
        code.push_str(LOAD_U64_HELPER);
        code.push('\n');
        writeln!(code, "pub fn {}(key: &[u8]) -> u64 {{", Family::OffXor.fn_name()).unwrap();
        writeln!(code, "    debug_assert_eq!(key.len(), {});", self.descriptor.length).unwrap();
        for (index, &offset) in plan.offsets.iter().enumerate() {
            writeln!(code, "    let hashable{index} = load_u64_le(key, {offset});").unwrap();
        }
        let names = (0..plan.offsets.len()).map(|i| format!("hashable{i}")).collect();
        let result = emit_cascade(&mut code, names, "^");
        writeln!(code, "    {result}").unwrap();
        writeln!(code, "}}").unwrap();
        Ok(code)
    }

    fn generate_wide(&self) -> Result<String, SynthError> {
        let plan = OffsetPlan::new(self.descriptor, WIDE_WORD)?;

        let mut code = String::new();
        self.emit_wide_prelude(&mut code, false);
        for (index, &offset) in plan.offsets.iter().enumerate() {
            writeln!(
                code,
                "    let hashable{index} = _mm_loadu_si128(key[{offset}..{}].as_ptr() as *const __m128i);",
                offset + WIDE_WORD
            )
            .unwrap();
        }
        let names = (0..plan.offsets.len()).map(|i| format!("hashable{i}")).collect();
        let result = emit_aes_cascade(&mut code, names);
        writeln!(
            code,
            "    (_mm_extract_epi64({result}, 0) ^ _mm_extract_epi64({result}, 1)) as u64"
        )
        .unwrap();
        writeln!(code, "}}").unwrap();
        Ok(code)
    }

    /// Key fits in one wide register: a single mixing round over the
    /// zero-padded key, never a windowed 16-byte read.
    fn generate_wide_short(&self) -> String {
        let length = self.descriptor.length;
        let mut code = String::new();
        self.emit_wide_prelude(&mut code, true);
        if length == WIDE_WORD {
            writeln!(
                code,
                "    let load = _mm_loadu_si128(key[0..16].as_ptr() as *const __m128i);"
            )
            .unwrap();
        } else {
            writeln!(code, "    let mut padded = [0u8; 16];").unwrap();
            writeln!(code, "    padded[..{length}].copy_from_slice(&key[..{length}]);").unwrap();
            writeln!(
                code,
                "    let load = _mm_loadu_si128(padded.as_ptr() as *const __m128i);"
            )
            .unwrap();
        }
        writeln!(
            code,
            "    let round_key = _mm_set_epi64x(0x{ROUND_KEY_HI:016x}u64 as i64, 0x{ROUND_KEY_LO:016x}u64 as i64);"
        )
        .unwrap();
        writeln!(code, "    let mixed = _mm_aesenc_si128(load, round_key);").unwrap();
        writeln!(
            code,
            "    (_mm_extract_epi64(mixed, 0) ^ _mm_extract_epi64(mixed, 1)) as u64"
        )
        .unwrap();
        writeln!(code, "}}").unwrap();
        code
    }

    fn emit_wide_prelude(&self, code: &mut String, with_set: bool) {
        let mut imports = vec![
            "__m128i",
            "_mm_aesenc_si128",
            "_mm_extract_epi64",
            "_mm_loadu_si128",
        ];
        if with_set {
            imports.push("_mm_set_epi64x");
        }
        writeln!(code, "#[cfg(target_arch = \"x86_64\")]").unwrap();
        writeln!(code, "use core::arch::x86_64::{{{}}};", imports.join(", ")).unwrap();
        writeln!(code).unwrap();
        writeln!(code, "/// # Safety").unwrap();
        writeln!(code, "/// The `aes` target feature must be available.").unwrap();
        writeln!(code, "#[target_feature(enable = \"aes\")]").unwrap();
        writeln!(code, "pub unsafe fn {}(key: &[u8]) -> u64 {{", Family::Wide.fn_name()).unwrap();
        writeln!(code, "    debug_assert_eq!(key.len(), {});", self.descriptor.length).unwrap();
    }
}

/// Emit the binary combination tree: dequeue two values, combine, enqueue
/// the result, until one value remains. Returns its variable name.
fn emit_cascade(code: &mut String, mut queue: VecDeque<String>, op: &str) -> String {
    let mut temp = 0;
    while queue.len() > 1 {
        let a = queue.pop_front().unwrap();
        let b = queue.pop_front().unwrap();
        let name = format!("tmp{temp}");
        temp += 1;
        writeln!(code, "    let {name} = {a} {op} {b};").unwrap();
        queue.push_back(name);
    }
    queue.pop_front().unwrap()
}

/// Same reduction shape, but each combination is one AES round.
fn emit_aes_cascade(code: &mut String, mut queue: VecDeque<String>) -> String {
    let mut temp = 0;
    while queue.len() > 1 {
        let a = queue.pop_front().unwrap();
        let b = queue.pop_front().unwrap();
        let name = format!("tmp{temp}");
        temp += 1;
        writeln!(code, "    let {name} = _mm_aesenc_si128({a}, {b});").unwrap();
        queue.push_back(name);
    }
    queue.pop_front().unwrap()
}
