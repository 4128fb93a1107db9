//! Hash family registry.
//!
//! The interface the external benchmarking harness consumes: a data-driven
//! table of `(family name, constructor)` pairs built from one format
//! descriptor. Each constructor produces a fresh callable with no shared
//! mutable state, so independent trials can instantiate families
//! repeatedly and concurrently.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::exec::{compile, fnv1a, HashFn};
use crate::infer::FormatDescriptor;
use crate::synth::Family;

/// Builds one hash callable per invocation.
pub type Constructor = Box<dyn Fn() -> HashFn + Send + Sync>;

/// Registry of hash families for one key format.
pub struct HashRegistry {
    names: Vec<&'static str>,
    entries: FxHashMap<&'static str, Constructor>,
}

impl HashRegistry {
    /// Build the registry for a descriptor. Every family is always
    /// present: families that are structurally impossible for this
    /// format construct the documented generic fallback instead.
    pub fn build(descriptor: &FormatDescriptor) -> HashRegistry {
        let descriptor = Arc::new(descriptor.clone());
        let mut names = Vec::with_capacity(Family::ALL.len());
        let mut entries = FxHashMap::default();
        for family in Family::ALL {
            let descriptor = Arc::clone(&descriptor);
            let constructor: Constructor = Box::new(move || {
                compile(&descriptor, family).unwrap_or_else(|err| {
                    debug!(family = family.name(), %err, "falling back to generic whole-key hash");
                    Box::new(fnv1a)
                })
            });
            names.push(family.name());
            entries.insert(family.name(), constructor);
        }
        HashRegistry { names, entries }
    }

    /// Instantiate a fresh callable for the named family.
    pub fn get(&self, name: &str) -> Option<HashFn> {
        self.entries.get(name).map(|constructor| constructor())
    }

    /// Registered family names, in registration order.
    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;

    #[test]
    fn test_registry_exposes_all_families() {
        let registry = HashRegistry::build(&parse_pattern("[0-9]{3}-[0-9]{2}-[0-9]{4}").unwrap());
        assert_eq!(registry.len(), 4);
        let names: Vec<_> = registry.families().collect();
        assert_eq!(names, vec!["pext", "off-xor", "wide-aes", "generic"]);
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_instances_share_no_state() {
        let registry = HashRegistry::build(&parse_pattern("[0-9]{3}-[0-9]{2}-[0-9]{4}").unwrap());
        let first = registry.get("pext").unwrap();
        let second = registry.get("pext").unwrap();
        assert_eq!(first(b"123-45-6789"), second(b"123-45-6789"));
    }

    #[test]
    fn test_constant_format_falls_back_to_generic() {
        let registry = HashRegistry::build(&parse_pattern("CONSTANT").unwrap());
        for name in ["pext", "off-xor", "wide-aes"] {
            let hash = registry.get(name).unwrap();
            assert_eq!(hash(b"CONSTANT"), fnv1a(b"CONSTANT"));
        }
    }

    #[test]
    fn test_families_disagree_on_real_formats() {
        // Different extraction primitives should produce different values
        // for the same key; equality would suggest a shared code path.
        let registry = HashRegistry::build(&parse_pattern("[0-9]{3}-[0-9]{2}-[0-9]{4}").unwrap());
        let pext = registry.get("pext").unwrap();
        let off_xor = registry.get("off-xor").unwrap();
        assert_ne!(pext(b"123-45-6789"), off_xor(b"123-45-6789"));
    }
}
