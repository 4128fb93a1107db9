//! Benchmark comparing specialized hash families against generic FNV-1a
//! on synthetic key corpora.
//!
//! Run with: cargo bench --bench synth_bench

use std::time::Instant;

use keysmith::exec::fnv1a;
use keysmith::infer::{FormatInferencer, InferConfig};
use keysmith::registry::HashRegistry;

const KEYS: usize = 100_000;
const ROUNDS: usize = 20;

/// Expand a tiny template: digits for '#', lowercase hex for 'h',
/// everything else verbatim. The generator is threaded explicitly so runs
/// are reproducible.
fn generate_keys(rng: &mut fastrand::Rng, template: &str, count: usize) -> Vec<Vec<u8>> {
    let mut keys = Vec::with_capacity(count);
    for _ in 0..count {
        let key = template
            .bytes()
            .map(|byte| match byte {
                b'#' => b'0' + rng.u8(0..10),
                b'h' => {
                    let nibble = rng.u8(0..16);
                    if nibble < 10 {
                        b'0' + nibble
                    } else {
                        b'a' + nibble - 10
                    }
                }
                other => other,
            })
            .collect();
        keys.push(key);
    }
    keys
}

fn bench_hasher(hash: &dyn Fn(&[u8]) -> u64, keys: &[Vec<u8>]) -> (f64, u64) {
    let mut checksum = 0u64;
    let start = Instant::now();
    for _ in 0..ROUNDS {
        for key in keys {
            checksum ^= hash(key);
        }
    }
    (start.elapsed().as_secs_f64() * 1000.0, checksum)
}

fn bench_corpus(name: &str, template: &str, seed: u64) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let keys = generate_keys(&mut rng, template, KEYS);

    let descriptor = FormatInferencer::new(InferConfig::default())
        .infer_samples(keys.iter().map(|k| k.as_slice()))
        .expect("corpus is non-empty and uniform");
    let registry = HashRegistry::build(&descriptor);

    println!("{name}: {descriptor}");
    println!("   ({KEYS} keys x {ROUNDS} rounds)");

    let (fnv_ms, _) = bench_hasher(&fnv1a, &keys);
    println!("   {:<12} {:>9.2} ms {:>8.2}x", "fnv1a", fnv_ms, 1.0);

    for family in registry.families() {
        let hash = registry.get(family).expect("registered family");
        let (ms, _) = bench_hasher(&*hash, &keys);
        println!("   {:<12} {:>9.2} ms {:>8.2}x", family, ms, fnv_ms / ms);
    }
    println!();
}

fn main() {
    println!("=======================================================================");
    println!("Specialized Hash Family Micro-benchmarks");
    println!("=======================================================================");
    println!();

    bench_corpus("SSN", "###-##-####", 223_554);
    bench_corpus("MAC", "hh:hh:hh:hh:hh:hh", 976_409);
    bench_corpus("IPv6-ish", "hhhh:hhhh:hhhh:hhhh:hhhh", 42);
    bench_corpus("URL", "https://example.com/item/########", 7);
}
