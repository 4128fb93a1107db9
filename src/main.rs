//! Command-line front end: infer a key format from sample keys (or parse a
//! saved pattern) and print the synthesized hash functions.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use keysmith::infer::{FormatInferencer, InferConfig, InferError, LengthPolicy, MergePolicy};
use keysmith::pattern::{parse_pattern, PatternError};
use keysmith::synth::{Family, HashSynthesizer, SynthError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MergeArg {
    /// Merge adjacent positions with matching character classes.
    ByClass,
    /// Merge only byte-identical envelopes.
    Exact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LengthArg {
    /// Abort on the first sample whose length differs.
    Fail,
    /// Warn and skip mismatched samples.
    Skip,
    /// Warn and truncate to the minimum observed length.
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FamilyArg {
    All,
    Pext,
    OffXor,
    Wide,
    Generic,
}

/// Infers the byte-level format of fixed-width keys and synthesizes hash
/// functions specialized to the bytes that actually vary.
#[derive(Parser, Debug)]
#[command(version, name = "keysmith")]
struct Cli {
    /// File with one sample key per line (default: standard input)
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Skip inference and synthesize from this pattern directly
    #[clap(short, long, conflicts_with = "input")]
    pattern: Option<String>,

    /// How to merge adjacent key positions into ranges
    #[clap(long, value_enum, default_value = "by-class")]
    merge_policy: MergeArg,

    /// What to do when sample lengths differ
    #[clap(long, value_enum, default_value = "fail")]
    length_policy: LengthArg,

    /// Hash families to synthesize
    #[clap(short, long, value_enum, default_value = "all")]
    family: Vec<FamilyArg>,

    /// Print only the inferred pattern
    #[clap(long)]
    pattern_only: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Infer(#[from] InferError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Synth(#[from] SynthError),
}

fn selected_families(args: &[FamilyArg]) -> Vec<Family> {
    if args.contains(&FamilyArg::All) {
        return Family::ALL.to_vec();
    }
    args.iter()
        .map(|arg| match arg {
            FamilyArg::Pext => Family::Pext,
            FamilyArg::OffXor => Family::OffXor,
            FamilyArg::Wide => Family::Wide,
            FamilyArg::Generic => Family::Generic,
            FamilyArg::All => unreachable!(),
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), CliError> {
    let descriptor = if let Some(pattern) = &cli.pattern {
        parse_pattern(pattern)?
    } else {
        let config = InferConfig {
            merge_policy: match cli.merge_policy {
                MergeArg::ByClass => MergePolicy::ByClass,
                MergeArg::Exact => MergePolicy::Exact,
            },
            length_policy: match cli.length_policy {
                LengthArg::Fail => LengthPolicy::Fail,
                LengthArg::Skip => LengthPolicy::Skip,
                LengthArg::Truncate => LengthPolicy::Truncate,
            },
        };
        let inferencer = FormatInferencer::new(config);
        match &cli.input {
            Some(path) => inferencer.infer_reader(BufReader::new(File::open(path)?))?,
            None => inferencer.infer_reader(io::stdin().lock())?,
        }
    };

    println!("{descriptor}");
    if cli.pattern_only {
        return Ok(());
    }

    let synthesizer = HashSynthesizer::new(&descriptor);
    for family in selected_families(&cli.family) {
        println!("// {} hash function:", family.name());
        match synthesizer.generate(family) {
            Ok(code) => println!("{code}"),
            Err(SynthError::NoVariableStructure) => {
                warn!(family = family.name(), "no variable structure found; emitting generic hash");
                println!("// No variable ranges in the key format; generic whole-key hash:");
                println!("{}", synthesizer.generate(Family::Generic)?);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
