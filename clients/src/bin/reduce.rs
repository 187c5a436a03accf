//! `flip-reduce`: Lowers the rank of a decomposition by flip-graph descent.
//!
//! Reads a request JSON (`terms`, `n`, optional `flipBudget`), runs the
//! search on a background worker while printing progress to stderr, and
//! writes the completion JSON to `--out` or stdout.
//!
//! **Usage:**
//! ```
//! flip-reduce <request.json> [--config flip.toml] [--budget N] [--seed S]
//!             [--progress-interval K] [--audit] [--verify] [--out <path>]
//! ```
//!
//! Set `RUST_LOG=debug` for per-tick log records.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use flipgraph::host::Reducer;
use flipgraph::Progress;
use flipgraph_clients::config::{DescentOverrides, FileConfig};
use flipgraph_clients::io::{read_request, verify, write_json};

/// Reduce a GF(2) decomposition by random flips.
#[derive(Parser)]
#[command(
    name = "flip-reduce",
    about = "Reduce a GF(2) trilinear decomposition by flip-graph descent"
)]
struct Args {
    /// Request JSON file.
    request: PathBuf,

    /// Optional TOML file with a `[descent]` table.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of flips (overrides the file and the request).
    #[arg(long)]
    budget: Option<u64>,

    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Iterations between progress lines; 0 disables them.
    #[arg(long)]
    progress_interval: Option<u64>,

    /// Audit the duplicate index when the run ends.
    #[arg(long)]
    audit: bool,

    /// Check that the result encodes the same tensor as the input.
    #[arg(long)]
    verify: bool,

    /// Completion output path (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = FileConfig::load(args.config.as_deref())?;
    let flags = DescentOverrides {
        budget: args.budget,
        progress_interval: args.progress_interval,
        seed: args.seed,
        audit: args.audit.then_some(true),
    };
    let overrides = flags.or(file.descent);

    let mut request = read_request(&args.request)?;
    if let Some(budget) = overrides.budget {
        request.flip_budget = budget;
    }
    let config = overrides.resolve();

    let started = Instant::now();
    let handle = Reducer::new()
        .submit(request.clone(), config)
        .context("failed to start reduction")?;
    let completion = handle
        .wait(|p: &Progress| {
            eprint!(
                "\rflip {:>10}/{}  rank {:>4}  best {:>4}",
                p.iteration, p.budget, p.current_rank, p.best_rank
            );
        })
        .context("reduction failed")?;
    eprintln!();
    let elapsed = started.elapsed();

    write_json(args.out.as_deref(), &completion)?;

    // Summary goes to stdout only when the JSON went to a file.
    if args.out.is_some() {
        println!("Flip-graph Reduction");
        println!("====================");
        println!("  Input:    {}", args.request.display());
        println!("  Width:    {}", request.n);
        println!("  Budget:   {}", request.flip_budget);
        println!(
            "  Rank:     {} -> {}",
            completion.initial_rank, completion.final_rank
        );
        println!("  Elapsed:  {:.2?}", elapsed);
    }

    if args.verify {
        let check = verify(&request, &completion)?;
        eprintln!(
            "verify: tensor {} ({} ones, {} conflict cells)",
            if check.preserved { "preserved" } else { "CHANGED" },
            check.ones,
            check.conflicts
        );
        if !check.preserved {
            process::exit(1);
        }
    }

    Ok(())
}
