//! `flip-generate`: Writes a starting request for `flip-reduce`.
//!
//! **Usage:**
//! ```
//! flip-generate naive --m 3 [--out req.json]
//! flip-generate sparse --n 16 --rank 40 [--density 0.3] [--seed S]
//! flip-generate one-hot --n 16 --rank 40 [--seed S]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use flipgraph::{generate, ReduceRequest, Term, WideBits, DEFAULT_FLIP_BUDGET};
use flipgraph_clients::io::write_json;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Starting decomposition families.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    /// Schoolbook m×m matrix multiplication.
    Naive,
    /// Independent bits with probability `--density`.
    Sparse,
    /// One set bit per vector.
    OneHot,
}

/// Generate a flip-reduce request.
#[derive(Parser)]
#[command(name = "flip-generate", about = "Generate a flip-reduce request")]
struct Args {
    /// Decomposition family.
    #[arg(value_enum)]
    kind: Kind,

    /// Matrix size for `naive`.
    #[arg(long, default_value_t = 2)]
    m: usize,

    /// Vector width for random families.
    #[arg(long, default_value_t = 8)]
    n: usize,

    /// Number of terms for random families.
    #[arg(long, default_value_t = 16)]
    rank: usize,

    /// Bit density for `sparse`.
    #[arg(long, default_value_t = generate::DEFAULT_DENSITY)]
    density: f64,

    /// RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// `flipBudget` written into the request.
    #[arg(long, default_value_t = DEFAULT_FLIP_BUDGET)]
    budget: u64,

    /// Output path (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (n, terms): (usize, Vec<Term<WideBits>>) = match args.kind {
        Kind::Naive => {
            if args.m == 0 {
                bail!("--m must be at least 1");
            }
            (args.m * args.m, generate::naive_matmul(args.m))
        }
        Kind::Sparse | Kind::OneHot if args.n == 0 => bail!("--n must be at least 1"),
        Kind::Sparse => (args.n, generate::sparse(args.n, args.rank, args.density, &mut rng)),
        Kind::OneHot => (args.n, generate::one_hot(args.n, args.rank, &mut rng)),
    };
    log::info!("generated {} terms of width {n} ({:?})", terms.len(), args.kind);

    let mut request = ReduceRequest::from_terms(n, &terms);
    request.flip_budget = args.budget;
    write_json(args.out.as_deref(), &request)?;

    if let Some(path) = &args.out {
        println!("Request written: {} ({} terms, n = {n})", path.display(), terms.len());
    }
    Ok(())
}
