//! symeig3-bench CLI
//!
//! Times the closed-form solver on batches of random symmetric matrices and
//! optionally measures its agreement with nalgebra's f64 eigensolver.

mod oracle;

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use symeig3::validation::{compare, random_batch, AgreementReport, DEFAULT_RANGE};
use symeig3::{Backend, BatchConfig, BatchRunner, EigenDecomposition};

#[derive(Parser, Debug)]
#[command(name = "symeig3-bench")]
#[command(author, version, about = "Throughput and accuracy driver for symeig3")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Time the closed-form solver
    Bench {
        /// Number of batches to solve
        #[arg(value_name = "TRIALS", value_parser = clap::value_parser!(u32).range(1..))]
        trials: u32,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Time the solver and the f64 reference, then report agreement
    Compare {
        /// Number of batches to solve
        #[arg(value_name = "TRIALS", value_parser = clap::value_parser!(u32).range(1..))]
        trials: u32,

        /// Absolute tolerance for eigenvector components and eigenvalues
        #[arg(long, default_value_t = 5e-5)]
        tolerance: f32,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct RunOptions {
    /// Matrices per batch
    #[arg(long, default_value_t = 100_000)]
    batch_size: usize,

    /// RNG seed (default: derived from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Execution backend
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum BackendArg {
    Auto,
    Scalar,
    Lanes,
    Parallel,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Backend::Auto,
            BackendArg::Scalar => Backend::Scalar,
            BackendArg::Lanes => Backend::Lanes,
            BackendArg::Parallel => Backend::Parallel,
        }
    }
}

/// Result of one invocation
#[derive(Serialize, Debug, Clone, PartialEq)]
struct Summary {
    matrices: u64,
    seed: u64,
    backend: String,
    symeig3_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<Accuracy>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct Accuracy {
    tolerance: f32,
    nalgebra_ms: u128,
    eigenvectors_within_pct: f64,
    eigenvalues_within_pct: f64,
    degenerate_excluded: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (summary, json) = match cli.command {
        Commands::Bench { trials, options } => (run(trials, None, &options)?, options.json),
        Commands::Compare {
            trials,
            tolerance,
            options,
        } => (run(trials, Some(tolerance), &options)?, options.json),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in render(&summary) {
            println!("{line}");
        }
    }
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn run(trials: u32, tolerance: Option<f32>, options: &RunOptions) -> Result<Summary> {
    let seed = options.seed.unwrap_or_else(clock_seed);
    let backend = Backend::from(options.backend);
    tracing::info!(seed, ?backend, batch_size = options.batch_size, trials, "starting run");

    let runner = BatchRunner::new(BatchConfig::new().with_backend(backend));
    let resolved = runner
        .resolve_backend(options.batch_size)
        .with_context(|| format!("cannot run backend {backend:?}"))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut results = vec![EigenDecomposition::default(); options.batch_size];
    let mut symeig3_ms = 0u128;
    let mut nalgebra_ms = 0u128;
    let mut report = tolerance.map(AgreementReport::new);

    for trial in 0..trials {
        let matrices = random_batch(&mut rng, options.batch_size, DEFAULT_RANGE);

        let start = Instant::now();
        runner.run_into(&matrices, &mut results)?;
        symeig3_ms += start.elapsed().as_millis();

        if let Some(report) = report.as_mut() {
            let start = Instant::now();
            let raw: Vec<_> = matrices.iter().map(oracle::solve).collect();
            nalgebra_ms += start.elapsed().as_millis();

            let tolerance = report.tolerance;
            for (d, eig) in results.iter().zip(raw.iter()) {
                report.record(&compare(d, &oracle::to_reference(eig), tolerance));
            }
        }
        tracing::info!(trial = trial + 1, trials, "trial complete");
    }

    Ok(Summary {
        matrices: options.batch_size as u64 * u64::from(trials),
        seed,
        backend: format!("{resolved:?}"),
        symeig3_ms,
        accuracy: report.map(|r| Accuracy {
            tolerance: r.tolerance,
            nalgebra_ms,
            eigenvectors_within_pct: r.vector_percentage(),
            eigenvalues_within_pct: r.value_percentage(),
            degenerate_excluded: r.degenerate_excluded,
        }),
    })
}

fn render(summary: &Summary) -> Vec<String> {
    let mut lines = vec![format!(
        "symeig3 computing {} matrices took {}ms",
        summary.matrices, summary.symeig3_ms
    )];
    if let Some(acc) = &summary.accuracy {
        lines.push(format!(
            "nalgebra computing {} matrices took {}ms",
            summary.matrices, acc.nalgebra_ms
        ));
        lines.push(format!(
            "% of eigenvectors within {} of baseline = {:.2}%",
            acc.tolerance, acc.eigenvectors_within_pct
        ));
        lines.push(format!(
            "% of eigenvalues within {} of baseline = {:.2}%",
            acc.tolerance, acc.eigenvalues_within_pct
        ));
        if acc.degenerate_excluded > 0 {
            lines.push(format!(
                "{} near-degenerate matrices excluded from the eigenvector count",
                acc.degenerate_excluded
            ));
        }
    }
    lines
}
