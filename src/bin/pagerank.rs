//! pagerank CLI
//!
//! Ranks a directory of HTML pages by sampling and by iteration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use link_rank::pipeline::observer::NoopObserver;
use link_rank::{Error, RankPipeline, RankResult, RankSpec};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "pagerank")]
#[command(author, version, about = "Rank a corpus of HTML pages with PageRank")]
struct Cli {
    /// Directory holding the corpus' .html files
    corpus: PathBuf,

    /// JSON rank spec; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probability of following a link rather than teleporting
    #[arg(long)]
    damping: Option<f64>,

    /// Samples drawn by the sampling estimator
    #[arg(long)]
    samples: Option<usize>,

    /// Per-page convergence tolerance of the iterative estimator
    #[arg(long)]
    tolerance: Option<f64>,

    /// Stop iterating after this many steps even if not converged
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Parallel sampling chains
    #[arg(long)]
    chains: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn spec(&self) -> Result<RankSpec> {
        let mut spec = match &self.config {
            Some(path) => RankSpec::load(path)
                .with_context(|| format!("reading rank spec {}", path.display()))?,
            None => RankSpec::default(),
        };

        spec.damping = self.damping.or(spec.damping);
        spec.samples = self.samples.or(spec.samples);
        spec.tolerance = self.tolerance.or(spec.tolerance);
        spec.max_iterations = self.max_iterations.or(spec.max_iterations);
        spec.seed = self.seed.or(spec.seed);
        spec.chains = self.chains.or(spec.chains);
        Ok(spec)
    }
}

fn print_ranks(title: &str, result: &RankResult, corpus: &link_rank::Corpus) {
    println!("{title}");
    for (page, rank) in result.to_map(corpus) {
        println!("  {page}: {rank:.4}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let spec = cli.spec()?;
    let samples = spec.samples();

    let pipeline = match RankPipeline::from_spec(spec) {
        Ok(pipeline) => pipeline,
        Err(Error::InvalidConfig(report)) => {
            for err in report.errors() {
                eprintln!("error: {err}");
            }
            anyhow::bail!("invalid rank configuration");
        }
        Err(e) => return Err(e.into()),
    };

    let (corpus, report) = pipeline
        .run_dir(&cli.corpus, &mut NoopObserver)
        .with_context(|| format!("ranking {}", cli.corpus.display()))?;

    match cli.format {
        OutputFormat::Text => {
            if let Some(result) = &report.sampling {
                print_ranks(
                    &format!("PageRank Results from Sampling (n = {samples})"),
                    result,
                    &corpus,
                );
            }
            if let Some(result) = &report.iteration {
                print_ranks("PageRank Results from Iteration", result, &corpus);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.to_named(&corpus))?);
        }
    }

    Ok(())
}
