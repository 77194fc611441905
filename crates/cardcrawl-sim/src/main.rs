//! Headless battle simulator.
//!
//! Runs seeded autoplay battles and prints a JSON report on stdout. Logs go
//! to stderr and follow `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use cardcrawl_sim::{run, SimConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Seeded autoplay battles for the cardcrawl combat core
#[derive(Parser, Debug)]
#[command(name = "cardcrawl-sim")]
#[command(about = "Run seeded autoplay battles and print a JSON report")]
struct Args {
    /// TOML configuration file (defaults apply to anything it omits)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Seed of the first battle
    #[arg(long)]
    seed: Option<u64>,

    /// Number of battles to play
    #[arg(long, short = 'n')]
    battles: Option<u32>,

    /// Enemy ids, comma separated (overrides the configuration)
    #[arg(long, value_delimiter = ',')]
    encounter: Vec<String>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(battles) = args.battles {
        config.battles = battles;
    }
    if !args.encounter.is_empty() {
        config.encounter = args.encounter;
    }

    let report = run(&config).context("running battles")?;
    tracing::info!(
        wins = report.wins,
        losses = report.losses,
        unfinished = report.unfinished,
        "simulation finished"
    );
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
