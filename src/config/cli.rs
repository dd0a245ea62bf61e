//! CLI argument parsing using clap

use clap::Parser;
use std::path::PathBuf;

/// bmstub - synthetic backend with statistically modelled latencies
///
/// Every option left unset falls back to the configuration file (if given)
/// and then to the built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "bmstub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long, env = "BMSTUB_CONFIG")]
    pub config: Option<PathBuf>,

    // === Server Options ===
    /// Address to bind
    #[arg(long)]
    pub bind: Option<String>,

    /// TCP port to listen on (default: 8000)
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Number of worker threads (default: 5)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    // === Profile Options ===
    /// Baseline average delay in milliseconds (default: 100)
    #[arg(long)]
    pub avg_ms: Option<u64>,

    /// Seed for the shared random source
    #[arg(long)]
    pub seed: Option<u64>,

    /// WarmUp: request index at which extra jitter vanishes (default: 500)
    #[arg(long)]
    pub stability_point: Option<u64>,

    /// Unstable: divisor for the index-dependent jitter bound (default: 10)
    #[arg(long)]
    pub instability_rate: Option<u64>,

    /// LongTail: nominal spike size in milliseconds (default: 2000)
    #[arg(long)]
    pub long_tail_max_ms: Option<u64>,

    /// LongTail: per-request spike probability (default: 0.002)
    #[arg(long)]
    pub long_tail_probability: Option<f64>,

    /// Bimodal: distance of each mode from the baseline in milliseconds (default: 50)
    #[arg(long)]
    pub bimodal_shift_ms: Option<u64>,

    // === Runtime Options ===
    /// Validate and print the configuration, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging (one line per completed request)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
