//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Load the effective configuration for a CLI invocation
///
/// Reads the file named by `--config` if present, otherwise starts from the
/// defaults, then applies CLI overrides.
pub fn load(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    Ok(merge_cli_with_config(cli, base))
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(threads) = cli.threads {
        config.workers.threads = threads;
    }

    let profiles = &mut config.profiles;
    if let Some(avg_ms) = cli.avg_ms {
        profiles.avg_ms = avg_ms;
    }
    if cli.seed.is_some() {
        profiles.seed = cli.seed;
    }
    if let Some(point) = cli.stability_point {
        profiles.warmup.stability_point = point;
    }
    if let Some(rate) = cli.instability_rate {
        profiles.unstable.instability_rate = rate;
    }
    if let Some(max_ms) = cli.long_tail_max_ms {
        profiles.long_tail.max_ms = max_ms;
    }
    if let Some(probability) = cli.long_tail_probability {
        profiles.long_tail.probability = probability;
    }
    if let Some(shift_ms) = cli.bimodal_shift_ms {
        profiles.bimodal.shift_ms = shift_ms;
    }

    config
}

/// Render a configuration back to TOML
pub fn to_toml_string(config: &Config) -> Result<String> {
    ::toml::to_string_pretty(config).context("Failed to serialize configuration")
}
