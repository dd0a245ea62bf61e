//! Configuration validation

use super::*;
use anyhow::Result;
use tracing::warn;

/// Upper bound on the worker pool
pub const MAX_THREADS: usize = 1024;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(&config.server)?;
    validate_workers(&config.workers)?;
    validate_profiles(&config.profiles)?;

    Ok(())
}

/// Validate listener configuration
pub fn validate_server(server: &ServerConfig) -> Result<()> {
    if server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}

/// Validate worker pool configuration
pub fn validate_workers(workers: &WorkerConfig) -> Result<()> {
    if workers.threads == 0 || workers.threads > MAX_THREADS {
        anyhow::bail!(
            "workers.threads must be between 1 and {}, got {}",
            MAX_THREADS,
            workers.threads
        );
    }

    Ok(())
}

/// Validate latency profile parameters
pub fn validate_profiles(profiles: &ProfileConfig) -> Result<()> {
    if profiles.avg_ms == 0 {
        anyhow::bail!("profiles.avg_ms must be greater than 0");
    }

    if profiles.warmup.stability_point == 0 {
        anyhow::bail!("profiles.warmup.stability_point must be greater than 0");
    }

    if profiles.unstable.instability_rate == 0 {
        anyhow::bail!("profiles.unstable.instability_rate must be greater than 0");
    }

    let long_tail = &profiles.long_tail;
    if long_tail.max_ms == 0 {
        anyhow::bail!("profiles.long_tail.max_ms must be greater than 0");
    }
    if !(0.0..=1.0).contains(&long_tail.probability) {
        anyhow::bail!(
            "profiles.long_tail.probability must be between 0.0 and 1.0, got {}",
            long_tail.probability
        );
    }

    // Accepted: the lower mode is clamped to zero by the truncated normal.
    if profiles.bimodal.shift_ms > profiles.avg_ms {
        warn!(
            shift_ms = profiles.bimodal.shift_ms,
            avg_ms = profiles.avg_ms,
            "bimodal shift exceeds the baseline; the lower mode will pile up at 0ms"
        );
    }

    Ok(())
}
