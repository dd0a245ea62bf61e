//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Every field has a default, so an empty configuration file describes the
//! stock server: port 8000, five workers, a 100ms baseline.

pub mod cli;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub profiles: ProfileConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` string suitable for a listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of worker threads; each request occupies one for its whole delay
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    5
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

/// Latency profile configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Baseline average delay in milliseconds
    #[serde(default = "default_avg_ms")]
    pub avg_ms: u64,
    /// Seed for the shared random source (entropy when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub warmup: WarmUpConfig,
    #[serde(default)]
    pub unstable: UnstableConfig,
    #[serde(default)]
    pub long_tail: LongTailConfig,
    #[serde(default)]
    pub bimodal: BimodalConfig,
}

fn default_avg_ms() -> u64 {
    100
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            avg_ms: default_avg_ms(),
            seed: None,
            warmup: WarmUpConfig::default(),
            unstable: UnstableConfig::default(),
            long_tail: LongTailConfig::default(),
            bimodal: BimodalConfig::default(),
        }
    }
}

/// WarmUp profile parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmUpConfig {
    /// Request index at which the extra jitter has fully vanished
    #[serde(default = "default_stability_point")]
    pub stability_point: u64,
}

fn default_stability_point() -> u64 {
    500
}

impl Default for WarmUpConfig {
    fn default() -> Self {
        Self {
            stability_point: default_stability_point(),
        }
    }
}

/// Unstable profile parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstableConfig {
    /// Divisor turning the request index into the jitter bound
    #[serde(default = "default_instability_rate")]
    pub instability_rate: u64,
}

fn default_instability_rate() -> u64 {
    10
}

impl Default for UnstableConfig {
    fn default() -> Self {
        Self {
            instability_rate: default_instability_rate(),
        }
    }
}

/// LongTail profile parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongTailConfig {
    /// Nominal spike size in milliseconds; spikes are drawn from `[max/2, max*3/2]`
    #[serde(default = "default_long_tail_max_ms")]
    pub max_ms: u64,
    /// Per-request spike probability
    #[serde(default = "default_long_tail_probability")]
    pub probability: f64,
}

fn default_long_tail_max_ms() -> u64 {
    2000
}

fn default_long_tail_probability() -> f64 {
    0.002
}

impl Default for LongTailConfig {
    fn default() -> Self {
        Self {
            max_ms: default_long_tail_max_ms(),
            probability: default_long_tail_probability(),
        }
    }
}

/// Bimodal profile parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BimodalConfig {
    /// Distance of each mode from the baseline, in milliseconds
    #[serde(default = "default_bimodal_shift_ms")]
    pub shift_ms: u64,
}

fn default_bimodal_shift_ms() -> u64 {
    50
}

impl Default for BimodalConfig {
    fn default() -> Self {
        Self {
            shift_ms: default_bimodal_shift_ms(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Listen address:    {}", self.server.address())?;
        writeln!(f, "Worker threads:    {}", self.workers.threads)?;
        writeln!(f, "Baseline delay:    {}ms", self.profiles.avg_ms)?;
        match self.profiles.seed {
            Some(seed) => writeln!(f, "Random seed:       {}", seed)?,
            None => writeln!(f, "Random seed:       (entropy)")?,
        }
        writeln!(f, "WarmUp:            stability point {}", self.profiles.warmup.stability_point)?;
        writeln!(f, "Unstable:          instability rate {}", self.profiles.unstable.instability_rate)?;
        writeln!(
            f,
            "LongTail:          max {}ms, probability {}",
            self.profiles.long_tail.max_ms, self.profiles.long_tail.probability
        )?;
        write!(f, "Bimodal:           shift {}ms", self.profiles.bimodal.shift_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.address(), "0.0.0.0:8000");
        assert_eq!(config.workers.threads, 5);
        assert_eq!(config.profiles.avg_ms, 100);
        assert_eq!(config.profiles.seed, None);
        assert_eq!(config.profiles.warmup.stability_point, 500);
        assert_eq!(config.profiles.unstable.instability_rate, 10);
        assert_eq!(config.profiles.long_tail.max_ms, 2000);
        assert_eq!(config.profiles.long_tail.probability, 0.002);
        assert_eq!(config.profiles.bimodal.shift_ms, 50);
    }

    #[test]
    fn test_display_mentions_every_section() {
        let text = Config::default().to_string();
        assert!(text.contains("0.0.0.0:8000"));
        assert!(text.contains("stability point 500"));
        assert!(text.contains("instability rate 10"));
        assert!(text.contains("max 2000ms"));
        assert!(text.contains("shift 50ms"));
    }
}
