//! bmstub - synthetic HTTP backend with statistically modelled latencies
//!
//! bmstub answers every request after a delay drawn from one of seven latency
//! profiles, so load generators and benchmark harnesses have a predictable
//! but realistic target to measure against.
//!
//! # Architecture
//!
//! - **Profiles**: constant, normal, index-dependent (warm-up, instability),
//!   rare spikes and bimodal delays over one shared random source
//! - **Dispatcher**: assigns each request a unique, ordered index and runs it
//! - **Worker pool**: blocking threads; the pool size bounds concurrency
//! - **Server**: one HTTP route per profile, plus `/` and `/stats`

pub mod config;
pub mod dispatcher;
pub mod distribution;
pub mod profile;
pub mod server;
pub mod stats;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::{Completion, DispatchError, Dispatcher};
pub use profile::{LatencyProfile, ProfileKind};

/// Result type used throughout bmstub
pub type Result<T> = anyhow::Result<T>;
