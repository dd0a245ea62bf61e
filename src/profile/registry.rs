//! Profile registry
//!
//! Builds all seven profiles once, on one shared [`RandomSource`], and looks
//! them up by tag.

use super::{LatencyProfile, ProfileKind};
use crate::config::ProfileConfig;
use crate::distribution::RandomSource;
use std::sync::Arc;

/// The full set of profiles, indexed by [`ProfileKind`]
#[derive(Debug)]
pub struct ProfileRegistry {
    profiles: Vec<LatencyProfile>,
}

impl ProfileRegistry {
    /// Build every profile from configuration, seeding the random source from
    /// `config.seed` when present
    pub fn from_config(config: &ProfileConfig) -> Self {
        let random = Arc::new(RandomSource::from_seed_option(config.seed));
        Self::with_random(config, &random)
    }

    /// Build every profile on an existing random source
    pub fn with_random(config: &ProfileConfig, random: &Arc<RandomSource>) -> Self {
        let profiles = ProfileKind::ALL
            .iter()
            .map(|&kind| LatencyProfile::from_config(kind, config, random))
            .collect();
        Self { profiles }
    }

    /// Profile for `kind`
    pub fn get(&self, kind: ProfileKind) -> &LatencyProfile {
        // Built from ProfileKind::ALL, so position == discriminant.
        &self.profiles[kind as usize]
    }
}
