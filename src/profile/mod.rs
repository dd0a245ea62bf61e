//! Latency profiles
//!
//! A profile is a named policy mapping a [`RequestIndex`] to a delay. Seven
//! behaviours are provided:
//!
//! - **Constant**: always the baseline
//! - **Stable**: truncated normal around the baseline, sd = avg/4
//! - **StableVariable**: as Stable with sd = avg/2
//! - **WarmUp**: Stable plus jitter that shrinks to zero by the stability point
//! - **Unstable**: Stable plus jitter that grows with the request index
//! - **LongTail**: Stable plus rare, index-independent spikes
//! - **Bimodal**: one of two truncated normals, chosen with equal probability
//!
//! Each behaviour is identified by a [`ProfileKind`] tag. The tag's URL path
//! and display name come from the static [`PROFILE_TABLE`].
//!
//! [`RequestIndex`]: crate::worker::counter::RequestIndex

pub mod latency;
pub mod registry;

pub use latency::LatencyProfile;
pub use registry::ProfileRegistry;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Profile tag, one per behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Constant,
    Stable,
    StableVariable,
    Unstable,
    WarmUp,
    LongTail,
    Bimodal,
}

/// One row of the profile table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileEntry {
    pub kind: ProfileKind,
    /// URL path, lowercase display name with a leading slash
    pub path: &'static str,
    /// Human-readable name
    pub name: &'static str,
}

/// Static mapping from tag to path and display name, in listing order
pub const PROFILE_TABLE: [ProfileEntry; 7] = [
    ProfileEntry { kind: ProfileKind::Constant, path: "/constant", name: "Constant" },
    ProfileEntry { kind: ProfileKind::Stable, path: "/stable", name: "Stable" },
    ProfileEntry { kind: ProfileKind::StableVariable, path: "/stablevariable", name: "StableVariable" },
    ProfileEntry { kind: ProfileKind::Unstable, path: "/unstable", name: "Unstable" },
    ProfileEntry { kind: ProfileKind::WarmUp, path: "/warmup", name: "WarmUp" },
    ProfileEntry { kind: ProfileKind::LongTail, path: "/longtail", name: "LongTail" },
    ProfileEntry { kind: ProfileKind::Bimodal, path: "/bimodal", name: "Bimodal" },
];

impl ProfileKind {
    /// Every profile kind, in table order
    pub const ALL: [ProfileKind; 7] = [
        ProfileKind::Constant,
        ProfileKind::Stable,
        ProfileKind::StableVariable,
        ProfileKind::Unstable,
        ProfileKind::WarmUp,
        ProfileKind::LongTail,
        ProfileKind::Bimodal,
    ];

    /// Table row for this kind
    pub fn entry(self) -> &'static ProfileEntry {
        // The table lists kinds in declaration order.
        &PROFILE_TABLE[self as usize]
    }

    /// URL path (e.g. `/warmup`)
    pub fn path(self) -> &'static str {
        self.entry().path
    }

    /// Display name (e.g. `WarmUp`)
    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Profile lookup errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown latency profile: {0:?}")]
    Unknown(String),
}

impl FromStr for ProfileKind {
    type Err = ProfileError;

    /// Accepts the display name or the path segment, case-insensitively,
    /// with or without a leading slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('/');
        PROFILE_TABLE
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(wanted))
            .map(|entry| entry.kind)
            .ok_or_else(|| ProfileError::Unknown(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_declaration_order() {
        for (i, kind) in ProfileKind::ALL.iter().enumerate() {
            assert_eq!(PROFILE_TABLE[i].kind, *kind);
            assert_eq!(kind.entry().kind, *kind);
        }
    }

    #[test]
    fn test_paths_are_lowercase_names() {
        for entry in PROFILE_TABLE.iter() {
            assert_eq!(entry.path, format!("/{}", entry.name.to_lowercase()));
        }
    }

    #[test]
    fn test_known_paths() {
        assert_eq!(ProfileKind::Constant.path(), "/constant");
        assert_eq!(ProfileKind::StableVariable.path(), "/stablevariable");
        assert_eq!(ProfileKind::WarmUp.path(), "/warmup");
        assert_eq!(ProfileKind::LongTail.path(), "/longtail");
        assert_eq!(ProfileKind::LongTail.to_string(), "LongTail");
    }

    #[test]
    fn test_parse_names_and_paths() {
        assert_eq!("WarmUp".parse::<ProfileKind>(), Ok(ProfileKind::WarmUp));
        assert_eq!("warmup".parse::<ProfileKind>(), Ok(ProfileKind::WarmUp));
        assert_eq!("/bimodal".parse::<ProfileKind>(), Ok(ProfileKind::Bimodal));
        assert_eq!(" STABLEVARIABLE ".parse::<ProfileKind>(), Ok(ProfileKind::StableVariable));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "slow".parse::<ProfileKind>().unwrap_err();
        assert_eq!(err, ProfileError::Unknown("slow".to_string()));
        assert!("".parse::<ProfileKind>().is_err());
    }
}
