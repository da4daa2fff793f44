//! Build-key and build-name identity policy.
//!
//! The remote API distinguishes status entries by key, so the key decides
//! whether a report creates a new entry or revises an existing one. Two
//! addressing modes exist:
//!
//! - [`KeyMode::PerBuild`]: every build number gets its own entry.
//! - [`KeyMode::Unique`]: all builds of a job converge on one entry, which
//!   later builds overwrite.

use sha2::{Digest, Sha256};

/// How status entries are addressed on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// One entry per build number.
    PerBuild,
    /// One entry per job, overwritten by every build.
    Unique,
}

impl KeyMode {
    /// Mode selected by the `override_latest_build` configuration flag.
    pub fn from_override(override_latest_build: bool) -> Self {
        if override_latest_build {
            KeyMode::Unique
        } else {
            KeyMode::PerBuild
        }
    }
}

/// Short deterministic digest of an identity string: SHA-256 truncated to
/// 32 hex characters, comfortably below the remote's 40-character key limit.
pub fn short_digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..32].to_string()
}

/// Status key for a build under the given addressing mode.
pub fn build_key(job_full_name: &str, build_number: u64, mode: KeyMode) -> String {
    match mode {
        KeyMode::PerBuild => short_digest(&format!("{job_full_name}#{build_number}")),
        KeyMode::Unique => short_digest(job_full_name),
    }
}

/// Display name for a build under the given addressing mode.
pub fn build_name(job_full_name: &str, build_number: u64, mode: KeyMode) -> String {
    match mode {
        KeyMode::PerBuild => format!("{job_full_name} #{build_number}"),
        KeyMode::Unique => job_full_name.to_string(),
    }
}
