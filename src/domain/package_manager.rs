//! Package manager identifiers for supported ecosystems

use super::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm ecosystem (package.json)
    Npm,
    /// Cargo ecosystem (Cargo.toml)
    Cargo,
}

impl PackageManager {
    /// Returns the key used in configuration files
    pub fn key(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Cargo => "cargo",
        }
    }

    /// Returns the manifest filename for this package manager
    pub fn manifest_filename(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package.json",
            PackageManager::Cargo => "Cargo.toml",
        }
    }

    /// Returns the lock filenames for this package manager
    pub fn lock_filenames(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["package-lock.json", "pnpm-lock.yaml", "yarn.lock"],
            PackageManager::Cargo => &["Cargo.lock"],
        }
    }

    /// Returns the display name for this package manager
    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Cargo => "Cargo",
        }
    }

    /// Returns the name of the registry this package manager resolves from
    pub fn registry_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Cargo => "crates.io",
        }
    }

    /// Parses a version string with this ecosystem's version grammar
    ///
    /// Both npm and Cargo accept dotted release segments with an optional
    /// pre-release and build suffix. npm additionally tolerates a leading `v`.
    pub fn parse_version(&self, version: &str) -> Option<Version> {
        let trimmed = version.trim();
        let candidate = match self {
            PackageManager::Npm => trimmed.strip_prefix('v').unwrap_or(trimmed),
            PackageManager::Cargo => trimmed,
        };
        Version::parse(candidate)
    }

    /// Returns all supported package managers
    pub fn all() -> &'static [PackageManager] {
        &[PackageManager::Npm, PackageManager::Cargo]
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" | "npm_and_yarn" | "node" => Ok(PackageManager::Npm),
            "cargo" | "rust" => Ok(PackageManager::Cargo),
            other => Err(format!(
                "unknown package manager '{}': expected 'npm' or 'cargo'",
                other
            )),
        }
    }
}
