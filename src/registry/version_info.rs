//! Version information from registry
//!
//! This module provides the VersionInfo struct that represents
//! a published package version with its release date.

use crate::domain::compare_versions;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Information about a package version from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// The version string (e.g., "1.2.3")
    pub version: String,
    /// When this version was released
    pub released_at: DateTime<Utc>,
}

impl VersionInfo {
    /// Create a new VersionInfo
    pub fn new(version: impl Into<String>, released_at: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            released_at,
        }
    }

    /// Create a VersionInfo with current time as release date
    pub fn now(version: impl Into<String>) -> Self {
        Self::new(version, Utc::now())
    }

    /// Returns true if the version was published at least `min_age` before `now`
    pub fn is_older_than(&self, min_age: Duration, now: DateTime<Utc>) -> bool {
        now - self.released_at >= min_age
    }

    /// Sort versions from oldest to newest by version number
    pub fn sort(versions: &mut [VersionInfo]) {
        versions.sort_by(|a, b| compare_versions(&a.version, &b.version));
    }
}
