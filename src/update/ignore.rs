//! Ignore conditions and security advisories
//!
//! Both are keyed by dependency name and consulted by update checkers
//! when filtering candidate versions.

use crate::domain::{PackageManager, UpdateType};
use crate::update::admission::classify;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// A rule excluding some or all versions of matching dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IgnoreCondition {
    /// Dependency name, `*` matches any run of characters
    pub dependency_name: String,
    /// Version requirements to ignore (e.g. `>=2.0.0`)
    #[serde(default)]
    pub versions: Vec<String>,
    /// Update types to ignore
    #[serde(default)]
    pub update_types: Vec<UpdateType>,
}

impl IgnoreCondition {
    /// Creates a condition ignoring every version of `dependency_name`
    pub fn new(dependency_name: impl Into<String>) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            ..Self::default()
        }
    }

    /// Restricts the condition to versions matching `requirement`
    pub fn with_versions(mut self, requirement: impl Into<String>) -> Self {
        self.versions.push(requirement.into());
        self
    }

    /// Restricts the condition to the given update types
    pub fn with_update_types(mut self, update_types: Vec<UpdateType>) -> Self {
        self.update_types = update_types;
        self
    }

    /// Returns true if the condition applies to `name`
    pub fn matches_name(&self, name: &str) -> bool {
        glob_matches(&self.dependency_name, name)
    }

    /// Returns true if moving from `current` to `candidate` is ignored
    pub fn ignores(&self, package_manager: PackageManager, current: &str, candidate: &str) -> bool {
        if self.versions.is_empty() && self.update_types.is_empty() {
            return true;
        }

        let by_version = self
            .versions
            .iter()
            .any(|req| requirement_matches(req, candidate));
        let by_type = !self.update_types.is_empty()
            && classify(package_manager, current, candidate)
                .is_some_and(|t| self.update_types.contains(&t));

        by_version || by_type
    }
}

/// A published advisory for a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecurityAdvisory {
    /// Affected dependency
    pub dependency_name: String,
    /// Requirements describing vulnerable versions
    #[serde(default)]
    pub affected_versions: Vec<String>,
    /// Requirements describing fixed versions
    #[serde(default)]
    pub patched_versions: Vec<String>,
}

impl SecurityAdvisory {
    /// Returns true if the advisory concerns `name`
    pub fn concerns(&self, name: &str) -> bool {
        self.dependency_name.eq_ignore_ascii_case(name)
    }

    /// Returns true if `version` is vulnerable
    pub fn affects(&self, version: &str) -> bool {
        self.affected_versions
            .iter()
            .any(|req| requirement_matches(req, version))
    }

    /// Returns true if `version` is a fix for this advisory
    pub fn is_fixed_by(&self, version: &str) -> bool {
        if self.patched_versions.is_empty() {
            return !self.affects(version);
        }
        self.patched_versions
            .iter()
            .any(|req| requirement_matches(req, version))
    }
}

/// Matches a version against a requirement in Cargo (`>=1, <2`) or npm
/// (`>=1 <2`) comparator syntax; anything unparseable does not match
pub fn requirement_matches(requirement: &str, version: &str) -> bool {
    let Ok(version) = Version::parse(version.trim().trim_start_matches('v')) else {
        return false;
    };
    let normalized = if requirement.contains(',') {
        requirement.to_string()
    } else {
        requirement.split_whitespace().collect::<Vec<_>>().join(", ")
    };
    VersionReq::parse(&normalized).is_ok_and(|req| req.matches(&version))
}

/// Case-insensitive glob match supporting `*`
fn glob_matches(pattern: &str, name: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == name;
    }

    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if !name.starts_with(first) || !name[first.len()..].ends_with(last) {
        return false;
    }

    let mut rest = &name[first.len()..name.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}
