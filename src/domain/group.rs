//! Dependency group definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic version update type a group may admit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
}

impl UpdateType {
    /// Returns the plain label
    pub fn label(&self) -> &'static str {
        match self {
            UpdateType::Major => "major",
            UpdateType::Minor => "minor",
            UpdateType::Patch => "patch",
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized
            .strip_prefix("version-update:semver-")
            .unwrap_or(&normalized);
        match normalized {
            "major" => Ok(UpdateType::Major),
            "minor" => Ok(UpdateType::Minor),
            "patch" => Ok(UpdateType::Patch),
            other => Err(format!(
                "invalid update type '{}': expected 'major', 'minor', or 'patch'",
                other
            )),
        }
    }
}

/// Rules configured on a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupRules {
    /// Update types admitted into the group; `None` admits every update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_types: Option<Vec<UpdateType>>,
}

impl GroupRules {
    /// Returns true if the group restricts admitted update types
    pub fn restricts_update_types(&self) -> bool {
        self.update_types.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Returns true if `update_type` is admitted
    pub fn allows(&self, update_type: UpdateType) -> bool {
        match self.update_types {
            Some(ref types) if !types.is_empty() => types.contains(&update_type),
            _ => true,
        }
    }
}

/// A named group of dependencies updated together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    /// Group name, unique within a run
    pub name: String,
    /// Group rules
    #[serde(default)]
    pub rules: GroupRules,
    /// Member dependency names in configured order
    pub dependencies: Vec<String>,
}

impl DependencyGroup {
    /// Creates a new group without update-type restrictions
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            rules: GroupRules::default(),
            dependencies,
        }
    }

    /// Restricts the group to the given update types (builder pattern)
    pub fn with_update_types(mut self, update_types: Vec<UpdateType>) -> Self {
        self.rules.update_types = Some(update_types);
        self
    }

    /// Returns true if `name` is a member of this group
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} dependencies)", self.name, self.dependencies.len())
    }
}
