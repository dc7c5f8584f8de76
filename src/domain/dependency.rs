//! Dependency information structures

use super::PackageManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared requirement on a dependency, tagged with the file it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Requirement text as declared (e.g. `^1.2.3`), absent for lockfile-only entries
    pub requirement: Option<String>,
    /// Name of the file declaring this requirement
    pub file: String,
    /// Sections the requirement appears in (e.g. `dependencies`, `dev-dependencies`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Shared property the version is read from (e.g. a workspace-level version)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    /// Named dependency set the requirement belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_set: Option<String>,
}

impl Requirement {
    /// Creates a new requirement declared in `file`
    pub fn new(requirement: Option<String>, file: impl Into<String>) -> Self {
        Self {
            requirement,
            file: file.into(),
            groups: Vec::new(),
            property_name: None,
            dependency_set: None,
        }
    }

    /// Adds the section this requirement is declared in
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Sets the shared property name
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property_name = Some(property.into());
        self
    }

    /// Sets the dependency set name
    pub fn with_dependency_set(mut self, set: impl Into<String>) -> Self {
        self.dependency_set = Some(set.into());
        self
    }

    /// Returns the requirement text, or an empty string if absent
    pub fn text(&self) -> &str {
        self.requirement.as_deref().unwrap_or("")
    }
}

/// A dependency as parsed from one state of the dependency files
///
/// Re-parsing a changed file set produces new instances; two parses of
/// identical content produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Resolved version; may be a content hash for git sources
    pub version: Option<String>,
    /// Version before the update, set on updated dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    /// Requirements declared across the file set
    pub requirements: Vec<Requirement>,
    /// Requirements before the update, set on updated dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_requirements: Option<Vec<Requirement>>,
    /// Package manager this dependency belongs to
    pub package_manager: PackageManager,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        requirements: Vec<Requirement>,
        package_manager: PackageManager,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            previous_version: None,
            requirements,
            previous_requirements: None,
            package_manager,
        }
    }

    /// Sets the previous version (builder pattern)
    pub fn with_previous_version(mut self, version: Option<String>) -> Self {
        self.previous_version = version;
        self
    }

    /// Sets the previous requirements (builder pattern)
    pub fn with_previous_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.previous_requirements = Some(requirements);
        self
    }

    /// Returns the current version string, or an empty string if unknown
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Returns true if the dependency is only used for development
    pub fn is_dev(&self) -> bool {
        !self.requirements.is_empty()
            && self
                .requirements
                .iter()
                .all(|r| r.groups.iter().any(|g| g.contains("dev")))
    }

    /// Returns true if the name matches `other` ignoring ASCII case
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }

    /// Returns the requirement declared in `file`, if any
    pub fn requirement_in(&self, file: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.file == file)
    }

    /// Returns the previous requirement declared in `file`, if any
    pub fn previous_requirement_in(&self, file: &str) -> Option<&Requirement> {
        self.previous_requirements
            .as_ref()
            .and_then(|reqs| reqs.iter().find(|r| r.file == file))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.previous_version, &self.version) {
            (Some(prev), Some(current)) => write!(
                f,
                "{}: {} → {} [{}]",
                self.name, prev, current, self.package_manager
            ),
            (None, Some(current)) => {
                write!(f, "{}@{} [{}]", self.name, current, self.package_manager)
            }
            _ => write!(f, "{} [{}]", self.name, self.package_manager),
        }
    }
}
