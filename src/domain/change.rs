//! File change and group change result types

use super::{Dependency, DependencyFile, DependencyGroup};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notice attached to a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeMode {
    /// Informational
    Info,
    /// Something the reviewer should look at
    Warning,
}

/// Advisory note generated while computing an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub mode: NoticeMode,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
}

impl Notice {
    /// Creates an informational notice
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            mode: NoticeMode::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Creates a warning notice
    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            mode: NoticeMode::Warning,
            title: title.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Concrete file mutations for one confirmed update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Dependencies moved by this change
    pub updated_dependencies: Vec<Dependency>,
    /// New contents of every file the change touches
    pub updated_files: Vec<DependencyFile>,
}

impl FileChange {
    /// Creates a new file change
    pub fn new(updated_dependencies: Vec<Dependency>, updated_files: Vec<DependencyFile>) -> Self {
        Self {
            updated_dependencies,
            updated_files,
        }
    }

    /// Returns true if the change touches no files
    pub fn is_empty(&self) -> bool {
        self.updated_files.is_empty()
    }
}

/// What drives a file change: the lead dependency and its group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSource {
    /// Dependency the change was computed for
    pub lead: Dependency,
    /// Group the change belongs to
    pub group: DependencyGroup,
}

impl ChangeSource {
    /// Creates a new change source
    pub fn new(lead: Dependency, group: DependencyGroup) -> Self {
        Self { lead, group }
    }
}

/// The cumulative change computed for one group in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChange {
    /// Group this change was compiled for
    pub dependency_group: DependencyGroup,
    /// Updated dependencies, one entry per name
    pub updated_dependencies: Vec<Dependency>,
    /// Final content of every file touched by the group's merges
    pub updated_dependency_files: Vec<DependencyFile>,
    /// Notices collected while deciding updates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

impl GroupChange {
    /// Creates a new group change
    pub fn new(
        dependency_group: DependencyGroup,
        updated_dependencies: Vec<Dependency>,
        updated_dependency_files: Vec<DependencyFile>,
        notices: Vec<Notice>,
    ) -> Self {
        Self {
            dependency_group,
            updated_dependencies,
            updated_dependency_files,
            notices,
        }
    }

    /// Returns true if nothing was updated
    pub fn is_empty(&self) -> bool {
        self.updated_dependencies.is_empty()
    }

    /// Returns the number of updated dependencies
    pub fn update_count(&self) -> usize {
        self.updated_dependencies.len()
    }

    /// Returns true if every updated dependency records its previous version
    pub fn has_complete_provenance(&self) -> bool {
        self.updated_dependencies
            .iter()
            .all(|d| d.previous_version.is_some())
    }

    /// Returns the names of updated dependencies in order
    pub fn dependency_names(&self) -> Vec<&str> {
        self.updated_dependencies
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }
}
