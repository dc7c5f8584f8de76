//! Dependency group compilation
//!
//! This module provides:
//! - The change batch accumulating file mutations within one group pass
//! - The run-scoped registry of handled dependencies
//! - The group compiler driving a pass over a group's members

mod batch;
mod compiler;
mod handled;

pub use batch::ChangeBatch;
pub use compiler::{CompilerOptions, GroupCompiler};
pub use handled::{HandledDependencies, SharedHandledDependencies};

use crate::domain::{Dependency, DependencyFile, PackageManager};
use crate::error::ManifestError;
use crate::manifest::FileParser;

/// Files and dependencies of one project directory before any group pass
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub package_manager: PackageManager,
    /// Project directory, rooted at `/`
    pub directory: String,
    pub files: Vec<DependencyFile>,
    /// Dependencies parsed from `files`
    pub dependencies: Vec<Dependency>,
}

impl Snapshot {
    /// Parse `files` once to capture the original dependency versions
    pub fn parse(
        package_manager: PackageManager,
        directory: impl Into<String>,
        files: Vec<DependencyFile>,
        parser: &dyn FileParser,
    ) -> Result<Self, ManifestError> {
        let dependencies = parser.parse(&files)?;
        Ok(Self {
            package_manager,
            directory: crate::domain::normalize_directory(&directory.into()),
            files,
            dependencies,
        })
    }

    /// Original dependency named `name`, compared case-insensitively
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name_matches(name))
    }
}
