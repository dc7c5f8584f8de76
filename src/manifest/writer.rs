//! Turning updated dependencies into file changes
//!
//! This module provides:
//! - The `ChangeBuilder` seam used by the group compiler
//! - `ManifestChangeBuilder`, which rewrites requirement text in place
//! - Writing a final file set back to disk

use crate::domain::{ChangeSource, Dependency, DependencyFile, FileChange, PackageManager};
use crate::error::{BuildError, ManifestError};
use crate::manifest::{get_manifest_parser, ManifestParser};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Materializes updated dependencies as new file contents
pub trait ChangeBuilder: Send + Sync {
    /// Build the file change moving `updated` on top of `files`
    fn create_from(
        &self,
        files: &[DependencyFile],
        updated: &[Dependency],
        source: &ChangeSource,
    ) -> Result<FileChange, BuildError>;
}

/// Change builder that edits manifest requirements, preserving formatting
pub struct ManifestChangeBuilder {
    parser: Box<dyn ManifestParser>,
}

impl ManifestChangeBuilder {
    /// Create a change builder for the given package manager
    pub fn new(package_manager: PackageManager) -> Self {
        Self {
            parser: get_manifest_parser(package_manager),
        }
    }
}

impl ChangeBuilder for ManifestChangeBuilder {
    fn create_from(
        &self,
        files: &[DependencyFile],
        updated: &[Dependency],
        source: &ChangeSource,
    ) -> Result<FileChange, BuildError> {
        let mut working = files.to_vec();
        let mut applied = HashSet::new();

        for dependency in updated {
            let Some(previous_requirements) = dependency.previous_requirements.as_ref() else {
                continue;
            };

            for requirement in &dependency.requirements {
                let previous = previous_requirements
                    .iter()
                    .find(|p| p.file == requirement.file && p.groups == requirement.groups);
                let (Some(old), Some(new)) = (
                    previous.and_then(|p| p.requirement.as_deref()),
                    requirement.requirement.as_deref(),
                ) else {
                    continue;
                };
                if old == new {
                    continue;
                }

                // One edit rewrites every matching declaration in the file
                let key = (requirement.file.as_str(), dependency.name.as_str(), old, new);
                if !applied.insert(key) {
                    continue;
                }

                let file = working
                    .iter_mut()
                    .find(|f| f.name == requirement.file)
                    .ok_or_else(|| BuildError::MissingFile {
                        file: requirement.file.clone(),
                    })?;
                file.content =
                    self.parser
                        .update_requirement(&file.content, &dependency.name, old, new)?;
            }
        }

        let changed: Vec<DependencyFile> = working
            .into_iter()
            .zip(files)
            .filter(|(after, before)| after.content != before.content)
            .map(|(after, _)| after)
            .collect();

        if changed.is_empty() {
            return Err(BuildError::NoChanges {
                package: source.lead.name.clone(),
            });
        }

        Ok(FileChange::new(updated.to_vec(), changed))
    }
}

/// Write every file of the set below `root`, returning the number written
pub fn write_dependency_files(
    root: &Path,
    files: &[DependencyFile],
) -> Result<usize, ManifestError> {
    for file in files {
        let path = file.path_under(root);
        fs::write(&path, &file.content).map_err(|e| ManifestError::write_error(&path, e))?;
    }
    Ok(files.len())
}
