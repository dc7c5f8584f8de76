//! Manifest file loading, parsing and rewriting
//!
//! This module provides functionality to:
//! - Load the manifest files of a project directory, including workspace members
//! - Parse a file set into dependencies (`FileParser`)
//! - Turn updated dependencies into new file contents (`ChangeBuilder`)
//! - Write the final file set back to disk

mod cargo_toml;
mod detector;
mod package_json;
mod writer;

pub use cargo_toml::CargoTomlParser;
pub use detector::{load_dependency_files, present_lockfiles};
pub use package_json::PackageJsonParser;
pub use writer::{write_dependency_files, ChangeBuilder, ManifestChangeBuilder};

use crate::domain::{Dependency, DependencyFile, PackageManager};
use crate::error::ManifestError;

/// Trait for parsing and editing a single manifest format
pub trait ManifestParser: Send + Sync {
    /// Parse dependencies from manifest content; one entry per declaration
    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<Dependency>, ManifestError>;

    /// Returns the package manager this parser handles
    fn package_manager(&self) -> PackageManager;

    /// Replace the requirement `previous` declared for `package` with `updated`,
    /// leaving the rest of the content untouched
    fn update_requirement(
        &self,
        content: &str,
        package: &str,
        previous: &str,
        updated: &str,
    ) -> Result<String, ManifestError>;
}

/// Get a manifest parser for the specified package manager
pub fn get_manifest_parser(package_manager: PackageManager) -> Box<dyn ManifestParser> {
    match package_manager {
        PackageManager::Npm => Box::new(PackageJsonParser),
        PackageManager::Cargo => Box::new(CargoTomlParser),
    }
}

/// Parses a whole dependency file set into the dependencies it declares
///
/// Implementations must be deterministic: identical file contents always
/// produce equal dependency lists in the same order.
pub trait FileParser: Send + Sync {
    /// Parse every relevant file of the set
    fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>, ManifestError>;
}

/// File parser over the manifests of one package manager
pub struct ManifestFileParser {
    package_manager: PackageManager,
    parser: Box<dyn ManifestParser>,
}

impl ManifestFileParser {
    /// Creates a file parser for the given package manager
    pub fn new(package_manager: PackageManager) -> Self {
        Self {
            package_manager,
            parser: get_manifest_parser(package_manager),
        }
    }
}

impl FileParser for ManifestFileParser {
    fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>, ManifestError> {
        let manifest_name = self.package_manager.manifest_filename();
        let mut merged: Vec<Dependency> = Vec::new();

        for file in files.iter().filter(|f| f.basename() == manifest_name) {
            for dependency in self.parser.parse(&file.content, &file.name)? {
                match merged.iter_mut().find(|d| d.name == dependency.name) {
                    Some(existing) => {
                        if existing.version.is_none() {
                            existing.version = dependency.version;
                        }
                        existing.requirements.extend(dependency.requirements);
                    }
                    None => merged.push(dependency),
                }
            }
        }

        Ok(merged)
    }
}
