//! Dependency file contents

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A manifest or lock file with its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    /// File name relative to `directory` (e.g. `Cargo.toml`, `crates/a/Cargo.toml`)
    pub name: String,
    /// Directory of the project the file belongs to, rooted at `/`
    pub directory: String,
    /// File content
    pub content: String,
}

impl DependencyFile {
    /// Creates a new dependency file
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: normalize_directory(&directory.into()),
            content: content.into(),
        }
    }

    /// Returns the (directory, name) pair identifying this file
    pub fn identity(&self) -> (&str, &str) {
        (&self.directory, &self.name)
    }

    /// Returns true if both files refer to the same path
    pub fn same_file(&self, other: &DependencyFile) -> bool {
        self.identity() == other.identity()
    }

    /// Returns a copy of this file with new content
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            directory: self.directory.clone(),
            content: content.into(),
        }
    }

    /// Returns the file's location below `root`
    pub fn path_under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for part in self.directory.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        for part in self.name.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path
    }

    /// Returns the bare file name without any leading path
    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Normalizes a directory to a leading-slash form without trailing slash
pub fn normalize_directory(directory: &str) -> String {
    let trimmed = directory.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
