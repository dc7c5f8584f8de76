//! Loading the manifest files of a project directory
//!
//! Features:
//! - Reads the root manifest (package.json or Cargo.toml)
//! - Follows Cargo `[workspace] members` and npm `workspaces` globs
//! - Reports lock files that a manifest-only update leaves stale

use crate::domain::{DependencyFile, PackageManager};
use crate::error::ManifestError;
use std::fs;
use std::path::{Path, PathBuf};

/// Load every manifest of `directory` (relative to `root`) for the package manager
///
/// File names are relative to the directory, so a Cargo workspace member
/// shows up as `crates/core/Cargo.toml`. Members are sorted by path.
pub fn load_dependency_files(
    root: &Path,
    directory: &str,
    package_manager: PackageManager,
) -> Result<Vec<DependencyFile>, ManifestError> {
    let base = directory_path(root, directory);
    let manifest_name = package_manager.manifest_filename();
    let manifest_path = base.join(manifest_name);

    if !manifest_path.exists() {
        return Err(ManifestError::not_found(manifest_path));
    }
    let content = read_file(&manifest_path)?;

    let mut files = vec![DependencyFile::new(manifest_name, directory, content.as_str())];
    for member in workspace_members(&base, &content, package_manager)? {
        let path = base.join(&member).join(manifest_name);
        if !path.exists() {
            continue;
        }
        let name = format!("{}/{}", member.trim_end_matches('/'), manifest_name);
        files.push(DependencyFile::new(name, directory, read_file(&path)?));
    }

    Ok(files)
}

/// Returns the lock files present in `directory` for the package manager
pub fn present_lockfiles(
    root: &Path,
    directory: &str,
    package_manager: PackageManager,
) -> Vec<String> {
    let base = directory_path(root, directory);
    package_manager
        .lock_filenames()
        .iter()
        .filter(|name| base.join(name).exists())
        .map(|name| name.to_string())
        .collect()
}

fn directory_path(root: &Path, directory: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in directory.split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}

fn read_file(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Workspace member directories declared by the root manifest, relative to `base`
fn workspace_members(
    base: &Path,
    content: &str,
    package_manager: PackageManager,
) -> Result<Vec<String>, ManifestError> {
    let (patterns, excluded) = match package_manager {
        PackageManager::Cargo => {
            let toml: toml::Value = content.parse().map_err(|e: toml::de::Error| {
                ManifestError::toml_parse_error(base.join("Cargo.toml"), e.to_string())
            })?;
            let workspace = toml.get("workspace");
            let strings = |key: &str| -> Vec<String> {
                workspace
                    .and_then(|w| w.get(key))
                    .and_then(|v| v.as_array())
                    .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                    .unwrap_or_default()
            };
            (strings("members"), strings("exclude"))
        }
        PackageManager::Npm => {
            let json: serde_json::Value = serde_json::from_str(content).map_err(|e| {
                ManifestError::json_parse_error(base.join("package.json"), e.to_string())
            })?;
            // "workspaces": [...] or "workspaces": { "packages": [...] }
            let list = json
                .get("workspaces")
                .and_then(|w| w.as_array().or_else(|| w.get("packages")?.as_array()));
            let patterns = list
                .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default();
            (patterns, Vec::new())
        }
    };

    let mut members = Vec::new();
    for pattern in patterns {
        let pattern = pattern.trim_start_matches("./").to_string();
        if let Some(parent) = pattern.strip_suffix("/*").or_else(|| pattern.strip_suffix("/**")) {
            if let Ok(entries) = fs::read_dir(base.join(parent)) {
                for entry in entries.flatten() {
                    if entry.path().is_dir() {
                        members.push(format!("{}/{}", parent, entry.file_name().to_string_lossy()));
                    }
                }
            }
        } else if !pattern.contains('*') && pattern != "." {
            members.push(pattern);
        }
    }

    members.retain(|m| !excluded.iter().any(|e| e.trim_start_matches("./") == m));
    members.sort();
    members.dedup();
    Ok(members)
}
