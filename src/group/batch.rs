//! Change batch accumulator
//!
//! Collects the file changes confirmed while compiling one group. Each
//! dependency in the pass reads its files from here, so it always sees
//! the effect of every earlier merge.

use crate::domain::{Dependency, DependencyFile, FileChange};
use crate::error::BatchError;
use std::collections::{BTreeMap, HashSet};

/// Cumulative file mutations and updated dependencies of one group pass
#[derive(Debug, Clone)]
pub struct ChangeBatch {
    initial_files: Vec<DependencyFile>,
    /// Working file set per directory, present once a merge touched it
    merged: BTreeMap<String, Vec<DependencyFile>>,
    updated: Vec<Dependency>,
}

impl ChangeBatch {
    /// Start a batch from the files as they were before the pass
    pub fn new(initial_files: Vec<DependencyFile>) -> Self {
        Self {
            initial_files,
            merged: BTreeMap::new(),
            updated: Vec::new(),
        }
    }

    /// Baseline files
    pub fn initial_files(&self) -> &[DependencyFile] {
        &self.initial_files
    }

    /// Current files of `directory`
    pub fn current_files(&self, directory: &str) -> Vec<DependencyFile> {
        match self.merged.get(directory) {
            Some(files) => files.clone(),
            None => self
                .initial_files
                .iter()
                .filter(|f| f.directory == directory)
                .cloned()
                .collect(),
        }
    }

    /// Current files of every directory, baseline order first
    pub fn all_current_files(&self) -> Vec<DependencyFile> {
        let mut directories: Vec<&str> = Vec::new();
        for file in &self.initial_files {
            if !directories.contains(&file.directory.as_str()) {
                directories.push(&file.directory);
            }
        }
        for directory in self.merged.keys() {
            if !directories.contains(&directory.as_str()) {
                directories.push(directory);
            }
        }

        directories
            .into_iter()
            .flat_map(|directory| self.current_files(directory))
            .collect()
    }

    /// Files whose content differs from the baseline, or that are new
    pub fn changed_files(&self) -> Vec<DependencyFile> {
        self.merged
            .values()
            .flatten()
            .filter(|file| {
                !self
                    .initial_files
                    .iter()
                    .any(|initial| initial.same_file(file) && initial.content == file.content)
            })
            .cloned()
            .collect()
    }

    /// Updated dependencies, one per name, in first-recorded order
    pub fn updated_dependencies(&self) -> &[Dependency] {
        &self.updated
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }

    /// Record a dependency as updated without touching files
    pub fn add_updated_dependency(&mut self, dependency: Dependency) {
        match self.updated.iter_mut().find(|d| d.name == dependency.name) {
            Some(existing) => *existing = dependency,
            None => self.updated.push(dependency),
        }
    }

    /// Apply `change`: replace files by identity, append new files, and
    /// record its dependencies
    ///
    /// Nothing is applied if the change lists the same file twice.
    pub fn merge(&mut self, change: FileChange) -> Result<(), BatchError> {
        let mut seen = HashSet::new();
        for file in &change.updated_files {
            if !seen.insert(file.identity()) {
                return Err(BatchError::DuplicateFile {
                    directory: file.directory.clone(),
                    name: file.name.clone(),
                });
            }
        }

        for file in change.updated_files {
            let directory = file.directory.clone();
            if !self.merged.contains_key(&directory) {
                let baseline = self.current_files(&directory);
                self.merged.insert(directory.clone(), baseline);
            }
            let Some(files) = self.merged.get_mut(&directory) else {
                continue;
            };
            match files.iter_mut().find(|f| f.same_file(&file)) {
                Some(existing) => *existing = file,
                None => files.push(file),
            }
        }

        for dependency in change.updated_dependencies {
            self.add_updated_dependency(dependency);
        }
        Ok(())
    }
}
