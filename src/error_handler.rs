//! Sinks for per-dependency failures

use crate::domain::DependencyGroup;
use crate::error::DependencyError;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Receives failures isolated during a group pass
///
/// Implementations must not panic.
pub trait ErrorHandler: Send + Sync {
    /// Record a classified failure (e.g. a registry inconsistency)
    fn log_dependency_error(
        &self,
        dependency: &str,
        group: &DependencyGroup,
        error: &DependencyError,
    );

    /// Report an unexpected failure
    fn handle_dependency_error(
        &self,
        dependency: &str,
        group: &DependencyGroup,
        error: &DependencyError,
    );
}

/// One recorded failure
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub dependency: String,
    pub group: String,
    pub kind: &'static str,
    pub message: String,
    /// True if reported, false if only logged
    pub reported: bool,
}

/// Error handler that logs through `tracing` and keeps every record
#[derive(Debug, Default)]
pub struct RecordingErrorHandler {
    records: Mutex<Vec<ErrorRecord>>,
}

impl RecordingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records collected so far, in arrival order
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of reported (not merely logged) failures
    pub fn reported_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.reported)
            .count()
    }

    fn push(
        &self,
        dependency: &str,
        group: &DependencyGroup,
        error: &DependencyError,
        reported: bool,
    ) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ErrorRecord {
                dependency: dependency.to_string(),
                group: group.name.clone(),
                kind: error.kind(),
                message: error.to_string(),
                reported,
            });
    }
}

impl ErrorHandler for RecordingErrorHandler {
    fn log_dependency_error(
        &self,
        dependency: &str,
        group: &DependencyGroup,
        error: &DependencyError,
    ) {
        tracing::info!(
            dependency,
            group = %group.name,
            kind = error.kind(),
            "{}",
            error
        );
        self.push(dependency, group, error, false);
    }

    fn handle_dependency_error(
        &self,
        dependency: &str,
        group: &DependencyGroup,
        error: &DependencyError,
    ) {
        tracing::error!(
            dependency,
            group = %group.name,
            kind = error.kind(),
            "{}",
            error
        );
        self.push(dependency, group, error, true);
    }
}
