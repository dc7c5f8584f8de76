//! JSON output formatter for machine processing
//!
//! Group changes are serialized as-is; the envelope adds run-level
//! counters, suppressed groups and per-dependency errors.

use crate::domain::GroupChange;
use crate::error_handler::ErrorRecord;
use crate::orchestrator::OrchestratorResult;
use crate::output::{count_by_update_type, OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    verbosity: Verbosity,
}

impl JsonFormatter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    dry_run: bool,
    summary: JsonSummary,
    groups: Vec<JsonGroup<'a>>,
    #[serde(skip_serializing_if = "is_empty")]
    suppressed: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    errors: &'a [ErrorRecord],
    #[serde(skip_serializing_if = "is_empty")]
    stale_lockfiles: &'a [String],
    /// Every handled dependency (verbose only)
    #[serde(skip_serializing_if = "Option::is_none")]
    handled: Option<Vec<&'a str>>,
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
struct JsonSummary {
    updates: usize,
    groups: usize,
    major: usize,
    minor: usize,
    patch: usize,
    files_written: usize,
    timed_out: bool,
}

/// A group change; file contents are only included in verbose mode
#[derive(Serialize)]
struct JsonGroup<'a> {
    name: &'a str,
    updates: Vec<JsonUpdate<'a>>,
    files: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    change: Option<&'a GroupChange>,
}

#[derive(Serialize)]
struct JsonUpdate<'a> {
    name: &'a str,
    from: Option<&'a str>,
    to: &'a str,
}

impl JsonFormatter {
    fn group_to_json<'a>(&self, change: &'a GroupChange) -> JsonGroup<'a> {
        JsonGroup {
            name: &change.dependency_group.name,
            updates: change
                .updated_dependencies
                .iter()
                .map(|d| JsonUpdate {
                    name: &d.name,
                    from: d.previous_version.as_deref(),
                    to: d.version(),
                })
                .collect(),
            files: change
                .updated_dependency_files
                .iter()
                .map(|f| f.name.as_str())
                .collect(),
            change: (self.verbosity == Verbosity::Verbose).then_some(change),
        }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let (major, minor, patch, _) = count_by_update_type(&result.changes);
        let output = JsonOutput {
            dry_run: result.dry_run,
            summary: JsonSummary {
                updates: result.update_count(),
                groups: result.changes.len(),
                major,
                minor,
                patch,
                files_written: result.files_written,
                timed_out: result.timed_out,
            },
            groups: result.changes.iter().map(|c| self.group_to_json(c)).collect(),
            suppressed: &result.suppressed,
            errors: &result.errors,
            stale_lockfiles: &result.stale_lockfiles,
            handled: (self.verbosity == Verbosity::Verbose)
                .then(|| result.handled.iter().collect()),
        };
        Self::write_json(&output, writer)
    }

    fn format_group(&self, change: &GroupChange, writer: &mut dyn Write) -> std::io::Result<()> {
        Self::write_json(&self.group_to_json(change), writer)
    }
}
