//! Output formatting for run results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::GroupChange;
use crate::orchestrator::OrchestratorResult;
use crate::update::classify;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Summary only
    Quiet,
    #[default]
    Normal,
    /// Adds notices, handled dependencies and error details
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    pub dry_run: bool,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            dry_run: false,
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, verbose: bool, quiet: bool, dry_run: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            dry_run,
            color: true,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the whole run result
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write a single group change
    fn format_group(&self, change: &GroupChange, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(
            config.verbosity,
            config.dry_run,
            config.color,
        )),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.verbosity)),
    }
}

/// Count updated dependencies by change type: (major, minor, patch, unknown)
pub(crate) fn count_by_update_type(changes: &[GroupChange]) -> (usize, usize, usize, usize) {
    let mut counts = (0, 0, 0, 0);
    for dependency in changes.iter().flat_map(|c| &c.updated_dependencies) {
        let previous = dependency.previous_version.as_deref().unwrap_or("");
        match classify(dependency.package_manager, previous, dependency.version()) {
            Some(crate::domain::UpdateType::Major) => counts.0 += 1,
            Some(crate::domain::UpdateType::Minor) => counts.1 += 1,
            Some(crate::domain::UpdateType::Patch) => counts.2 += 1,
            None => counts.3 += 1,
        }
    }
    counts
}
