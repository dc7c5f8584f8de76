//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One block per group with its updated dependencies
//! - Update type indication (major/minor/patch)
//! - Notices, suppressed groups and per-dependency errors
//! - Summary with a breakdown by update type

use crate::domain::{Dependency, GroupChange, NoticeMode, UpdateType};
use crate::orchestrator::OrchestratorResult;
use crate::output::{count_by_update_type, OutputFormatter, Verbosity};
use crate::update::classify;
use colored::Colorize;
use std::io::Write;

/// Plain label for an update type, `?` when unknown
fn label(update_type: Option<UpdateType>) -> &'static str {
    update_type.map(|t| t.label()).unwrap_or("?")
}

fn colored_label(update_type: Option<UpdateType>) -> String {
    match update_type {
        Some(UpdateType::Major) => "major".red().bold().to_string(),
        Some(UpdateType::Minor) => "minor".yellow().to_string(),
        Some(UpdateType::Patch) => "patch".green().to_string(),
        None => "?".dimmed().to_string(),
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    dry_run: bool,
    color: bool,
}

impl TextFormatter {
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn dry_run_prefix(&self) -> String {
        match (self.dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    fn format_update_line(
        &self,
        dependency: &Dependency,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let previous = dependency.previous_version.as_deref().unwrap_or("?");
        let update_type = classify(dependency.package_manager, previous, dependency.version());

        if self.color {
            let name_display = format!("{:width$}", dependency.name, width = max_name_len);
            let dev_display = if dependency.is_dev() {
                " (dev)".dimmed().to_string()
            } else {
                String::new()
            };
            writeln!(
                writer,
                "  {} {} {} {} [{}]{}",
                name_display,
                previous.dimmed(),
                "→".dimmed(),
                dependency.version().bright_white().bold(),
                colored_label(update_type),
                dev_display
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]{}",
                dependency.name,
                previous,
                dependency.version(),
                label(update_type),
                if dependency.is_dev() { " (dev)" } else { "" },
                width = max_name_len
            )
        }
    }

    fn format_errors(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if result.errors.is_empty() {
            return Ok(());
        }
        if self.color {
            writeln!(writer, "{}:", "Errors".red().bold())?;
        } else {
            writeln!(writer, "Errors:")?;
        }
        for error in &result.errors {
            let line = format!("{} ({}): {}", error.dependency, error.group, error.message);
            if self.color {
                writeln!(writer, "  {} {}", "✗".red(), line)?;
            } else {
                writeln!(writer, "  - {}", line)?;
            }
        }
        writeln!(writer)
    }

    fn format_summary(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = result.update_count();

        if self.verbosity == Verbosity::Quiet {
            return match (updates, self.color) {
                (0, true) => writeln!(writer, "{}{}", prefix, "No updates".dimmed()),
                (0, false) => writeln!(writer, "{}No updates", prefix),
                (n, true) => writeln!(writer, "{}{} updated", prefix, n.to_string().green()),
                (n, false) => writeln!(writer, "{}{} updated", prefix, n),
            };
        }

        let (major, minor, patch, unknown) = count_by_update_type(&result.changes);
        let mut parts = Vec::new();
        let counts = [
            (major, "major"),
            (minor, "minor"),
            (patch, "patch"),
            (unknown, "other"),
        ];
        for (count, name) in counts {
            if count > 0 {
                parts.push(format!("{} {}", count, name));
            }
        }
        let breakdown = if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        };

        if self.color {
            writeln!(writer, "{}{}:", prefix, "Summary".bold())?;
            writeln!(
                writer,
                "  {} package(s) updated in {} group(s){}",
                updates.to_string().green(),
                result.changes.len(),
                breakdown
            )?;
        } else {
            writeln!(writer, "{}Summary:", prefix)?;
            writeln!(
                writer,
                "  {} package(s) updated in {} group(s){}",
                updates,
                result.changes.len(),
                breakdown
            )?;
        }

        if !result.suppressed.is_empty() {
            writeln!(
                writer,
                "  suppressed (missing previous version): {}",
                result.suppressed.join(", ")
            )?;
        }
        if result.timed_out {
            writeln!(writer, "  time budget reached before every group finished")?;
        }
        if !result.stale_lockfiles.is_empty() {
            let message = format!(
                "  lock files not regenerated: {}",
                result.stale_lockfiles.join(", ")
            );
            if self.color {
                writeln!(writer, "{}", message.yellow())?;
            } else {
                writeln!(writer, "{}", message)?;
            }
        }
        if self.verbosity == Verbosity::Verbose && !result.handled.is_empty() {
            let handled: Vec<&str> = result.handled.iter().collect();
            writeln!(writer, "  handled: {}", handled.join(", "))?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            for change in &result.changes {
                self.format_group(change, writer)?;
            }
            self.format_errors(result, writer)?;
        }
        self.format_summary(result, writer)
    }

    fn format_group(&self, change: &GroupChange, writer: &mut dyn Write) -> std::io::Result<()> {
        if change.is_empty() && self.verbosity != Verbosity::Verbose {
            return Ok(());
        }

        let prefix = self.dry_run_prefix();
        let count = change.update_count();
        let noun = if count == 1 { "update" } else { "updates" };
        let name = &change.dependency_group.name;
        if self.color {
            writeln!(
                writer,
                "{}{} — {} {}",
                prefix,
                name.bold(),
                count.to_string().green(),
                noun
            )?;
        } else {
            writeln!(writer, "{}{} — {} {}", prefix, name, count, noun)?;
        }

        let max_name_len = change
            .updated_dependencies
            .iter()
            .map(|d| d.name.len())
            .max()
            .unwrap_or(0)
            .max(20);
        for dependency in &change.updated_dependencies {
            self.format_update_line(dependency, max_name_len, writer)?;
        }

        if self.verbosity == Verbosity::Verbose {
            for notice in &change.notices {
                let marker = match notice.mode {
                    NoticeMode::Warning => "!",
                    NoticeMode::Info => "i",
                };
                if self.color && notice.mode == NoticeMode::Warning {
                    writeln!(writer, "  {} {}", marker.yellow(), notice)?;
                } else {
                    writeln!(writer, "  {} {}", marker, notice)?;
                }
            }
            for file in &change.updated_dependency_files {
                writeln!(writer, "  changed: {}", file.name)?;
            }
        }

        writeln!(writer)
    }
}
