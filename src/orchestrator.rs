//! Run orchestration for one project directory
//!
//! This module provides:
//! - Workflow coordination: load → snapshot → compile groups → write
//! - A run-wide handled-dependency registry shared by every group
//! - A time budget enforced through a cancellation token
//! - Dry-run mode support

use crate::config::Settings;
use crate::domain::{FileChange, GroupChange};
use crate::ecosystem::EcosystemRegistry;
use crate::error::{AppError, GroupError};
use crate::error_handler::{ErrorRecord, RecordingErrorHandler};
use crate::group::{ChangeBatch, CompilerOptions, GroupCompiler, HandledDependencies, Snapshot};
use crate::manifest::{load_dependency_files, present_lockfiles, write_dependency_files};
use crate::progress::Progress;
use crate::registry::HttpClient;
use crate::workspace::ScratchWorkspace;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Coordinates one run over the configured groups
pub struct Orchestrator {
    settings: Settings,
    registry: EcosystemRegistry,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Group changes, in configured group order
    pub changes: Vec<GroupChange>,
    /// Names of groups whose change failed provenance validation
    pub suppressed: Vec<String>,
    /// Every dependency handled during the run
    pub handled: HandledDependencies,
    /// Per-dependency failures, logged or reported
    pub errors: Vec<ErrorRecord>,
    /// Number of files written to disk (0 in dry-run mode)
    pub files_written: usize,
    /// Lock files left untouched by manifest-only edits
    pub stale_lockfiles: Vec<String>,
    /// True if the time budget ran out before every group finished
    pub timed_out: bool,
    pub dry_run: bool,
}

impl OrchestratorResult {
    /// Total number of updated dependencies across groups
    pub fn update_count(&self) -> usize {
        self.changes.iter().map(GroupChange::update_count).sum()
    }

    /// Returns true if any dependency failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Orchestrator {
    /// Create an orchestrator backed by the public registries
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        let registry = EcosystemRegistry::with_defaults(client, settings.cooldown_chrono());
        Ok(Self::with_registry(settings, registry))
    }

    /// Create an orchestrator with a custom ecosystem registry (for testing)
    pub fn with_registry(settings: Settings, registry: EcosystemRegistry) -> Self {
        Self { settings, registry }
    }

    /// Run every configured group with optional progress display
    ///
    /// Groups run in configured order. Each group starts from the files left
    /// by the groups before it, so the written result carries every group's
    /// edits.
    pub async fn run(&self, show_progress: bool) -> Result<OrchestratorResult, AppError> {
        let settings = &self.settings;
        let pm = settings.package_manager;
        let mut progress = Progress::new(show_progress);

        progress.spinner("Loading manifest files...");
        let files = load_dependency_files(&settings.root, &settings.directory, pm);
        progress.finish_and_clear();
        let files = files?;
        tracing::debug!(
            files = files.len(),
            directory = %settings.directory,
            "loaded dependency files"
        );

        let parser = self.registry.parser(pm).map_err(GroupError::from)?;
        let mut snapshot =
            Snapshot::parse(pm, settings.directory.as_str(), files, parser.as_ref())?;

        let error_handler = Arc::new(RecordingErrorHandler::new());
        let token = CancellationToken::new();
        let mut compiler =
            GroupCompiler::for_package_manager(&self.registry, pm, error_handler.clone())
                .map_err(GroupError::from)?
                .with_options(CompilerOptions {
                    validate_previous_versions: settings.validate_provenance,
                })
                .with_ignore_conditions(settings.ignore_conditions.clone())
                .with_security_advisories(settings.security_advisories.clone())
                .with_cancellation(token.clone());
        if settings.use_workspace {
            compiler =
                compiler.with_workspace(Arc::new(ScratchWorkspace::new()), settings.root.clone());
        }

        let timer = settings.timeout.map(|budget| arm_timer(budget, token.clone()));

        let mut handled = HandledDependencies::new();
        let mut run_batch = ChangeBatch::new(snapshot.files.clone());
        let mut changes = Vec::new();
        let mut suppressed = Vec::new();

        progress.start(settings.groups.len() as u64, "Compiling groups");
        for group in &settings.groups {
            if token.is_cancelled() {
                tracing::warn!(group = %group.name, "time budget exhausted, skipping group");
                break;
            }
            progress.set_message(&group.name);

            match compiler.compile(&snapshot, group, &mut handled).await? {
                Some(change) => {
                    if !change.is_empty() {
                        run_batch
                            .merge(FileChange::new(
                                change.updated_dependencies.clone(),
                                change.updated_dependency_files.clone(),
                            ))
                            .map_err(|e| GroupError::Batch {
                                group: group.name.clone(),
                                source: e,
                            })?;
                        snapshot = Snapshot::parse(
                            pm,
                            settings.directory.as_str(),
                            run_batch.current_files(&snapshot.directory),
                            parser.as_ref(),
                        )?;
                    }
                    tracing::info!(
                        group = %group.name,
                        updated = change.update_count(),
                        "group compiled"
                    );
                    changes.push(change);
                }
                None => suppressed.push(group.name.clone()),
            }
            progress.inc();
        }
        progress.finish_and_clear();

        let timed_out = token.is_cancelled();
        if let Some(timer) = timer {
            timer.abort();
        }

        let final_files = run_batch.changed_files();
        let mut files_written = 0;
        if !settings.dry_run && !final_files.is_empty() {
            files_written = write_dependency_files(&settings.root, &final_files)?;
        }

        let stale_lockfiles = if final_files.is_empty() {
            Vec::new()
        } else {
            present_lockfiles(&settings.root, &settings.directory, pm)
        };
        for lockfile in &stale_lockfiles {
            tracing::warn!(lockfile = %lockfile, "lock file was not regenerated");
        }

        Ok(OrchestratorResult {
            changes,
            suppressed,
            handled,
            errors: error_handler.records(),
            files_written,
            stale_lockfiles,
            timed_out,
            dry_run: settings.dry_run,
        })
    }
}

/// Cancel `token` once `budget` has elapsed
fn arm_timer(budget: std::time::Duration, token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(budget).await;
        tracing::warn!(budget_secs = budget.as_secs(), "time budget reached");
        token.cancel();
    })
}
