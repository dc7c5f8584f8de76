//! Group compiler
//!
//! Walks a group's members in their configured order. Each member is
//! re-parsed from the files accumulated so far, checked for lock-step
//! movement, decided, and its change merged before the next member is
//! looked at. Failures are isolated per member and handed to the error
//! handler; they never abort the pass.

use crate::domain::{
    ChangeSource, Dependency, DependencyFile, DependencyGroup, GroupChange, Notice, PackageManager,
};
use crate::ecosystem::EcosystemRegistry;
use crate::error::{DependencyError, EcosystemError, GroupError};
use crate::error_handler::ErrorHandler;
use crate::group::{ChangeBatch, HandledDependencies, Snapshot};
use crate::manifest::{ChangeBuilder, FileParser};
use crate::update::{Decision, IgnoreCondition, SecurityAdvisory, UpdateDecisionEngine};
use crate::workspace::{Workspace, WorkspaceGuard};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Switches for a group pass
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Suppress the group change unless every updated dependency records
    /// its previous version
    pub validate_previous_versions: bool,
}

/// Compiles one group at a time into a [`GroupChange`]
pub struct GroupCompiler {
    parser: Arc<dyn FileParser>,
    engine: UpdateDecisionEngine,
    builder: Arc<dyn ChangeBuilder>,
    error_handler: Arc<dyn ErrorHandler>,
    workspace: Option<(Arc<dyn Workspace>, PathBuf)>,
    options: CompilerOptions,
    cancellation: CancellationToken,
}

impl GroupCompiler {
    pub fn new(
        parser: Arc<dyn FileParser>,
        engine: UpdateDecisionEngine,
        builder: Arc<dyn ChangeBuilder>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        Self {
            parser,
            engine,
            builder,
            error_handler,
            workspace: None,
            options: CompilerOptions::default(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Create a compiler from the capabilities registered for `package_manager`
    pub fn for_package_manager(
        registry: &EcosystemRegistry,
        package_manager: PackageManager,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Result<Self, EcosystemError> {
        let engine = UpdateDecisionEngine::new(registry.checker_factory(package_manager)?);
        Ok(Self::new(
            registry.parser(package_manager)?,
            engine,
            registry.change_builder(package_manager)?,
            error_handler,
        ))
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Acquire `workspace` for the project at `root` around every pass
    pub fn with_workspace(
        mut self,
        workspace: Arc<dyn Workspace>,
        root: impl Into<PathBuf>,
    ) -> Self {
        self.workspace = Some((workspace, root.into()));
        self
    }

    /// Stop between dependencies once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_ignore_conditions(mut self, conditions: Vec<IgnoreCondition>) -> Self {
        self.engine = self.engine.with_ignore_conditions(conditions);
        self
    }

    pub fn with_security_advisories(mut self, advisories: Vec<SecurityAdvisory>) -> Self {
        self.engine = self.engine.with_security_advisories(advisories);
        self
    }

    /// Compile `group` against `snapshot`
    ///
    /// Returns `Ok(None)` when provenance validation is enabled and some
    /// updated dependency lacks a previous version. A cancelled pass
    /// returns the change accumulated up to the last completed merge.
    pub async fn compile(
        &self,
        snapshot: &Snapshot,
        group: &DependencyGroup,
        handled: &mut HandledDependencies,
    ) -> Result<Option<GroupChange>, GroupError> {
        let guard = match &self.workspace {
            Some((workspace, root)) => Some(
                WorkspaceGuard::acquire(workspace.as_ref(), root, &snapshot.directory).map_err(
                    |e| GroupError::WorkspaceSetup {
                        path: root.clone(),
                        message: e.to_string(),
                    },
                )?,
            ),
            None => None,
        };

        tracing::info!(group = %group.name, members = group.dependencies.len(), "compiling group");

        let mut batch = ChangeBatch::new(snapshot.files.clone());
        let mut notices = Vec::new();

        for (index, name) in group.dependencies.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                tracing::warn!(
                    group = %group.name,
                    remaining = group.dependencies.len() - index,
                    "group pass cancelled"
                );
                break;
            }
            let mut pass = Pass {
                snapshot,
                group,
                handled: &mut *handled,
                batch: &mut batch,
                notices: &mut notices,
                guard: guard.as_ref(),
            };
            self.compile_dependency(name, &mut pass).await;
        }

        let change = GroupChange::new(
            group.clone(),
            batch.updated_dependencies().to_vec(),
            batch.changed_files(),
            notices,
        );

        if self.options.validate_previous_versions && !change.has_complete_provenance() {
            tracing::warn!(
                group = %group.name,
                "suppressing group change: an updated dependency has no previous version"
            );
            return Ok(None);
        }

        Ok(Some(change))
    }

    async fn compile_dependency(&self, name: &str, pass: &mut Pass<'_, '_>) {
        let group = pass.group;

        if pass.handled.contains(name) {
            tracing::debug!(dependency = name, group = %group.name, "already handled");
            return;
        }

        let files = pass.batch.current_files(&pass.snapshot.directory);
        let current = match self.parser.parse(&files) {
            Ok(dependencies) => dependencies,
            Err(e) => {
                pass.handled.add(name);
                self.error_handler.handle_dependency_error(
                    name,
                    group,
                    &DependencyError::Generic(e.to_string()),
                );
                return;
            }
        };
        let Some(dependency) = current.into_iter().find(|d| d.name_matches(name)) else {
            tracing::debug!(dependency = name, group = %group.name, "no longer present, skipping");
            return;
        };

        if let Some(original) = pass.snapshot.dependency(name) {
            if original.version != dependency.version {
                tracing::info!(
                    dependency = name,
                    from = original.version(),
                    to = dependency.version(),
                    "moved in lock-step with an earlier update"
                );
                pass.handled.add(&dependency.name);
                pass.batch.add_updated_dependency(
                    Dependency::new(
                        dependency.name,
                        dependency.version,
                        dependency.requirements,
                        dependency.package_manager,
                    )
                    .with_previous_version(original.version.clone())
                    .with_previous_requirements(original.requirements.clone()),
                );
                return;
            }
        }

        let decision = self
            .engine
            .decide(&dependency, &files, group, pass.handled)
            .await;

        match decision {
            Decision::Skip(reason) => {
                tracing::debug!(dependency = name, group = %group.name, %reason, "skipped");
            }
            Decision::Failed(err) => {
                let err = DependencyError::from(err);
                if err.is_classified() {
                    self.error_handler.log_dependency_error(name, group, &err);
                } else {
                    self.error_handler.handle_dependency_error(name, group, &err);
                }
            }
            Decision::Update {
                dependencies,
                notices,
            } => self.apply(name, &files, dependencies, notices, pass),
        }
    }

    /// Build and merge the change led by `name`
    fn apply(
        &self,
        name: &str,
        files: &[DependencyFile],
        dependencies: Vec<Dependency>,
        notices: Vec<Notice>,
        pass: &mut Pass<'_, '_>,
    ) {
        let group = pass.group;
        let Some(lead) = dependencies.iter().find(|d| d.name_matches(name)).cloned() else {
            tracing::warn!(
                dependency = name,
                group = %group.name,
                "update does not include the dependency itself"
            );
            return;
        };

        let source = ChangeSource::new(lead, group.clone());
        let change = match self.builder.create_from(files, &dependencies, &source) {
            Ok(change) => change,
            Err(e) => {
                self.error_handler
                    .handle_dependency_error(name, group, &DependencyError::from(e));
                return;
            }
        };

        if let Err(e) = pass.batch.merge(change) {
            self.error_handler.handle_dependency_error(
                name,
                group,
                &DependencyError::BuildFailure(e.to_string()),
            );
            return;
        }

        if let Some(guard) = pass.guard {
            guard.store_change(&format!("{}: {}", group.name, source.lead));
        }
        pass.notices.extend(notices);
        tracing::info!(dependency = %source.lead, group = %group.name, "merged update");
    }
}

/// Mutable state of one group pass, lent to each dependency step
struct Pass<'a, 'w> {
    snapshot: &'a Snapshot,
    group: &'a DependencyGroup,
    handled: &'a mut HandledDependencies,
    batch: &'a mut ChangeBatch,
    notices: &'a mut Vec<Notice>,
    guard: Option<&'a WorkspaceGuard<'w>>,
}
