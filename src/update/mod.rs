//! Update decision logic for group members
//!
//! This module provides:
//! - Semver admission of version jumps into restricted groups
//! - The async update checker seam and its registry-backed implementation
//! - Ignore conditions and security advisories
//! - The decision engine that turns checker answers into a [`Decision`]

mod admission;
mod checker;
mod ignore;
mod registry_checker;

pub use admission::{admits, classify};
pub use checker::{CheckerContext, RequirementsUnlock, UpdateChecker, UpdateCheckerFactory};
pub use ignore::{requirement_matches, IgnoreCondition, SecurityAdvisory};
pub use registry_checker::{RegistryChecker, RegistryCheckerFactory};

use crate::domain::{Dependency, DependencyFile, DependencyGroup, Notice, SkipReason};
use crate::error::CheckError;
use crate::group::HandledDependencies;
use std::sync::Arc;

/// Outcome of deciding one dependency in one group pass
#[derive(Debug)]
pub enum Decision {
    /// Nothing to do for this dependency
    Skip(SkipReason),
    /// Dependencies that change together, with notices for the change
    Update {
        dependencies: Vec<Dependency>,
        notices: Vec<Notice>,
    },
    /// The checker failed; the dependency is already marked handled
    Failed(CheckError),
}

impl Decision {
    /// Returns true if this decision proposes an update
    pub fn is_update(&self) -> bool {
        matches!(self, Decision::Update { .. })
    }

    /// Returns the skip reason, if skipped
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Decision::Skip(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Decides whether and how a single dependency is updated within a group
pub struct UpdateDecisionEngine {
    factory: Arc<dyn UpdateCheckerFactory>,
    ignore_conditions: Vec<IgnoreCondition>,
    security_advisories: Vec<SecurityAdvisory>,
}

impl UpdateDecisionEngine {
    /// Create an engine building checkers with `factory`
    pub fn new(factory: Arc<dyn UpdateCheckerFactory>) -> Self {
        Self {
            factory,
            ignore_conditions: Vec::new(),
            security_advisories: Vec::new(),
        }
    }

    /// Set the ignore conditions handed to every checker
    pub fn with_ignore_conditions(mut self, conditions: Vec<IgnoreCondition>) -> Self {
        self.ignore_conditions = conditions;
        self
    }

    /// Set the security advisories handed to every checker
    pub fn with_security_advisories(mut self, advisories: Vec<SecurityAdvisory>) -> Self {
        self.security_advisories = advisories;
        self
    }

    /// Decide the update for `dependency` given the current `files`
    ///
    /// The dependency is marked handled on every path except a semver
    /// exclusion, which leaves it eligible for other groups.
    pub async fn decide(
        &self,
        dependency: &Dependency,
        files: &[DependencyFile],
        group: &DependencyGroup,
        handled: &mut HandledDependencies,
    ) -> Decision {
        let context = CheckerContext::new(
            dependency.clone(),
            files.to_vec(),
            &self.ignore_conditions,
            &self.security_advisories,
            group.clone(),
        );
        let checker = self.factory.create(context);

        match self.run(checker.as_ref(), dependency, group, handled).await {
            Ok(decision) => decision,
            Err(err) => {
                handled.add(&dependency.name);
                Decision::Failed(err)
            }
        }
    }

    async fn run(
        &self,
        checker: &dyn UpdateChecker,
        dependency: &Dependency,
        group: &DependencyGroup,
        handled: &mut HandledDependencies,
    ) -> Result<Decision, CheckError> {
        if checker.all_versions_ignored().await? {
            tracing::info!(dependency = %dependency.name, "all newer versions are ignored");
            handled.add(&dependency.name);
            return Ok(Decision::Skip(SkipReason::AllVersionsIgnored));
        }

        if group.rules.restricts_update_types() {
            let latest = checker.latest_version().await?;
            let admitted = latest.as_deref().is_some_and(|latest| {
                admits(
                    &group.rules,
                    dependency.package_manager,
                    dependency.version(),
                    latest,
                )
            });
            if !admitted {
                tracing::info!(
                    dependency = %dependency.name,
                    group = %group.name,
                    current = dependency.version(),
                    latest = latest.as_deref().unwrap_or("none"),
                    "update type not allowed in group"
                );
                return Ok(Decision::Skip(SkipReason::SemverExcluded));
            }
        }

        handled.add(&dependency.name);

        if checker.up_to_date().await? {
            tracing::debug!(dependency = %dependency.name, "no update needed");
            return Ok(Decision::Skip(SkipReason::UpToDate));
        }

        let scope = Self::unlock_scope(checker).await?;
        if scope == RequirementsUnlock::UpdateNotPossible {
            tracing::debug!(dependency = %dependency.name, "no update possible");
            return Ok(Decision::Skip(SkipReason::UpdateNotPossible));
        }

        tracing::debug!(dependency = %dependency.name, %scope, "requirements unlock scope");
        let dependencies = checker.updated_dependencies(scope).await?;
        if dependencies.is_empty() {
            return Ok(Decision::Skip(SkipReason::NoChanges));
        }
        let notices = checker.generate_notices().await?;

        Ok(Decision::Update {
            dependencies,
            notices,
        })
    }

    /// Pick the narrowest requirements scope that reaches an update
    async fn unlock_scope(checker: &dyn UpdateChecker) -> Result<RequirementsUnlock, CheckError> {
        if !checker.requirements_unlocked_or_can_be().await? {
            return Ok(if checker.can_update(RequirementsUnlock::None).await? {
                RequirementsUnlock::None
            } else {
                RequirementsUnlock::UpdateNotPossible
            });
        }

        for scope in [RequirementsUnlock::Own, RequirementsUnlock::All] {
            if checker.can_update(scope).await? {
                return Ok(scope);
            }
        }
        Ok(RequirementsUnlock::UpdateNotPossible)
    }
}
