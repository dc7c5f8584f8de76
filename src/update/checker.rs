//! The update checker seam
//!
//! A checker answers questions about one dependency in one file state:
//! what the latest permissible version is, whether the declared
//! requirements can move, and which dependencies change with it.

use crate::domain::{Dependency, DependencyFile, DependencyGroup, Notice};
use crate::error::CheckError;
use crate::update::{IgnoreCondition, SecurityAdvisory};
use async_trait::async_trait;
use std::fmt;

/// How far declared requirements may be rewritten to reach an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementsUnlock {
    /// Leave every requirement untouched
    None,
    /// Rewrite only this dependency's requirements
    Own,
    /// Also rewrite requirements of dependencies that constrain this one
    All,
    /// No scope leads to an update
    UpdateNotPossible,
}

impl fmt::Display for RequirementsUnlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequirementsUnlock::None => "none",
            RequirementsUnlock::Own => "own",
            RequirementsUnlock::All => "all",
            RequirementsUnlock::UpdateNotPossible => "update_not_possible",
        };
        write!(f, "{}", label)
    }
}

/// Everything a checker is constructed with
#[derive(Debug, Clone)]
pub struct CheckerContext {
    /// Dependency as parsed from `files`
    pub dependency: Dependency,
    /// Current file state
    pub files: Vec<DependencyFile>,
    /// Ignore conditions that apply to the dependency
    pub ignore_conditions: Vec<IgnoreCondition>,
    /// Advisories that concern the dependency
    pub security_advisories: Vec<SecurityAdvisory>,
    /// Group being compiled
    pub group: DependencyGroup,
}

impl CheckerContext {
    /// Creates a context, keeping only the rules relevant to `dependency`
    pub fn new(
        dependency: Dependency,
        files: Vec<DependencyFile>,
        ignore_conditions: &[IgnoreCondition],
        security_advisories: &[SecurityAdvisory],
        group: DependencyGroup,
    ) -> Self {
        let ignore_conditions = ignore_conditions
            .iter()
            .filter(|c| c.matches_name(&dependency.name))
            .cloned()
            .collect();
        let security_advisories = security_advisories
            .iter()
            .filter(|a| a.concerns(&dependency.name))
            .cloned()
            .collect();

        Self {
            dependency,
            files,
            ignore_conditions,
            security_advisories,
            group,
        }
    }
}

/// Per-dependency update checker
#[async_trait]
pub trait UpdateChecker: Send + Sync {
    /// Latest version permitted by ignore conditions and cooldown
    async fn latest_version(&self) -> Result<Option<String>, CheckError>;

    /// Lowest version fixing every advisory affecting the current version
    async fn lowest_security_fix_version(&self) -> Result<Option<String>, CheckError>;

    /// True if newer versions exist but every one of them is ignored
    async fn all_versions_ignored(&self) -> Result<bool, CheckError>;

    /// True if there is no newer permissible version
    async fn up_to_date(&self) -> Result<bool, CheckError>;

    /// True if an update is reachable within `scope`
    async fn can_update(&self, scope: RequirementsUnlock) -> Result<bool, CheckError>;

    /// True if requirements may be rewritten at all
    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, CheckError>;

    /// Dependencies that change together when updating within `scope`
    async fn updated_dependencies(
        &self,
        scope: RequirementsUnlock,
    ) -> Result<Vec<Dependency>, CheckError>;

    /// Notices to attach to the change
    async fn generate_notices(&self) -> Result<Vec<Notice>, CheckError>;
}

/// Builds a checker for one dependency and file state
pub trait UpdateCheckerFactory: Send + Sync {
    /// Create a checker from `context`
    fn create(&self, context: CheckerContext) -> Box<dyn UpdateChecker>;
}
