//! Update checker backed by a package registry
//!
//! Works on declared requirements only: lockfiles are not resolved, so an
//! update always means rewriting at least one requirement.

use crate::domain::{
    compare_versions, is_prerelease_version, Dependency, Notice, Requirement, UpdateType,
};
use crate::error::CheckError;
use crate::parser::{get_requirement_parser, RequirementParser};
use crate::registry::{RegistryAdapter, VersionInfo};
use crate::update::{
    classify, CheckerContext, RequirementsUnlock, UpdateChecker, UpdateCheckerFactory,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Published versions per package, shared by every checker of one factory
type VersionCache = Arc<Mutex<HashMap<String, Vec<VersionInfo>>>>;

/// Builds [`RegistryChecker`]s sharing one adapter and version cache
pub struct RegistryCheckerFactory {
    adapter: Arc<dyn RegistryAdapter>,
    cooldown: Option<Duration>,
    cache: VersionCache,
}

impl RegistryCheckerFactory {
    /// Create a factory for `adapter`
    pub fn new(adapter: Arc<dyn RegistryAdapter>) -> Self {
        Self {
            adapter,
            cooldown: None,
            cache: Arc::default(),
        }
    }

    /// Ignore versions published less than `cooldown` ago
    pub fn with_cooldown(mut self, cooldown: Option<Duration>) -> Self {
        self.cooldown = cooldown;
        self
    }
}

impl UpdateCheckerFactory for RegistryCheckerFactory {
    fn create(&self, context: CheckerContext) -> Box<dyn UpdateChecker> {
        Box::new(RegistryChecker {
            adapter: self.adapter.clone(),
            parser: get_requirement_parser(context.dependency.package_manager),
            context,
            cooldown: self.cooldown,
            now: Utc::now(),
            cache: self.cache.clone(),
        })
    }
}

/// Checker for one dependency against its registry
pub struct RegistryChecker {
    adapter: Arc<dyn RegistryAdapter>,
    parser: Box<dyn RequirementParser>,
    context: CheckerContext,
    cooldown: Option<Duration>,
    now: DateTime<Utc>,
    cache: VersionCache,
}

impl RegistryChecker {
    fn dependency(&self) -> &Dependency {
        &self.context.dependency
    }

    async fn published_versions(&self) -> Result<Vec<VersionInfo>, CheckError> {
        let name = &self.dependency().name;
        let mut cache = self.cache.lock().await;
        if let Some(versions) = cache.get(name) {
            return Ok(versions.clone());
        }

        let versions = self.adapter.fetch_versions(name).await?;
        tracing::debug!(
            dependency = %name,
            registry = self.adapter.registry_name(),
            count = versions.len(),
            "fetched versions"
        );
        cache.insert(name.clone(), versions.clone());
        Ok(versions)
    }

    /// Versions newer than the current one, oldest first, before ignores
    async fn newer_versions(&self) -> Result<Vec<String>, CheckError> {
        let Some(current) = self.dependency().version.as_deref() else {
            return Ok(Vec::new());
        };
        let pm = self.dependency().package_manager;
        let allow_prerelease = is_prerelease_version(current);

        let versions = self.published_versions().await?;
        Ok(versions
            .into_iter()
            .filter(|v| pm.parse_version(&v.version).is_some())
            .filter(|v| allow_prerelease || !is_prerelease_version(&v.version))
            .filter(|v| {
                self.cooldown
                    .is_none_or(|cooldown| v.is_older_than(cooldown, self.now))
            })
            .filter(|v| compare_versions(&v.version, current) == Ordering::Greater)
            .map(|v| v.version)
            .collect())
    }

    /// Newer versions that no ignore condition excludes, oldest first
    async fn permitted_versions(&self) -> Result<Vec<String>, CheckError> {
        let current = self.dependency().version();
        let pm = self.dependency().package_manager;
        Ok(self
            .newer_versions()
            .await?
            .into_iter()
            .filter(|candidate| {
                !self
                    .context
                    .ignore_conditions
                    .iter()
                    .any(|c| c.ignores(pm, current, candidate))
            })
            .collect())
    }

    /// Version the update moves to: the lowest security fix when the
    /// current version is vulnerable, otherwise the latest permitted one
    async fn target_version(&self) -> Result<Option<String>, CheckError> {
        if let Some(fix) = self.lowest_security_fix_version().await? {
            return Ok(Some(fix));
        }
        Ok(self.permitted_versions().await?.pop())
    }

    fn vulnerable(&self) -> bool {
        let current = self.dependency().version();
        self.context
            .security_advisories
            .iter()
            .any(|a| a.affects(current))
    }

    /// Rewrites every movable requirement for `target`
    fn updated_requirements(&self, target: &str) -> Vec<Requirement> {
        self.dependency()
            .requirements
            .iter()
            .map(|req| {
                let spec = req.requirement.as_deref().and_then(|r| self.parser.parse(r));
                match spec {
                    Some(spec) if spec.kind.is_rewritable() && !spec.is_pinned() => Requirement {
                        requirement: Some(spec.bump_to(target)),
                        ..req.clone()
                    },
                    _ => req.clone(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl UpdateChecker for RegistryChecker {
    async fn latest_version(&self) -> Result<Option<String>, CheckError> {
        match self.permitted_versions().await?.pop() {
            Some(latest) => Ok(Some(latest)),
            None => Ok(self.dependency().version.clone()),
        }
    }

    async fn lowest_security_fix_version(&self) -> Result<Option<String>, CheckError> {
        if !self.vulnerable() {
            return Ok(None);
        }
        let current = self.dependency().version();
        let affecting: Vec<_> = self
            .context
            .security_advisories
            .iter()
            .filter(|a| a.affects(current))
            .collect();

        Ok(self
            .permitted_versions()
            .await?
            .into_iter()
            .find(|candidate| affecting.iter().all(|a| a.is_fixed_by(candidate))))
    }

    async fn all_versions_ignored(&self) -> Result<bool, CheckError> {
        if self.context.ignore_conditions.is_empty() {
            return Ok(false);
        }
        let newer = self.newer_versions().await?;
        Ok(!newer.is_empty() && self.permitted_versions().await?.is_empty())
    }

    async fn up_to_date(&self) -> Result<bool, CheckError> {
        Ok(self.target_version().await?.is_none())
    }

    async fn can_update(&self, scope: RequirementsUnlock) -> Result<bool, CheckError> {
        match scope {
            RequirementsUnlock::None | RequirementsUnlock::UpdateNotPossible => Ok(false),
            RequirementsUnlock::Own | RequirementsUnlock::All => {
                Ok(self.target_version().await?.is_some())
            }
        }
    }

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, CheckError> {
        Ok(self.dependency().requirements.iter().any(|req| {
            req.requirement
                .as_deref()
                .and_then(|r| self.parser.parse(r))
                .is_some_and(|spec| spec.kind.is_rewritable() && !spec.is_pinned())
        }))
    }

    async fn updated_dependencies(
        &self,
        scope: RequirementsUnlock,
    ) -> Result<Vec<Dependency>, CheckError> {
        if matches!(
            scope,
            RequirementsUnlock::None | RequirementsUnlock::UpdateNotPossible
        ) {
            return Ok(Vec::new());
        }
        let Some(target) = self.target_version().await? else {
            return Ok(Vec::new());
        };

        let dependency = self.dependency();
        let requirements = self.updated_requirements(&target);
        if requirements == dependency.requirements {
            tracing::debug!(
                dependency = %dependency.name,
                target = %target,
                "requirements already admit target version"
            );
            return Ok(Vec::new());
        }

        let updated = Dependency::new(
            dependency.name.clone(),
            Some(target),
            requirements,
            dependency.package_manager,
        )
        .with_previous_version(dependency.version.clone())
        .with_previous_requirements(dependency.requirements.clone());

        Ok(vec![updated])
    }

    async fn generate_notices(&self) -> Result<Vec<Notice>, CheckError> {
        let Some(target) = self.target_version().await? else {
            return Ok(Vec::new());
        };
        let dependency = self.dependency();
        let current = dependency.version();
        let mut notices = Vec::new();

        if classify(dependency.package_manager, current, &target) == Some(UpdateType::Major) {
            notices.push(Notice::warning(
                "Major version update",
                format!(
                    "{} moves from {} to {}, which may contain breaking changes",
                    dependency.name, current, target
                ),
            ));
        }

        for advisory in &self.context.security_advisories {
            if advisory.affects(current) && advisory.is_fixed_by(&target) {
                notices.push(Notice::info(
                    "Security advisory resolved",
                    format!(
                        "{} {} is affected by an advisory fixed in {}",
                        dependency.name, current, target
                    ),
                ));
            }
        }

        Ok(notices)
    }
}
