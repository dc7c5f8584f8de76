//! Package manager capability registry
//!
//! Maps each package manager to its file parser, update checker factory
//! and change builder. New ecosystems register here without touching the
//! group compiler.

use crate::domain::PackageManager;
use crate::error::EcosystemError;
use crate::manifest::{ChangeBuilder, FileParser, ManifestChangeBuilder, ManifestFileParser};
use crate::registry::{create_adapter, HttpClient};
use crate::update::{RegistryCheckerFactory, UpdateCheckerFactory};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default, Clone)]
pub struct EcosystemRegistry {
    parsers: HashMap<PackageManager, Arc<dyn FileParser>>,
    checkers: HashMap<PackageManager, Arc<dyn UpdateCheckerFactory>>,
    builders: HashMap<PackageManager, Arc<dyn ChangeBuilder>>,
}

impl EcosystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with manifest parsers, change builders and registry-backed
    /// checkers for every supported package manager
    pub fn with_defaults(client: HttpClient, cooldown: Option<Duration>) -> Self {
        let mut registry = Self::new();
        for &pm in PackageManager::all() {
            let adapter = Arc::from(create_adapter(pm, client.clone()));
            registry.register_parser(pm, Arc::new(ManifestFileParser::new(pm)));
            registry.register_builder(pm, Arc::new(ManifestChangeBuilder::new(pm)));
            registry.register_checker(
                pm,
                Arc::new(RegistryCheckerFactory::new(adapter).with_cooldown(cooldown)),
            );
        }
        registry
    }

    pub fn register_parser(
        &mut self,
        package_manager: PackageManager,
        parser: Arc<dyn FileParser>,
    ) {
        self.parsers.insert(package_manager, parser);
    }

    pub fn register_checker(
        &mut self,
        package_manager: PackageManager,
        factory: Arc<dyn UpdateCheckerFactory>,
    ) {
        self.checkers.insert(package_manager, factory);
    }

    pub fn register_builder(
        &mut self,
        package_manager: PackageManager,
        builder: Arc<dyn ChangeBuilder>,
    ) {
        self.builders.insert(package_manager, builder);
    }

    /// File parser for `package_manager`
    pub fn parser(
        &self,
        package_manager: PackageManager,
    ) -> Result<Arc<dyn FileParser>, EcosystemError> {
        lookup(&self.parsers, package_manager, "file parser")
    }

    /// Update checker factory for `package_manager`
    pub fn checker_factory(
        &self,
        package_manager: PackageManager,
    ) -> Result<Arc<dyn UpdateCheckerFactory>, EcosystemError> {
        lookup(&self.checkers, package_manager, "update checker")
    }

    /// Change builder for `package_manager`
    pub fn change_builder(
        &self,
        package_manager: PackageManager,
    ) -> Result<Arc<dyn ChangeBuilder>, EcosystemError> {
        lookup(&self.builders, package_manager, "change builder")
    }
}

fn lookup<T: ?Sized>(
    map: &HashMap<PackageManager, Arc<T>>,
    package_manager: PackageManager,
    capability: &'static str,
) -> Result<Arc<T>, EcosystemError> {
    map.get(&package_manager)
        .cloned()
        .ok_or(EcosystemError::NotRegistered {
            package_manager,
            capability,
        })
}
