//! Registry adapters for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm Registry adapter
//! - crates.io API adapter

mod client;
mod crates_io;
mod npm;
mod version_info;

pub use client::HttpClient;
pub use crates_io::CratesIoAdapter;
pub use npm::NpmAdapter;
pub use version_info::VersionInfo;

use crate::domain::PackageManager;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the package manager this adapter serves
    fn package_manager(&self) -> PackageManager;

    /// Get the registry name
    fn registry_name(&self) -> &'static str {
        self.package_manager().registry_name()
    }

    /// Fetch published versions for a package, oldest first
    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError>;
}

/// Create a registry adapter for the given package manager
pub fn create_adapter(
    package_manager: PackageManager,
    client: HttpClient,
) -> Box<dyn RegistryAdapter> {
    match package_manager {
        PackageManager::Npm => Box::new(NpmAdapter::new(client)),
        PackageManager::Cargo => Box::new(CratesIoAdapter::new(client)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapter() {
        let client = HttpClient::new().unwrap();
        for pm in PackageManager::all() {
            let adapter = create_adapter(*pm, client.clone());
            assert_eq!(adapter.package_manager(), *pm);
            assert_eq!(adapter.registry_name(), pm.registry_name());
        }
    }
}
