//! npm Registry adapter
//!
//! Fetches package version information from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}

use crate::domain::PackageManager;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// npm registry base URL
const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry adapter
pub struct NpmAdapter {
    client: HttpClient,
    base_url: String,
}

/// npm package metadata response
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    /// Publish time per version
    #[serde(default)]
    time: HashMap<String, String>,
    /// Available versions
    #[serde(default)]
    versions: HashMap<String, NpmVersion>,
}

#[derive(Debug, Deserialize)]
struct NpmVersion {
    /// Deprecation message, if the version is deprecated
    #[serde(default)]
    deprecated: Option<String>,
}

impl NpmAdapter {
    /// Create a new npm adapter
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: NPM_REGISTRY_URL.to_string(),
        }
    }

    /// Use a different registry (e.g. a mirror)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, package)
    }
}

#[async_trait]
impl RegistryAdapter for NpmAdapter {
    fn package_manager(&self) -> PackageManager {
        PackageManager::Npm
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(package);
        let response: NpmPackageResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        if response.versions.is_empty() {
            return Err(RegistryError::invalid_response(
                package,
                self.registry_name(),
                "package document lists no versions",
            ));
        }

        let mut versions: Vec<VersionInfo> = response
            .versions
            .into_iter()
            .filter(|(_, meta)| meta.deprecated.is_none())
            .filter_map(|(version, _)| {
                let released_at = response.time.get(&version)?.parse::<DateTime<Utc>>().ok()?;
                Some(VersionInfo::new(version, released_at))
            })
            .collect();

        VersionInfo::sort(&mut versions);
        Ok(versions)
    }
}
