//! crates.io API adapter
//!
//! Fetches crate version information from crates.io.
//! API endpoint: https://crates.io/api/v1/crates/{crate}
//!
//! Note: crates.io requires a User-Agent header (handled by HttpClient)
//! and has rate limiting (1 request/second).

use crate::domain::PackageManager;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// crates.io API base URL
const CRATES_IO_API_URL: &str = "https://crates.io/api/v1/crates";

/// Rate limit: 1 request per second
const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

/// crates.io adapter with rate limiting
pub struct CratesIoAdapter {
    client: HttpClient,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

/// crates.io crate response
#[derive(Debug, Deserialize)]
struct CratesIoResponse {
    versions: Vec<CrateVersion>,
}

/// Crate version information
#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    created_at: String,
    yanked: bool,
}

impl CratesIoAdapter {
    /// Create a new crates.io adapter
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: CRATES_IO_API_URL.to_string(),
            last_request: Mutex::new(None),
        }
    }

    /// Use a different API root (e.g. a sparse mirror with the same API)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the URL for a crate
    fn build_url(&self, crate_name: &str) -> String {
        format!("{}/{}", self.base_url, crate_name)
    }

    /// Wait until one interval has passed since the previous request
    async fn apply_rate_limit(&self) {
        // Holding the lock across the sleep serializes concurrent callers
        let mut last_request = self.last_request.lock().await;
        if let Some(elapsed) = last_request.map(|t| t.elapsed()) {
            if elapsed < RATE_LIMIT_INTERVAL {
                tokio::time::sleep(RATE_LIMIT_INTERVAL - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}

#[async_trait]
impl RegistryAdapter for CratesIoAdapter {
    fn package_manager(&self) -> PackageManager {
        PackageManager::Cargo
    }

    async fn fetch_versions(&self, crate_name: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        self.apply_rate_limit().await;

        let url = self.build_url(crate_name);
        let response: CratesIoResponse = self
            .client
            .get_json(&url, crate_name, self.registry_name())
            .await?;

        let mut versions: Vec<VersionInfo> = response
            .versions
            .into_iter()
            .filter(|v| !v.yanked)
            .filter_map(|v| {
                let released_at = v.created_at.parse::<DateTime<Utc>>().ok()?;
                Some(VersionInfo::new(v.num, released_at))
            })
            .collect();

        VersionInfo::sort(&mut versions);
        Ok(versions)
    }
}
