//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Rate limit error handling

use crate::error::RegistryError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depgroup/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic and error context
    ///
    /// Timeouts, connection failures and 429 responses are retried with
    /// exponential backoff; 404 and other HTTP errors fail immediately.
    pub async fn get(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::debug!(url, attempt, delay_ms = delay, "retrying registry request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }

            match self.client.get(url).send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(RegistryError::rate_limit_exceeded(registry));
                }
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    return Err(RegistryError::package_not_found(package, registry));
                }
                Ok(response) if !response.status().is_success() => {
                    return Err(RegistryError::network_error(
                        package,
                        registry,
                        format!("HTTP {}", response.status()),
                    ));
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_timeout() => {
                    last_error = Some(RegistryError::timeout(package, registry));
                }
                Err(e) => {
                    last_error =
                        Some(RegistryError::network_error(package, registry, e.to_string()));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network_error(package, registry, "unknown error")))
    }

    /// Perform a GET request and decode the JSON body
    ///
    /// A body that does not decode is reported as `InvalidResponse`.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self.get(url, package, registry).await?;
        response.json::<T>().await.map_err(|e| {
            RegistryError::invalid_response(
                package,
                registry,
                format!("failed to parse JSON: {}", e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_http_client_with_config() {
        let client = HttpClient::with_config(Duration::from_secs(60), "test-agent/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_max_retries() {
        let client = HttpClient::new().unwrap().with_max_retries(5);
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert!(DEFAULT_USER_AGENT.starts_with("depgroup/"));
        assert_eq!(MAX_RETRIES, 3);
        assert_eq!(BASE_DELAY_MS, 100);
    }

    #[tokio::test]
    async fn test_get_unreachable_host_reports_network_error() {
        let client = HttpClient::with_config(Duration::from_millis(200), "test-agent/1.0")
            .unwrap()
            .with_max_retries(0);
        let result = client.get("http://127.0.0.1:9/", "pkg", "test").await;
        assert!(matches!(
            result,
            Err(RegistryError::NetworkError { .. } | RegistryError::Timeout { .. })
        ));
    }
}
