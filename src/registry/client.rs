//! OpenUPM registry client.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::RegistryError;
use crate::package::PackageRemoteInfo;

pub const OPENUPM_REGISTRY: &str = "https://package.openupm.com";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A registry metadata source.
#[cfg_attr(test, mockall::automock)]
pub trait RegistryClient {
    /// Fetch package metadata from a full package info URL.
    async fn fetch(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<PackageRemoteInfo, RegistryError>;
}

/// Client for the OpenUPM package registry.
///
/// OpenUPM serves npm-style package documents: a `versions` map keyed by
/// version string and a `dist-tags.latest` pointer.
pub struct OpenUpmClient {
    client: Client,
}

impl OpenUpmClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl RegistryClient for OpenUpmClient {
    /// Cancelling the token abandons the in-flight request.
    async fn fetch(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<PackageRemoteInfo, RegistryError> {
        debug!(url, "fetching package info");

        let response = tokio::select! {
            response = self.client.get(url).send() => response?,
            _ = token.cancelled() => return Err(RegistryError::Cancelled),
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound(url.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::BadResponse { status, body });
        }

        let doc: PackageDocument = tokio::select! {
            doc = response.json() => doc?,
            _ = token.cancelled() => return Err(RegistryError::Cancelled),
        };

        Ok(doc.into_remote_info())
    }
}

impl Default for OpenUpmClient {
    fn default() -> Self {
        Self::new()
    }
}

// npm-style registry response types.
#[derive(Debug, Deserialize)]
struct PackageDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    versions: HashMap<String, VersionEntry>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

impl PackageDocument {
    fn into_remote_info(self) -> PackageRemoteInfo {
        let mut versions: Vec<String> = self.versions.keys().cloned().collect();
        versions.sort();

        // Explicit latest tag wins; otherwise fall back to the maximal key.
        let latest_version = self
            .dist_tags
            .get("latest")
            .cloned()
            .or_else(|| versions.last().cloned());

        let display_name = self
            .versions
            .values()
            .find_map(|entry| entry.display_name.clone())
            .unwrap_or_default();

        PackageRemoteInfo {
            name: self.name,
            display_name,
            versions,
            latest_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PackageRemoteInfo {
        let doc: PackageDocument = serde_json::from_str(json).unwrap();
        doc.into_remote_info()
    }

    #[test]
    fn test_parse_full_document() {
        let info = parse(
            r#"{
                "name": "com.google.ads.mobile",
                "dist-tags": { "latest": "9.1.0" },
                "versions": {
                    "9.0.0": { "displayName": "Google Mobile Ads" },
                    "9.1.0": { "displayName": "Google Mobile Ads" }
                }
            }"#,
        );

        assert_eq!(info.name, "com.google.ads.mobile");
        assert_eq!(info.display_name, "Google Mobile Ads");
        assert_eq!(info.latest_version, Some("9.1.0".to_string()));
        assert_eq!(info.versions, vec!["9.0.0", "9.1.0"]);
    }

    #[test]
    fn test_latest_falls_back_to_max_version() {
        let info = parse(
            r#"{
                "name": "com.google.ads.mobile",
                "versions": {
                    "8.7.0": {},
                    "9.0.0": {}
                }
            }"#,
        );
        assert_eq!(info.latest_version, Some("9.0.0".to_string()));
    }

    #[test]
    fn test_display_name_from_any_version_entry() {
        let info = parse(
            r#"{
                "name": "com.pkg",
                "versions": {
                    "1.0.0": {},
                    "1.1.0": { "displayName": "Pkg" }
                }
            }"#,
        );
        assert_eq!(info.display_name, "Pkg");
    }

    #[test]
    fn test_empty_document() {
        let info = parse("{}");
        assert!(info.is_degenerate());
        assert_eq!(info.latest_version, None);
    }

    // Integration test hits the live OpenUPM registry.
    #[tokio::test]
    #[ignore]
    async fn test_fetch_google_mobile_ads() {
        let client = OpenUpmClient::new();
        let token = CancellationToken::new();
        let info = client
            .fetch(
                "https://package.openupm.com/com.google.ads.mobile",
                &token,
            )
            .await
            .unwrap();
        assert_eq!(info.name, "com.google.ads.mobile");
        assert!(!info.versions.is_empty());
    }
}
