//! Package info fetch orchestration.
//!
//! Combines the local package lookup, the metadata cache, and the registry
//! client into a single [`PackageInfoDetails`] answer per package URL.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::details::PackageInfoDetails;
use super::error::InstallError;
use super::installer::PackageInstaller;
use crate::registry::{
    parse_package_url, RegistryClient, RemoteMetadataCache, OPENUPM_REGISTRY,
};

/// Fetches and merges package metadata for OpenUPM info URLs.
///
/// A fetcher runs one fetch at a time: starting a new one cancels whatever
/// was still in flight. Fetchers for different packages are independent.
pub struct PackageInfoFetcher<I, C> {
    installer: I,
    client: C,
    cache: RemoteMetadataCache,
    current: Option<CancellationToken>,
}

impl<I, C> PackageInfoFetcher<I, C>
where
    I: PackageInstaller,
    C: RegistryClient,
{
    pub fn new(installer: I, client: C, cache: RemoteMetadataCache) -> Self {
        Self {
            installer,
            client,
            cache,
            current: None,
        }
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Cancel the in-flight fetch, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Fetch merged package info for an OpenUPM info URL.
    ///
    /// Remote metadata comes from the local cache unless `force_reload` is
    /// set or the cache misses; a live fetch writes back through the cache.
    /// All failures surface as a single [`InstallError`] carrying the
    /// package and URL context.
    pub async fn fetch_package_info(
        &mut self,
        info_url: &str,
        force_reload: bool,
        token: &CancellationToken,
    ) -> Result<PackageInfoDetails, InstallError> {
        if !info_url.starts_with(OPENUPM_REGISTRY) {
            return Err(InstallError::with_context(
                format!(
                    "invalid package url. Use the format: {OPENUPM_REGISTRY}/{{package-name}}"
                ),
                None,
                info_url,
                "",
            ));
        }

        // Replace any previous fetch's cancellation scope.
        self.cancel();
        let scope = token.child_token();
        self.current = Some(scope.clone());

        let install_url = resolve_install_url(info_url);
        let result = self
            .fetch_inner(info_url, &install_url, force_reload, &scope)
            .await;
        self.current = None;
        result
    }

    async fn fetch_inner(
        &self,
        info_url: &str,
        install_url: &str,
        force_reload: bool,
        token: &CancellationToken,
    ) -> Result<PackageInfoDetails, InstallError> {
        let name = parse_package_url(info_url)
            .map(|id| id.name)
            .unwrap_or_default();

        let local = self
            .installer
            .find_by_id(&name, token)
            .await
            .map_err(|err| {
                InstallError::with_context(err, None, info_url, install_url)
            })?;
        // "Display Name (package.name)" for error context from here on.
        let package_label = local
            .as_ref()
            .map(|l| format!("{} ({})", l.display_name, l.name));

        let mut remote = None;
        if !force_reload {
            remote = self.cache.read(info_url).await;
        }

        if remote.is_none() {
            let fetched = self.client.fetch(info_url, token).await.map_err(|err| {
                InstallError::with_context(err, package_label.clone(), info_url, install_url)
            })?;
            // Cache trouble costs a refetch later, nothing more.
            match self.cache.write(info_url, &fetched).await {
                Ok(true) => debug!(info_url, "remote metadata cached"),
                Ok(false) => {}
                Err(err) => warn!(info_url, %err, "failed to update metadata cache"),
            }
            remote = Some(fetched);
        }

        Ok(PackageInfoDetails::new(local, remote, install_url))
    }
}

/// The install locator for an info URL: the package name, pinned with
/// `@version` when the URL carries an explicit version other than
/// `latest`.
fn resolve_install_url(info_url: &str) -> String {
    let Some(identity) = parse_package_url(info_url) else {
        return String::new();
    };
    match identity.version {
        Some(version) if version != "latest" => format!("{}@{version}", identity.name),
        _ => identity.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::info::{PackageLocalInfo, PackageRemoteInfo};
    use crate::package::installer::MockPackageInstaller;
    use crate::registry::{MockRegistryClient, RegistryError};
    use tempfile::TempDir;

    const URL: &str = "https://package.openupm.com/com.google.ads.mobile";

    fn local_info() -> PackageLocalInfo {
        PackageLocalInfo {
            name: "com.google.ads.mobile".to_string(),
            display_name: "Google Mobile Ads".to_string(),
            version: "9.0.0".to_string(),
        }
    }

    fn remote_info(latest: &str) -> PackageRemoteInfo {
        PackageRemoteInfo {
            name: "com.google.ads.mobile".to_string(),
            display_name: "Google Mobile Ads".to_string(),
            versions: vec![latest.to_string()],
            latest_version: Some(latest.to_string()),
        }
    }

    fn installer_with_local() -> MockPackageInstaller {
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_find_by_id()
            .returning(|_, _| Ok(Some(local_info())));
        installer
    }

    fn fetcher_with(
        dir: &TempDir,
        installer: MockPackageInstaller,
        client: MockRegistryClient,
    ) -> PackageInfoFetcher<MockPackageInstaller, MockRegistryClient> {
        PackageInfoFetcher::new(installer, client, RemoteMetadataCache::new(dir.path()))
    }

    #[test]
    fn test_resolve_install_url() {
        assert_eq!(resolve_install_url(URL), "com.google.ads.mobile");
        assert_eq!(
            resolve_install_url("https://package.openupm.com/com.pkg/1.2.3"),
            "com.pkg@1.2.3"
        );
        assert_eq!(
            resolve_install_url("https://package.openupm.com/com.pkg/latest"),
            "com.pkg"
        );
    }

    #[tokio::test]
    async fn test_rejects_foreign_urls() {
        let dir = TempDir::new().unwrap();
        let mut fetcher =
            fetcher_with(&dir, MockPackageInstaller::new(), MockRegistryClient::new());
        let token = CancellationToken::new();

        let err = fetcher
            .fetch_package_info("https://registry.npmjs.org/react", false, &token)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid package url"));
    }

    #[tokio::test]
    async fn test_cached_metadata_avoids_network() {
        let dir = TempDir::new().unwrap();
        let cache = RemoteMetadataCache::new(dir.path());
        cache.write(URL, &remote_info("9.0.0")).await.unwrap();

        let mut client = MockRegistryClient::new();
        client.expect_fetch().never();

        let mut fetcher = fetcher_with(&dir, installer_with_local(), client);
        let token = CancellationToken::new();

        let details = fetcher
            .fetch_package_info(URL, false, &token)
            .await
            .unwrap();

        assert!(details.is_installed());
        assert!(details.is_loaded());
        assert_eq!(
            details.remote().unwrap().latest_version.as_deref(),
            Some("9.0.0")
        );
        assert!(!details.has_update());
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_writes_back() {
        let dir = TempDir::new().unwrap();

        let mut client = MockRegistryClient::new();
        client
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(remote_info("9.1.0")));

        let mut fetcher = fetcher_with(&dir, installer_with_local(), client);
        let token = CancellationToken::new();

        let details = fetcher
            .fetch_package_info(URL, false, &token)
            .await
            .unwrap();
        assert!(details.has_update());

        // The live result is now cached.
        let cached = RemoteMetadataCache::new(dir.path()).read(URL).await.unwrap();
        assert_eq!(cached.latest_version.as_deref(), Some("9.1.0"));
    }

    #[tokio::test]
    async fn test_force_reload_bypasses_cache_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = RemoteMetadataCache::new(dir.path());
        cache.write(URL, &remote_info("9.0.0")).await.unwrap();

        let mut client = MockRegistryClient::new();
        client
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(remote_info("9.1.0")));

        let mut fetcher = fetcher_with(&dir, installer_with_local(), client);
        let token = CancellationToken::new();

        let details = fetcher.fetch_package_info(URL, true, &token).await.unwrap();
        assert_eq!(
            details.remote().unwrap().latest_version.as_deref(),
            Some("9.1.0")
        );

        let cached = cache.read(URL).await.unwrap();
        assert_eq!(cached.latest_version.as_deref(), Some("9.1.0"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_wrapped_with_package_context() {
        let dir = TempDir::new().unwrap();

        let mut client = MockRegistryClient::new();
        client.expect_fetch().returning(|url, _| {
            Err(RegistryError::PackageNotFound(url.to_string()))
        });

        let mut fetcher = fetcher_with(&dir, installer_with_local(), client);
        let token = CancellationToken::new();

        let err = fetcher
            .fetch_package_info(URL, false, &token)
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("package not found"));
        assert!(text.contains("Package: Google Mobile Ads (com.google.ads.mobile)"));
        assert!(text.contains("Install url: com.google.ads.mobile"));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_wrapped_with_context() {
        let dir = TempDir::new().unwrap();
        let mut installer = MockPackageInstaller::new();
        installer.expect_find_by_id().returning(|_, _| {
            Err(InstallError::Io(std::io::Error::other("lock file unreadable")))
        });

        let mut fetcher = fetcher_with(&dir, installer, MockRegistryClient::new());
        let token = CancellationToken::new();

        let err = fetcher
            .fetch_package_info(URL, false, &token)
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("package.json url: https://package.openupm.com/com.google.ads.mobile"));
        assert!(text.contains("Install url: com.google.ads.mobile"));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut fetcher =
            fetcher_with(&dir, MockPackageInstaller::new(), MockRegistryClient::new());
        fetcher.cancel();
        fetcher.cancel();
    }
}
