//! Helpers shared by the package-facing commands.

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::package::{PackageInfoDetails, PackageInfoFetcher, UpmProject};
use crate::registry::{OpenUpmClient, RemoteMetadataCache};
use crate::settings::ScopeSettings;

/// Build a fetcher over the given Unity project directory.
pub fn project_fetcher(project_root: &Path) -> PackageInfoFetcher<UpmProject, OpenUpmClient> {
    PackageInfoFetcher::new(
        UpmProject::new(project_root),
        OpenUpmClient::new(),
        RemoteMetadataCache::new(project_root),
    )
}

/// Fetch merged details for one configured scope, applying its pinned
/// version from settings.
pub async fn fetch_scope_details(
    fetcher: &mut PackageInfoFetcher<UpmProject, OpenUpmClient>,
    scope: &ScopeSettings,
    force_reload: bool,
    token: &CancellationToken,
) -> Result<PackageInfoDetails> {
    let mut details = fetcher
        .fetch_package_info(&scope.info_url, force_reload, token)
        .await
        .with_context(|| format!("Failed to fetch info for {}", scope.package_name()))?;

    if let Some(version) = scope.fixed_version.as_deref() {
        details.set_fixed_version(version);
    }
    Ok(details)
}

/// The `name@version` id to install for a scope: the pinned version when
/// set, otherwise the latest known remote version.
pub fn install_id(details: &PackageInfoDetails, scope: &ScopeSettings) -> Result<String> {
    if details.is_fixed_version() {
        return Ok(details.install_url().to_string());
    }

    let latest = details
        .remote()
        .and_then(|remote| remote.latest_version.as_deref())
        .with_context(|| {
            format!(
                "No version available for {}; the registry fetch returned no latest version",
                scope.package_name()
            )
        })?;
    Ok(format!("{}@{latest}", details.install_url()))
}
