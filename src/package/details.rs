//! Merged local + remote package view.

use super::info::{PackageLocalInfo, PackageRemoteInfo};

/// The merged view of a package: what is installed locally, what the
/// registry knows, and the install URL the package manager would be given
/// (optionally pinned to an exact version via an `@version` suffix).
#[derive(Debug, Clone)]
pub struct PackageInfoDetails {
    local: Option<PackageLocalInfo>,
    remote: Option<PackageRemoteInfo>,
    install_url: String,
    has_update: bool,
    is_fixed_version: bool,
}

impl PackageInfoDetails {
    pub fn new(
        local: Option<PackageLocalInfo>,
        remote: Option<PackageRemoteInfo>,
        install_url: impl Into<String>,
    ) -> Self {
        let install_url = install_url.into();
        let is_fixed_version = version_param(&install_url).is_some();
        let mut details = Self {
            local: None,
            remote,
            install_url,
            has_update: false,
            is_fixed_version,
        };
        details.installed(local);
        details
    }

    pub fn local(&self) -> Option<&PackageLocalInfo> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> Option<&PackageRemoteInfo> {
        self.remote.as_ref()
    }

    pub fn install_url(&self) -> &str {
        &self.install_url
    }

    pub fn is_installed(&self) -> bool {
        self.local.is_some()
    }

    /// Whether remote metadata was successfully loaded.
    pub fn is_loaded(&self) -> bool {
        self.remote.is_some()
    }

    pub fn is_fixed_version(&self) -> bool {
        self.is_fixed_version
    }

    pub fn has_update(&self) -> bool {
        self.has_update
    }

    /// The pinned version carried by the install URL, if any.
    pub fn fixed_version(&self) -> Option<&str> {
        version_param(&self.install_url)
    }

    /// Best display name available: local install first, then registry.
    pub fn display_name(&self) -> Option<&str> {
        self.local
            .as_ref()
            .map(|l| l.display_name.as_str())
            .or_else(|| self.remote.as_ref().map(|r| r.display_name.as_str()))
            .filter(|name| !name.is_empty())
    }

    /// Refresh the local half after an install/uninstall completed.
    pub fn installed(&mut self, local: Option<PackageLocalInfo>) {
        self.local = local;
        self.has_update = self.compute_has_update();
    }

    /// Pin the install URL to an exact version. An empty version clears
    /// the pin instead.
    pub fn set_fixed_version(&mut self, version: &str) {
        if version.is_empty() {
            self.remove_fixed_version();
            return;
        }

        let current = version_param(&self.install_url).map(str::to_string);
        match current.as_deref() {
            Some(current) if current == version => {}
            Some(_) => {
                // A version param implies an '@' to truncate back to.
                if let Some(at) = self.install_url.rfind('@') {
                    self.install_url.truncate(at + 1);
                    self.install_url.push_str(version);
                }
            }
            None => {
                self.install_url.push('@');
                self.install_url.push_str(version);
            }
        }
        self.is_fixed_version = true;
        self.has_update = self.compute_has_update();
    }

    /// Strip any `@version` suffix, leaving the bare package locator.
    pub fn remove_fixed_version(&mut self) {
        if let Some(at) = self.install_url.rfind('@') {
            if version_param(&self.install_url).is_some() {
                self.install_url.truncate(at);
            }
        }
        self.is_fixed_version = false;
        self.has_update = self.compute_has_update();
    }

    /// Update availability:
    /// - unknown local or remote state reports an update, so the user is
    ///   prompted to look rather than shown a false all-clear;
    /// - a pinned version compares against the installed version;
    /// - otherwise the installed version compares against the latest;
    /// - missing comparison data reports no update.
    fn compute_has_update(&self) -> bool {
        let (Some(local), Some(remote)) = (&self.local, &self.remote) else {
            return true;
        };

        if self.is_fixed_version {
            return match version_param(&self.install_url) {
                Some(pinned) => local.version != pinned,
                None => false,
            };
        }

        match &remote.latest_version {
            Some(latest) => &local.version != latest,
            None => false,
        }
    }
}

/// Extract the trailing `@version` parameter from an install URL.
///
/// Accepts an optional `v` prefix; the rest must be digits and dots
/// (`pkg@1.2.3`, `pkg@v9.0.0`).
pub fn version_param(install_url: &str) -> Option<&str> {
    let (_, suffix) = install_url.rsplit_once('@')?;
    let version = suffix.strip_prefix('v').unwrap_or(suffix);
    if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    Some(version)
}
