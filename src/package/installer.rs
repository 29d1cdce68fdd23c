//! Package installer collaborator.
//!
//! [`PackageInstaller`] is the seam between the fetch/compare core and the
//! host package manager. [`UpmProject`] implements it over a Unity project
//! directory: installed state comes from `Library/packages-lock.json`
//! (falling back to the manifest's `dependencies`), and install/uninstall
//! edit the manifest's `dependencies` map; the editor resolves the change
//! on its next focus.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::InstallError;
use super::info::PackageLocalInfo;
use crate::manifest::MANIFEST_PATH;

const LOCK_PATH: &str = "Library/packages-lock.json";
const PACKAGE_CACHE_PATH: &str = "Library/PackageCache";

/// Asynchronous, cancellable package operations against the host project.
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller {
    /// Snapshot of every installed package.
    async fn list_installed(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<PackageLocalInfo>, InstallError>;

    /// First installed package whose id (`name@version`) contains `id`,
    /// case-insensitively.
    async fn find_by_id(
        &self,
        id: &str,
        token: &CancellationToken,
    ) -> Result<Option<PackageLocalInfo>, InstallError>;

    /// Install (or update to) the given `name@version` ids.
    async fn install(
        &self,
        ids: &[String],
        token: &CancellationToken,
    ) -> Result<(), InstallError>;

    /// Uninstall packages by id or name.
    async fn uninstall(
        &self,
        ids: &[String],
        token: &CancellationToken,
    ) -> Result<(), InstallError>;
}

/// A Unity project directory acting as the package-management host.
pub struct UpmProject {
    root: PathBuf,
}

impl UpmProject {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root: project_root.as_ref().to_path_buf(),
        }
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_PATH)
    }

    /// Installed packages from the lock file, or from the manifest's
    /// dependency map when the project has not been resolved yet.
    async fn read_installed(&self) -> Result<Vec<PackageLocalInfo>, InstallError> {
        let lock_path = self.root.join(LOCK_PATH);
        let dependencies = if lock_path.exists() {
            let content = tokio::fs::read_to_string(&lock_path).await?;
            let lock: Value = serde_json::from_str(&content).map_err(std::io::Error::other)?;
            lock_dependencies(&lock)
        } else {
            debug!("no packages-lock.json, reading manifest dependencies");
            let manifest = self.load_manifest().await?;
            manifest_dependencies(&manifest)
        };

        let mut installed = Vec::with_capacity(dependencies.len());
        for (name, version) in dependencies {
            let display_name = self
                .read_display_name(&name, &version)
                .await
                .unwrap_or_else(|| name.clone());
            installed.push(PackageLocalInfo {
                name,
                display_name,
                version,
            });
        }
        Ok(installed)
    }

    /// displayName from the resolved package's own package.json, if the
    /// editor has populated its cache.
    async fn read_display_name(&self, name: &str, version: &str) -> Option<String> {
        let path = self
            .root
            .join(PACKAGE_CACHE_PATH)
            .join(format!("{name}@{version}"))
            .join("package.json");
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        let package: Value = serde_json::from_str(&content).ok()?;
        package
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    async fn load_manifest(&self) -> Result<Value, InstallError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(crate::manifest::ManifestError::NotFound(path).into());
        }
        let content = tokio::fs::read_to_string(&path).await?;
        let manifest = serde_json::from_str(&content).map_err(std::io::Error::other)?;
        Ok(manifest)
    }

    async fn save_manifest(&self, manifest: &Value) -> Result<(), InstallError> {
        let content = serde_json::to_string_pretty(manifest).map_err(std::io::Error::other)?;
        tokio::fs::write(self.manifest_path(), content).await?;
        Ok(())
    }

    async fn install_inner(&self, ids: &[String]) -> Result<(), InstallError> {
        let installed = self.read_installed().await?;
        let mut manifest = self.load_manifest().await?;
        let dependencies = manifest
            .get_mut("dependencies")
            .and_then(Value::as_object_mut)
            .ok_or(crate::manifest::ManifestError::NotAnObject)?;

        for id in ids {
            let Some((name, version)) = split_package_id(id) else {
                return Err(InstallError::MissingVersion(id.clone()));
            };

            let previous = installed.iter().find(|p| p.name == name);
            dependencies.insert(name.to_string(), json!(version));

            match previous {
                Some(prev) if prev.version == version => {
                    info!(
                        "{} ({}) Version: {version}, You have the latest version.",
                        prev.display_name, prev.name
                    );
                }
                Some(prev) => {
                    info!(
                        "{} ({}) Version: {} -> {version}, Updated.",
                        prev.display_name, prev.name, prev.version
                    );
                }
                None => {
                    info!("{name} Version: {version}, Installed.");
                }
            }
        }

        self.save_manifest(&manifest).await
    }

    async fn uninstall_inner(&self, ids: &[String]) -> Result<(), InstallError> {
        let installed = self.read_installed().await?;
        let mut manifest = self.load_manifest().await?;
        let dependencies = manifest
            .get_mut("dependencies")
            .and_then(Value::as_object_mut)
            .ok_or(crate::manifest::ManifestError::NotAnObject)?;

        let mut updated = false;
        for id in ids {
            let Some(info) = find_in(&installed, id) else {
                warn!(id = %id, "did not exist");
                continue;
            };

            if dependencies.remove(&info.name).is_some() {
                info!("Removed. Name: {} ({})", info.display_name, info.name);
                updated = true;
            } else {
                warn!(name = %info.name, "installed but not a direct dependency");
            }
        }

        if updated {
            self.save_manifest(&manifest).await?;
        }
        Ok(())
    }
}

impl PackageInstaller for UpmProject {
    async fn list_installed(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<PackageLocalInfo>, InstallError> {
        tokio::select! {
            result = self.read_installed() => result,
            _ = token.cancelled() => Err(InstallError::Cancelled),
        }
    }

    async fn find_by_id(
        &self,
        id: &str,
        token: &CancellationToken,
    ) -> Result<Option<PackageLocalInfo>, InstallError> {
        let installed = self.list_installed(token).await?;
        Ok(find_in(&installed, id).cloned())
    }

    async fn install(
        &self,
        ids: &[String],
        token: &CancellationToken,
    ) -> Result<(), InstallError> {
        tokio::select! {
            result = self.install_inner(ids) => result,
            _ = token.cancelled() => Err(InstallError::Cancelled),
        }
    }

    async fn uninstall(
        &self,
        ids: &[String],
        token: &CancellationToken,
    ) -> Result<(), InstallError> {
        tokio::select! {
            result = self.uninstall_inner(ids) => result,
            _ = token.cancelled() => Err(InstallError::Cancelled),
        }
    }
}

/// Case-insensitive substring match of `id` against installed package ids.
fn find_in<'a>(installed: &'a [PackageLocalInfo], id: &str) -> Option<&'a PackageLocalInfo> {
    let needle = id.to_lowercase();
    installed
        .iter()
        .find(|info| info.package_id().to_lowercase().contains(&needle))
}

/// Split `name@version` into its parts; bare names yield `None`.
fn split_package_id(id: &str) -> Option<(&str, &str)> {
    let (name, version) = id.rsplit_once('@')?;
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name, version))
}

fn lock_dependencies(lock: &Value) -> Vec<(String, String)> {
    let Some(dependencies) = lock.get("dependencies").and_then(Value::as_object) else {
        return Vec::new();
    };
    dependencies
        .iter()
        .filter_map(|(name, entry)| {
            let version = entry.get("version")?.as_str()?;
            Some((name.clone(), version.to_string()))
        })
        .collect()
}

fn manifest_dependencies(manifest: &Value) -> Vec<(String, String)> {
    let Some(dependencies) = manifest.get("dependencies").and_then(Value::as_object) else {
        return Vec::new();
    };
    dependencies
        .iter()
        .filter_map(|(name, version)| Some((name.clone(), version.as_str()?.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, UpmProject) {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join(MANIFEST_PATH);
        std::fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        std::fs::write(
            &manifest,
            r#"{ "dependencies": { "com.unity.ugui": "2.0.0" } }"#,
        )
        .unwrap();
        let upm = UpmProject::new(dir.path());
        (dir, upm)
    }

    fn write_lock(dir: &TempDir, content: &str) {
        let path = dir.path().join(LOCK_PATH);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_list_installed_from_lock() {
        let (dir, upm) = project();
        write_lock(
            &dir,
            r#"{
                "dependencies": {
                    "com.google.ads.mobile": { "version": "9.0.0", "source": "registry" },
                    "com.unity.ugui": { "version": "2.0.0", "source": "builtin" }
                }
            }"#,
        );

        let token = CancellationToken::new();
        let installed = upm.list_installed(&token).await.unwrap();
        assert_eq!(installed.len(), 2);

        let ads = installed
            .iter()
            .find(|p| p.name == "com.google.ads.mobile")
            .unwrap();
        assert_eq!(ads.version, "9.0.0");
        // No package cache in the fixture, so the name stands in.
        assert_eq!(ads.display_name, "com.google.ads.mobile");
    }

    #[tokio::test]
    async fn test_list_installed_falls_back_to_manifest() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();

        let installed = upm.list_installed(&token).await.unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].name, "com.unity.ugui");
    }

    #[tokio::test]
    async fn test_display_name_from_package_cache() {
        let (dir, upm) = project();
        write_lock(
            &dir,
            r#"{ "dependencies": { "com.google.ads.mobile": { "version": "9.0.0" } } }"#,
        );
        let cache = dir
            .path()
            .join(PACKAGE_CACHE_PATH)
            .join("com.google.ads.mobile@9.0.0");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(
            cache.join("package.json"),
            r#"{ "name": "com.google.ads.mobile", "displayName": "Google Mobile Ads" }"#,
        )
        .unwrap();

        let token = CancellationToken::new();
        let found = upm
            .find_by_id("com.google.ads.mobile", &token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.display_name, "Google Mobile Ads");
    }

    #[tokio::test]
    async fn test_find_by_id_is_case_insensitive_substring() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();

        let found = upm.find_by_id("Unity.UGUI", &token).await.unwrap();
        assert_eq!(found.unwrap().name, "com.unity.ugui");

        let missing = upm.find_by_id("com.absent", &token).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_install_writes_dependency() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();

        upm.install(&["com.google.ads.mobile@9.0.0".to_string()], &token)
            .await
            .unwrap();

        let manifest: Value = serde_json::from_str(
            &std::fs::read_to_string(upm.manifest_path()).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["dependencies"]["com.google.ads.mobile"], "9.0.0");
        // Pre-existing dependencies are untouched.
        assert_eq!(manifest["dependencies"]["com.unity.ugui"], "2.0.0");
    }

    #[tokio::test]
    async fn test_install_requires_version() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();

        let err = upm
            .install(&["com.google.ads.mobile".to_string()], &token)
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::MissingVersion(_)));
    }

    #[tokio::test]
    async fn test_uninstall_removes_dependency() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();

        upm.uninstall(&["com.unity.ugui".to_string()], &token)
            .await
            .unwrap();

        let manifest: Value = serde_json::from_str(
            &std::fs::read_to_string(upm.manifest_path()).unwrap(),
        )
        .unwrap();
        assert!(manifest["dependencies"].get("com.unity.ugui").is_none());
    }

    #[tokio::test]
    async fn test_uninstall_unknown_is_a_noop() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();

        upm.uninstall(&["com.absent".to_string()], &token)
            .await
            .unwrap();

        let manifest: Value = serde_json::from_str(
            &std::fs::read_to_string(upm.manifest_path()).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["dependencies"]["com.unity.ugui"], "2.0.0");
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts() {
        let (_dir, upm) = project();
        let token = CancellationToken::new();
        token.cancel();

        let err = upm.list_installed(&token).await.unwrap_err();
        assert!(matches!(err, InstallError::Cancelled));
    }

    #[test]
    fn test_split_package_id() {
        assert_eq!(
            split_package_id("com.pkg@1.2.3"),
            Some(("com.pkg", "1.2.3"))
        );
        assert_eq!(split_package_id("com.pkg"), None);
        assert_eq!(split_package_id("@1.2.3"), None);
        assert_eq!(split_package_id("com.pkg@"), None);
    }
}
