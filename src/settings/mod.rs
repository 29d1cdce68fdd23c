//! Project settings repository.
//!
//! Settings live in `ProjectSettings/Admix.toml` inside the Unity project:
//! the scoped registry to register, the required Google Mobile Ads scope,
//! and the optional mediation-adapter scopes. The repository is explicit:
//! callers own a `Settings` value loaded through [`Settings::load_or_create`];
//! there is no ambient global.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::manifest::ManifestRegistry;

pub const SETTINGS_PATH: &str = "ProjectSettings/Admix.toml";

/// Whether a scope is always active or user-toggleable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The ad SDK itself; cannot be disabled.
    Required,
    /// A mediation adapter the user may turn on or off.
    Optional { enabled: bool },
}

impl ScopeKind {
    pub fn is_enabled(&self) -> bool {
        match self {
            ScopeKind::Required => true,
            ScopeKind::Optional { enabled } => *enabled,
        }
    }
}

/// One managed package: where to fetch its metadata, where its docs live,
/// and an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSettings {
    pub info_url: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
}

impl ScopeSettings {
    /// Short package name: the last path segment of the info URL.
    pub fn package_name(&self) -> &str {
        self.info_url
            .rsplit('/')
            .next()
            .unwrap_or(self.info_url.as_str())
    }

    fn normalize(&mut self) {
        // Older settings files carried a "/latest" suffix on info URLs.
        if let Some(stripped) = self.info_url.strip_suffix("/latest") {
            self.info_url = stripped.to_string();
        }
    }
}

/// An optional scope with its enabled flag, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub scope: ScopeSettings,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    pub name: String,
    pub url: String,
    pub scopes: Vec<String>,
}

/// The full settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub registry: RegistrySettings,
    /// The required Google Mobile Ads scope.
    pub sdk: ScopeSettings,
    /// Optional mediation adapters.
    #[serde(default)]
    pub adapters: Vec<AdapterSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        let adapter = |name: &str, help: &str| AdapterSettings {
            enabled: false,
            scope: ScopeSettings {
                info_url: format!("https://package.openupm.com/{name}"),
                help_url: help.to_string(),
                fixed_version: None,
            },
        };

        Self {
            registry: RegistrySettings {
                name: "package.openupm.com".to_string(),
                url: "https://package.openupm.com".to_string(),
                scopes: vec![
                    "com.google.ads.mobile".to_string(),
                    "com.google.external-dependency-manager".to_string(),
                ],
            },
            sdk: ScopeSettings {
                info_url: "https://package.openupm.com/com.google.ads.mobile".to_string(),
                help_url: "https://developers.google.com/admob/unity/quick-start".to_string(),
                fixed_version: None,
            },
            adapters: vec![
                adapter(
                    "com.google.ads.mobile.mediation.unityads",
                    "https://developers.google.com/admob/unity/mediation/unity",
                ),
                adapter(
                    "com.google.ads.mobile.mediation.applovin",
                    "https://developers.google.com/admob/unity/mediation/applovin",
                ),
                adapter(
                    "com.google.ads.mobile.mediation.liftoffmonetize",
                    "https://developers.google.com/admob/unity/mediation/liftoff-monetize",
                ),
                adapter(
                    "com.google.ads.mobile.mediation.pangle",
                    "https://developers.google.com/admob/unity/mediation/pangle",
                ),
            ],
        }
    }
}

impl Settings {
    /// Load settings from the project, seeding the default file when none
    /// exists yet.
    pub fn load_or_create(project_root: impl AsRef<Path>) -> Result<Self> {
        let path = Self::settings_path(project_root.as_ref());

        if !path.exists() {
            let settings = Self::default();
            settings.save_to(&path)?;
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&path).context("Failed to read settings file")?;
        let mut settings: Settings =
            toml::from_str(&content).context("Failed to parse settings file")?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save(&self, project_root: impl AsRef<Path>) -> Result<()> {
        self.save_to(&Self::settings_path(project_root.as_ref()))
    }

    pub fn settings_path(project_root: &Path) -> PathBuf {
        project_root.join(SETTINGS_PATH)
    }

    /// The scoped registry to register in the manifest.
    pub fn manifest_registry(&self) -> Result<ManifestRegistry> {
        ManifestRegistry::new(
            self.registry.name.clone(),
            self.registry.url.clone(),
            self.registry.scopes.clone(),
        )
        .context("Invalid registry settings")
    }

    /// All scopes with their kind, SDK first.
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeKind, &ScopeSettings)> {
        std::iter::once((ScopeKind::Required, &self.sdk)).chain(
            self.adapters.iter().map(|adapter| {
                (
                    ScopeKind::Optional {
                        enabled: adapter.enabled,
                    },
                    &adapter.scope,
                )
            }),
        )
    }

    /// Find a scope whose info URL contains `fragment`.
    pub fn scope_by_name(&self, fragment: &str) -> Option<(ScopeKind, &ScopeSettings)> {
        self.scopes()
            .find(|(_, scope)| scope.info_url.contains(fragment))
    }

    /// Mutable lookup for pin/unpin edits.
    pub fn scope_by_name_mut(&mut self, fragment: &str) -> Option<&mut ScopeSettings> {
        if self.sdk.info_url.contains(fragment) {
            return Some(&mut self.sdk);
        }
        self.adapters
            .iter_mut()
            .map(|adapter| &mut adapter.scope)
            .find(|scope| scope.info_url.contains(fragment))
    }

    fn normalize(&mut self) {
        self.sdk.normalize();
        for adapter in &mut self.adapters {
            adapter.scope.normalize();
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content).context("Failed to write settings file")
    }
}
