//! Scoped-registry editing in `Packages/manifest.json`.
//!
//! The manifest is read and written as a raw JSON document so that every
//! key other than `scopedRegistries` passes through untouched. Mutations
//! are idempotent and only persist when something actually changed; the
//! Unity editor re-resolves packages on its own once the manifest file
//! changes, so no explicit resolve call is needed here.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::{info, warn};

use super::error::ManifestError;
use super::registry::ManifestRegistry;

pub const MANIFEST_PATH: &str = "Packages/manifest.json";

const KEY_SCOPED_REGISTRIES: &str = "scopedRegistries";
const KEY_URL: &str = "url";
const KEY_SCOPES: &str = "scopes";

/// Reads, mutates, and persists the manifest's `scopedRegistries` section.
pub struct RegistryConfigurator {
    manifest_path: PathBuf,
}

impl RegistryConfigurator {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            manifest_path: project_root.as_ref().join(MANIFEST_PATH),
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// True when the manifest already routes every scope of `registry`
    /// through an entry matching its URL.
    pub fn contains(&self, registry: &ManifestRegistry) -> Result<bool, ManifestError> {
        let manifest = self.load()?;
        let Some(existing) = find_registry(&manifest, registry.url()) else {
            return Ok(false);
        };
        let Some(scopes) = existing.get(KEY_SCOPES).and_then(Value::as_array) else {
            return Ok(false);
        };

        Ok(registry
            .scopes()
            .iter()
            .all(|scope| contains_scope(scopes, scope)))
    }

    /// All scoped registries in the manifest. Entries that do not fit the
    /// expected shape are skipped.
    pub fn get_all(&self) -> Result<Vec<ManifestRegistry>, ManifestError> {
        let manifest = self.load()?;
        let Some(entries) = scoped_registries(&manifest) else {
            return Ok(Vec::new());
        };

        Ok(entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect())
    }

    /// The registry entry matching `url` (substring match), if any.
    pub fn get_by_url(&self, url: &str) -> Result<Option<ManifestRegistry>, ManifestError> {
        let manifest = self.load()?;
        Ok(find_registry(&manifest, url)
            .and_then(|entry| serde_json::from_value(entry.clone()).ok()))
    }

    /// Ensure `registry` is present: append missing scopes to an existing
    /// entry with the same URL, or add a brand-new entry. No-op when the
    /// manifest already has everything.
    pub fn add(&self, registry: &ManifestRegistry) -> Result<(), ManifestError> {
        let mut manifest = self.load()?;
        let entries = scoped_registries_mut(&mut manifest)?;
        let mut updated = false;

        if let Some(index) = find_registry_index(entries, registry.url()) {
            let scopes = entries[index]
                .as_object_mut()
                .ok_or(ManifestError::NotAnObject)?
                .entry(KEY_SCOPES)
                .or_insert_with(|| json!([]));
            let scopes = scopes.as_array_mut().ok_or(ManifestError::NotAnObject)?;

            for scope in registry.scopes() {
                if !contains_scope(scopes, scope) {
                    scopes.push(json!(scope));
                    info!(scope = %scope, "added scope to existing registry");
                    updated = true;
                }
            }
        } else {
            entries.push(serde_json::to_value(registry)?);
            info!(registry = %registry, "added new scoped registry");
            updated = true;
        }

        if updated {
            self.save(&manifest)?;
        }
        Ok(())
    }

    /// Remove the registry whose entry matches `url` from the manifest.
    pub fn remove_url(&self, url: &str) -> Result<(), ManifestError> {
        match self.get_by_url(url)? {
            Some(registry) => self.remove(&registry),
            None => {
                warn!(url, "registry not found in manifest");
                Ok(())
            }
        }
    }

    /// Remove `registry`'s scopes from its manifest entry; the entry
    /// itself goes away once no scopes are left.
    pub fn remove(&self, registry: &ManifestRegistry) -> Result<(), ManifestError> {
        let mut manifest = self.load()?;
        let Some(entries) = scoped_registries_value_mut(&mut manifest) else {
            warn!(registry = %registry, "manifest has no scoped registries");
            return Ok(());
        };
        let mut updated = false;

        let Some(index) = find_registry_index(entries, registry.url()) else {
            warn!(registry = %registry, "registry not found in scoped registries");
            return Ok(());
        };

        let remove_entry = match entries[index].get_mut(KEY_SCOPES).and_then(Value::as_array_mut) {
            Some(scopes) => {
                for scope in registry.scopes() {
                    let before = scopes.len();
                    scopes.retain(|existing| {
                        !existing
                            .as_str()
                            .is_some_and(|s| s.eq_ignore_ascii_case(scope))
                    });
                    if scopes.len() != before {
                        info!(scope = %scope, registry = %registry, "removed scope from registry");
                        updated = true;
                    }
                }
                scopes.is_empty()
            }
            // No scopes array at all: nothing routes through the entry.
            None => true,
        };

        if remove_entry {
            entries.remove(index);
            info!(registry = %registry, "removed registry, no scopes left");
            updated = true;
        }

        if updated {
            self.save(&manifest)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Value, ManifestError> {
        if !self.manifest_path.exists() {
            return Err(ManifestError::NotFound(self.manifest_path.clone()));
        }
        let content = std::fs::read_to_string(&self.manifest_path)?;
        let manifest: Value = serde_json::from_str(&content)?;
        if !manifest.is_object() {
            return Err(ManifestError::NotAnObject);
        }
        Ok(manifest)
    }

    fn save(&self, manifest: &Value) -> Result<(), ManifestError> {
        let content = serde_json::to_string_pretty(manifest)?;
        std::fs::write(&self.manifest_path, content)?;
        info!(path = %self.manifest_path.display(), "manifest saved, editor will re-resolve");
        Ok(())
    }
}

fn scoped_registries(manifest: &Value) -> Option<&Vec<Value>> {
    manifest.get(KEY_SCOPED_REGISTRIES)?.as_array()
}

fn scoped_registries_value_mut(manifest: &mut Value) -> Option<&mut Vec<Value>> {
    manifest.get_mut(KEY_SCOPED_REGISTRIES)?.as_array_mut()
}

/// Get the `scopedRegistries` array, creating it when absent.
fn scoped_registries_mut(manifest: &mut Value) -> Result<&mut Vec<Value>, ManifestError> {
    let obj = manifest.as_object_mut().ok_or(ManifestError::NotAnObject)?;
    obj.entry(KEY_SCOPED_REGISTRIES)
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or(ManifestError::NotAnObject)
}

/// Match an entry whose url contains `url`, so host-qualified variants of
/// the same registry endpoint still match.
fn entry_matches(entry: &Value, url: &str) -> bool {
    entry
        .get(KEY_URL)
        .and_then(Value::as_str)
        .is_some_and(|existing| existing.contains(url))
}

fn find_registry<'a>(manifest: &'a Value, url: &str) -> Option<&'a Value> {
    scoped_registries(manifest)?
        .iter()
        .find(|entry| entry_matches(entry, url))
}

fn find_registry_index(entries: &[Value], url: &str) -> Option<usize> {
    entries.iter().position(|entry| entry_matches(entry, url))
}

fn contains_scope(scopes: &[Value], scope: &str) -> bool {
    scopes.iter().any(|existing| {
        existing
            .as_str()
            .is_some_and(|s| s.eq_ignore_ascii_case(scope))
    })
}
