//! Scoped registry record.

use serde::{Deserialize, Serialize};

use super::error::ManifestError;

/// A scoped package source as it appears in `Packages/manifest.json`:
/// a display name, the registry endpoint, and the package-name prefixes
/// routed through it. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRegistry {
    name: String,
    url: String,
    scopes: Vec<String>,
}

impl ManifestRegistry {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        scopes: Vec<String>,
    ) -> Result<Self, ManifestError> {
        let name = name.into();
        let url = url.into();

        if name.is_empty() {
            return Err(ManifestError::InvalidRegistry("name is empty".to_string()));
        }
        if url.is_empty() {
            return Err(ManifestError::InvalidRegistry("url is empty".to_string()));
        }
        if scopes.is_empty() || scopes.iter().any(|s| s.is_empty()) {
            return Err(ManifestError::InvalidRegistry(
                "scopes are empty".to_string(),
            ));
        }

        Ok(Self { name, url, scopes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl std::fmt::Display for ManifestRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.url)
    }
}
