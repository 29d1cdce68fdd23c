//! Package metadata snapshots.

use serde::{Deserialize, Serialize};

/// A package as currently installed in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLocalInfo {
    pub name: String,
    pub display_name: String,
    pub version: String,
}

impl PackageLocalInfo {
    /// The package id used by the host package manager (`name@version`).
    pub fn package_id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// A package as published in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRemoteInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
}

impl PackageRemoteInfo {
    /// True when the record carries nothing worth caching.
    pub fn is_degenerate(&self) -> bool {
        self.name.is_empty() && self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_id() {
        let local = PackageLocalInfo {
            name: "com.google.ads.mobile".to_string(),
            display_name: "Google Mobile Ads".to_string(),
            version: "9.1.0".to_string(),
        };
        assert_eq!(local.package_id(), "com.google.ads.mobile@9.1.0");
    }

    #[test]
    fn test_degenerate_remote_info() {
        assert!(PackageRemoteInfo::default().is_degenerate());

        let named = PackageRemoteInfo {
            name: "com.google.ads.mobile".to_string(),
            ..Default::default()
        };
        assert!(!named.is_degenerate());
    }
}
