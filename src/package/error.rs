//! Package install/fetch errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    /// A fetch or install failed; carries the context needed to act on it.
    #[error("{message}\n{}package.json url: {info_url}\nInstall url: {install_url}",
        .package.as_ref().map(|p| format!("Package: {p}\n")).unwrap_or_default())]
    Failed {
        message: String,
        /// "Display Name (package.name)" when the package was identified.
        package: Option<String>,
        info_url: String,
        install_url: String,
    },

    #[error("no version to install for '{0}'; pass name@version")]
    MissingVersion(String),

    #[error("manifest error: {0}")]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl InstallError {
    /// Wrap any error with the fetch context the UI needs to display.
    pub fn with_context(
        err: impl std::fmt::Display,
        package: Option<String>,
        info_url: &str,
        install_url: &str,
    ) -> Self {
        Self::Failed {
            message: err.to_string(),
            package,
            info_url: info_url.to_string(),
            install_url: install_url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_with_known_package() {
        let err = InstallError::with_context(
            "timed out",
            Some("Google Mobile Ads (com.google.ads.mobile)".to_string()),
            "https://package.openupm.com/com.google.ads.mobile",
            "com.google.ads.mobile",
        );
        let text = err.to_string();
        assert!(text.starts_with("timed out"));
        assert!(text.contains("Package: Google Mobile Ads (com.google.ads.mobile)"));
        assert!(text.contains("Install url: com.google.ads.mobile"));
    }

    #[test]
    fn test_context_without_package() {
        let err = InstallError::with_context(
            "connection refused",
            None,
            "https://package.openupm.com/com.pkg",
            "com.pkg",
        );
        let text = err.to_string();
        assert!(!text.contains("Package:"));
        assert!(text.contains("package.json url: https://package.openupm.com/com.pkg"));
    }
}
