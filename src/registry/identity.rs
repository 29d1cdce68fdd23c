//! Package identity extraction from registry URLs.
//!
//! An OpenUPM info URL looks like `https://package.openupm.com/<name>` with
//! an optional trailing `/<version>` segment. The same URL also determines
//! the local cache filename for the package's metadata snapshot.

use tracing::warn;
use url::Url;

/// Package name and optional pinned version parsed from a registry URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub version: Option<String>,
}

/// Parse `https://<host>/<name>[/<version>]` into a package identity.
///
/// Returns `None` when the URL does not parse or has no path segments.
pub fn parse_package_url(url: &str) -> Option<PackageIdentity> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let name = segments.next()?.to_string();
    let version = segments.next().map(str::to_string);

    Some(PackageIdentity { name, version })
}

/// Derive the cache filename (without extension) for a registry URL.
///
/// The first and last path segments are joined with `@`, with a trailing
/// `.git` stripped from the last segment. A single-segment path yields just
/// that segment. Unparseable URLs yield `None`.
pub fn cache_file_name(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(url, %err, "cannot derive cache filename");
            return None;
        }
    };

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

    let first = segments.first()?;
    let last = segments.last()?;
    let repo = last.strip_suffix(".git").unwrap_or(last);

    if segments.len() == 1 {
        Some(first.to_string())
    } else {
        Some(format!("{first}@{repo}"))
    }
}
