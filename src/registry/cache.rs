//! On-disk cache for fetched registry metadata.
//!
//! One JSON file per package under `Library/PackageCache-Admix/`, named
//! after the source URL (see [`super::identity::cache_file_name`]). The
//! cache is purely an optimization: a missing or unreadable entry is a
//! cache miss, never an error, and deleting the directory only costs a
//! network round-trip.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::identity::cache_file_name;
use crate::package::PackageRemoteInfo;

pub const CACHE_DIR: &str = "Library/PackageCache-Admix";

/// Advisory metadata cache rooted in a Unity project directory.
pub struct RemoteMetadataCache {
    root: PathBuf,
}

impl RemoteMetadataCache {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root: project_root.as_ref().join(CACHE_DIR),
        }
    }

    /// Read the cached snapshot for a registry URL.
    ///
    /// Returns `None` on a miss, including when the file exists but cannot
    /// be parsed; the caller falls through to a live fetch.
    pub async fn read(&self, url: &str) -> Option<PackageRemoteInfo> {
        let path = self.entry_path(url)?;
        let content = tokio::fs::read_to_string(&path).await.ok()?;

        match serde_json::from_str(&content) {
            Ok(info) => {
                debug!(url, path = %path.display(), "cache hit");
                Some(info)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "unreadable cache entry, treating as miss");
                None
            }
        }
    }

    /// Persist a snapshot for a registry URL, creating parent directories.
    ///
    /// Returns `false` when the write was skipped (degenerate record or
    /// underivable filename).
    pub async fn write(&self, url: &str, info: &PackageRemoteInfo) -> Result<bool, std::io::Error> {
        if info.is_degenerate() {
            debug!(url, "skipping cache write for empty record");
            return Ok(false);
        }
        let Some(path) = self.entry_path(url) else {
            return Ok(false);
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Full-document write; serialization happens before the file is touched.
        let content = serde_json::to_string_pretty(info).map_err(std::io::Error::other)?;
        tokio::fs::write(&path, content).await?;

        debug!(url, path = %path.display(), "cache updated");
        Ok(true)
    }

    fn entry_path(&self, url: &str) -> Option<PathBuf> {
        Some(self.root.join(format!("{}.json", cache_file_name(url)?)))
    }
}
