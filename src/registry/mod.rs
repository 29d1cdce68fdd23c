//! OpenUPM registry access: metadata fetching, URL parsing, local caching.

mod cache;
mod client;
mod error;
mod identity;

pub use cache::{RemoteMetadataCache, CACHE_DIR};
#[cfg(test)]
pub use client::MockRegistryClient;
pub use client::{OpenUpmClient, RegistryClient, OPENUPM_REGISTRY};
pub use error::RegistryError;
pub use identity::{cache_file_name, parse_package_url, PackageIdentity};
