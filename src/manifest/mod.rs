//! `Packages/manifest.json` access: scoped-registry configuration.

mod configurator;
mod error;
mod registry;

pub use configurator::{RegistryConfigurator, MANIFEST_PATH};
pub use error::ManifestError;
pub use registry::ManifestRegistry;
