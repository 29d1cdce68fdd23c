//! Setup command - register the OpenUPM scoped registry in the manifest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::error;

use crate::manifest::{ManifestError, RegistryConfigurator};
use crate::settings::Settings;

#[derive(Args)]
pub struct SetupCmd {
    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Remove the scoped registry instead of adding it
    #[arg(long)]
    pub remove: bool,
}

impl SetupCmd {
    pub async fn run(&self) -> Result<()> {
        let settings = Settings::load_or_create(&self.project)?;
        let registry = settings.manifest_registry()?;
        let configurator = RegistryConfigurator::new(&self.project);

        let result = if self.remove {
            configurator.remove(&registry)
        } else {
            configurator.add(&registry)
        };

        match result {
            Ok(()) => {}
            Err(err @ ManifestError::NotFound(_)) => {
                // Nothing to register against; not a crash-worthy state.
                error!("{err}");
                return Ok(());
            }
            Err(err) => return Err(err).context("Failed to update manifest"),
        }

        if self.remove {
            println!("Scoped registry '{}' removed.", registry.name());
        } else if configurator.contains(&registry)? {
            println!(
                "Scoped registry '{}' is registered with {} scope(s).",
                registry.name(),
                registry.scopes().len()
            );
        }

        Ok(())
    }
}
