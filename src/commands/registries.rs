//! Registries command - list scoped registries from the manifest.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::manifest::{ManifestError, RegistryConfigurator};

#[derive(Args)]
pub struct RegistriesCmd {
    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,
}

impl RegistriesCmd {
    pub async fn run(&self) -> Result<()> {
        let configurator = RegistryConfigurator::new(&self.project);

        let registries = match configurator.get_all() {
            Ok(registries) => registries,
            Err(err @ ManifestError::NotFound(_)) => {
                println!("{err}");
                println!("Run from a Unity project root, or pass --project.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        if registries.is_empty() {
            println!("No scoped registries configured. Run `admix setup` to add OpenUPM.");
            return Ok(());
        }

        for registry in &registries {
            println!("{registry}");
            for scope in registry.scopes() {
                println!("  {scope}");
            }
        }

        Ok(())
    }
}
