//! Pin command - fix a package to an exact version.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::settings::Settings;

#[derive(Args)]
pub struct PinCmd {
    /// Package name fragment (e.g. "unityads" or the full package name)
    pub name: String,

    /// Exact version to pin (e.g. 9.0.0)
    pub version: String,

    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,
}

impl PinCmd {
    pub async fn run(&self) -> Result<()> {
        let mut settings = Settings::load_or_create(&self.project)?;

        let scope = settings
            .scope_by_name_mut(&self.name)
            .with_context(|| format!("No configured package matches '{}'", self.name))?;
        scope.fixed_version = Some(self.version.clone());
        let package_name = scope.package_name().to_string();

        settings.save(&self.project)?;
        println!("Pinned {package_name} to {}.", self.version);
        println!("Run `admix install {package_name}` to apply it.");

        Ok(())
    }
}
