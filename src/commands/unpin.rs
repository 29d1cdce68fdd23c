//! Unpin command - return a package to latest-version tracking.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::settings::Settings;

#[derive(Args)]
pub struct UnpinCmd {
    /// Package name fragment (e.g. "unityads" or the full package name)
    pub name: String,

    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,
}

impl UnpinCmd {
    pub async fn run(&self) -> Result<()> {
        let mut settings = Settings::load_or_create(&self.project)?;

        let scope = settings
            .scope_by_name_mut(&self.name)
            .with_context(|| format!("No configured package matches '{}'", self.name))?;
        let package_name = scope.package_name().to_string();

        if scope.fixed_version.take().is_none() {
            println!("{package_name} was not pinned.");
            return Ok(());
        }

        settings.save(&self.project)?;
        println!("Unpinned {package_name}; it now tracks the latest version.");

        Ok(())
    }
}
