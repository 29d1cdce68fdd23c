//! Remove command - uninstall managed packages.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::package::{PackageInstaller, UpmProject};
use crate::settings::Settings;

#[derive(Args)]
pub struct RemoveCmd {
    /// Package name fragments to uninstall (e.g. "unityads")
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,
}

impl RemoveCmd {
    pub async fn run(&self) -> Result<()> {
        let settings = Settings::load_or_create(&self.project)?;
        let installer = UpmProject::new(&self.project);
        let token = CancellationToken::new();

        let mut ids = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let (_, scope) = settings
                .scope_by_name(name)
                .with_context(|| format!("No configured package matches '{name}'"))?;
            ids.push(scope.package_name().to_string());
        }

        installer
            .uninstall(&ids, &token)
            .await
            .context("Uninstall failed")?;

        for id in &ids {
            println!("Removed {id}");
        }

        Ok(())
    }
}
