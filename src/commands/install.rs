//! Install command - install or update the SDK and mediation adapters.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use super::common::{fetch_scope_details, install_id, project_fetcher};
use crate::package::PackageInstaller;
use crate::settings::Settings;

#[derive(Args)]
pub struct InstallCmd {
    /// Package name fragments to install (e.g. "unityads"); empty with
    /// --all installs the SDK and every enabled adapter
    pub names: Vec<String>,

    /// Install the SDK and all enabled adapters
    #[arg(long)]
    pub all: bool,

    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Bypass the metadata cache and query the registry
    #[arg(long)]
    pub refresh: bool,
}

impl InstallCmd {
    pub async fn run(&self) -> Result<()> {
        if self.names.is_empty() && !self.all {
            bail!("Nothing to install. Pass package names or --all.");
        }

        let settings = Settings::load_or_create(&self.project)?;
        let mut fetcher = project_fetcher(&self.project);
        let token = CancellationToken::new();

        let targets: Vec<_> = if self.all {
            settings
                .scopes()
                .filter(|(kind, _)| kind.is_enabled())
                .map(|(_, scope)| scope.clone())
                .collect()
        } else {
            let mut targets = Vec::new();
            for name in &self.names {
                let (_, scope) = settings
                    .scope_by_name(name)
                    .with_context(|| format!("No configured package matches '{name}'"))?;
                targets.push(scope.clone());
            }
            targets
        };

        let mut ids = Vec::with_capacity(targets.len());
        for scope in &targets {
            let details = fetch_scope_details(&mut fetcher, scope, self.refresh, &token).await?;
            ids.push(install_id(&details, scope)?);
        }

        fetcher
            .installer()
            .install(&ids, &token)
            .await
            .context("Install failed")?;

        for id in &ids {
            println!("Installed {id}");
        }
        println!("The Unity editor will resolve the new packages on next focus.");

        Ok(())
    }
}
