//! Status command - installed vs. latest versions for every configured scope.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use super::common::{fetch_scope_details, project_fetcher};
use crate::package::PackageInfoDetails;
use crate::settings::{ScopeKind, Settings};

#[derive(Args)]
pub struct StatusCmd {
    /// Unity project root (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Bypass the metadata cache and query the registry
    #[arg(long)]
    pub refresh: bool,
}

impl StatusCmd {
    pub async fn run(&self) -> Result<()> {
        let settings = Settings::load_or_create(&self.project)?;
        let mut fetcher = project_fetcher(&self.project);
        let token = CancellationToken::new();

        println!("Project: {}", self.project.display());
        println!();

        for (kind, scope) in settings.scopes() {
            let details =
                match fetch_scope_details(&mut fetcher, scope, self.refresh, &token).await {
                    Ok(details) => details,
                    Err(err) => {
                        println!("  {}: fetch failed", scope.package_name());
                        println!("      {err:#}");
                        continue;
                    }
                };
            print_scope(kind, scope.package_name(), &details);
        }

        Ok(())
    }
}

fn print_scope(kind: ScopeKind, package_name: &str, details: &PackageInfoDetails) {
    let name = details.display_name().unwrap_or(package_name);
    let marker = match kind {
        ScopeKind::Required => "*",
        ScopeKind::Optional { enabled: true } => "+",
        ScopeKind::Optional { enabled: false } => "-",
    };

    let installed = details
        .local()
        .map(|local| local.version.as_str())
        .unwrap_or("not installed");
    let latest = details
        .remote()
        .and_then(|remote| remote.latest_version.as_deref())
        .unwrap_or("unknown");

    let mut notes = Vec::new();
    if let Some(pinned) = details.fixed_version() {
        notes.push(format!("pinned {pinned}"));
    }
    if details.is_installed() && details.has_update() {
        notes.push("update available".to_string());
    }

    let notes = if notes.is_empty() {
        String::new()
    } else {
        format!(" [{}]", notes.join(", "))
    };

    println!("{marker} {name} ({package_name})");
    println!("    installed: {installed:<14} latest: {latest}{notes}");
}
