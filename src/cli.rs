//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{
    InstallCmd, PinCmd, RegistriesCmd, RemoveCmd, SetupCmd, StatusCmd, UnpinCmd,
};

#[derive(Parser)]
#[command(name = "admix")]
#[command(about = "Admix - Google Mobile Ads + mediation adapters via OpenUPM")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register the OpenUPM scoped registry in the project manifest
    Setup(SetupCmd),

    /// Show installed vs. latest versions for the SDK and adapters
    Status(StatusCmd),

    /// Install or update the SDK and mediation adapters
    Install(InstallCmd),

    /// Uninstall managed packages
    Remove(RemoveCmd),

    /// Pin a package to an exact version
    Pin(PinCmd),

    /// Clear a package's version pin
    Unpin(UnpinCmd),

    /// List the manifest's scoped registries
    Registries(RegistriesCmd),
}

impl Command {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Command::Setup(cmd) => cmd.run().await,
            Command::Status(cmd) => cmd.run().await,
            Command::Install(cmd) => cmd.run().await,
            Command::Remove(cmd) => cmd.run().await,
            Command::Pin(cmd) => cmd.run().await,
            Command::Unpin(cmd) => cmd.run().await,
            Command::Registries(cmd) => cmd.run().await,
        }
    }
}
