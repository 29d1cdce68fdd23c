//! Admix CLI - Google Mobile Ads + mediation adapters for Unity via OpenUPM.

mod cli;
mod commands;
mod manifest;
mod package;
mod registry;
mod settings;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Controlled by the RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
