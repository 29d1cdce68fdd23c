//! CLI command implementations.

mod common;
mod install;
mod pin;
mod registries;
mod remove;
mod setup;
mod status;
mod unpin;

pub use install::InstallCmd;
pub use pin::PinCmd;
pub use registries::RegistriesCmd;
pub use remove::RemoveCmd;
pub use setup::SetupCmd;
pub use status::StatusCmd;
pub use unpin::UnpinCmd;
