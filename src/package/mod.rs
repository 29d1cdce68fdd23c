//! Package state: local/remote snapshots, the merged comparison view, the
//! fetch orchestrator, and the installer seam to the host project.

mod details;
mod error;
mod fetcher;
mod info;
mod installer;

pub use details::{version_param, PackageInfoDetails};
pub use error::InstallError;
pub use fetcher::PackageInfoFetcher;
pub use info::{PackageLocalInfo, PackageRemoteInfo};
pub use installer::{PackageInstaller, UpmProject};
