pub mod config;
pub mod update;

pub use config::Config;
pub use update::{InstallationFailed, PlatformTarget, ServerManager, UpdateError, UpdateStatus};
