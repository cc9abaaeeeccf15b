pub mod error;
pub mod github;
pub mod installer;
pub mod oracle;
pub mod platform;
pub mod resolve;
pub mod storage;

use colored::Colorize;

use crate::config::Config;

pub use error::{error_chain, InstallationFailed, UpdateError};
pub use github::{Asset, GithubClient, Release};
pub use installer::Installer;
pub use oracle::{UpdateStatus, VersionOracle};
pub use platform::{Arch, Os, PlatformTarget};
pub use resolve::{resolve_asset, MatchRule, ResolvedAsset};
pub use storage::StorageLayout;

/// The oracle and installer wired up from one config and platform
#[derive(Debug, Clone)]
pub struct ServerManager {
    manage_binary: bool,
    platform: PlatformTarget,
    oracle: VersionOracle,
    installer: Installer,
}

impl ServerManager {
    pub fn new(
        config: &Config,
        platform: PlatformTarget,
        show_progress: bool,
    ) -> reqwest::Result<Self> {
        let client = GithubClient::new(config.release_api_url())?.with_progress(show_progress);
        let layout = StorageLayout::new(config.storage_dir(), &platform);

        Ok(Self {
            manage_binary: config.manage_binary,
            oracle: VersionOracle::new(client.clone(), layout.clone()),
            installer: Installer::new(client, layout, config.releases_download_base()),
            platform,
        })
    }

    pub fn platform(&self) -> &PlatformTarget {
        &self.platform
    }

    pub fn layout(&self) -> &StorageLayout {
        self.installer.layout()
    }

    pub fn oracle(&self) -> &VersionOracle {
        &self.oracle
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    pub fn check(&self) -> UpdateStatus {
        self.oracle.check(self.manage_binary)
    }

    pub fn needs_update(&self) -> bool {
        self.oracle.needs_update(self.manage_binary)
    }

    pub fn install_latest(&self) -> Result<Release, InstallationFailed> {
        self.installer.install_latest(&self.platform)
    }
}

/// Install the latest release if the check says we should
pub fn perform_update(manager: &ServerManager) -> Result<(), InstallationFailed> {
    println!("{}", "Checking for updates...".cyan());

    let status = manager.check();
    match status {
        UpdateStatus::Unknown => {
            println!("{} {}, keeping the current binary", "⚠".yellow(), status);
            return Ok(());
        }
        _ if !status.needs_update() => {
            println!("{} {}", "✓".green(), status);
            return Ok(());
        }
        _ => {}
    }

    println!("{} {}", "↑".yellow(), status);
    perform_install(manager)
}

/// Install the latest release unconditionally
pub fn perform_install(manager: &ServerManager) -> Result<(), InstallationFailed> {
    println!(
        "{} pasls for {}...",
        "Installing".cyan(),
        manager.platform().to_string().dimmed()
    );

    let release = manager.install_latest()?;

    println!(
        "\n{} Installed {} to {}",
        "✓".green(),
        release.tag_name.green(),
        manager.layout().binary_path().display()
    );
    Ok(())
}
