use std::fmt;

use super::error::{error_chain, UpdateError};
use super::github::{GithubClient, Release, CHECK_TIMEOUT};
use super::storage::StorageLayout;

/// Outcome of comparing the recorded version against the release index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Self-management is turned off
    Unmanaged,
    /// No binary at the expected path
    NotInstalled,
    UpToDate { tag: String },
    Available {
        installed: Option<String>,
        latest: String,
    },
    /// The release index could not be queried
    Unknown,
}

impl UpdateStatus {
    pub fn needs_update(&self) -> bool {
        matches!(self, Self::NotInstalled | Self::Available { .. })
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmanaged => write!(f, "binary is managed manually (manageBinary = false)"),
            Self::NotInstalled => write!(f, "not installed"),
            Self::UpToDate { tag } => write!(f, "up to date ({})", tag),
            Self::Available {
                installed: Some(installed),
                latest,
            } => write!(f, "update available: {} → {}", installed, latest),
            Self::Available {
                installed: None,
                latest,
            } => write!(f, "update available: unknown → {}", latest),
            Self::Unknown => write!(f, "could not check for updates"),
        }
    }
}

/// Answers "what is the latest release, and is it what we have?"
#[derive(Debug, Clone)]
pub struct VersionOracle {
    client: GithubClient,
    layout: StorageLayout,
}

impl VersionOracle {
    pub fn new(client: GithubClient, layout: StorageLayout) -> Self {
        Self { client, layout }
    }

    pub fn fetch_latest_release(&self) -> Result<Release, UpdateError> {
        self.client.fetch_latest_release(CHECK_TIMEOUT)
    }

    pub fn check(&self, manage_binary: bool) -> UpdateStatus {
        if !manage_binary {
            return UpdateStatus::Unmanaged;
        }

        if !self.layout.binary_exists() {
            return UpdateStatus::NotInstalled;
        }

        let latest = match self.fetch_latest_release() {
            Ok(release) => release.tag_name,
            Err(e) => {
                tracing::warn!("failed to check for updates: {}", error_chain(&e));
                return UpdateStatus::Unknown;
            }
        };

        match self.layout.installed_version() {
            Some(installed) if installed == latest => UpdateStatus::UpToDate { tag: latest },
            installed => UpdateStatus::Available { installed, latest },
        }
    }

    pub fn needs_update(&self, manage_binary: bool) -> bool {
        self.check(manage_binary).needs_update()
    }
}
