use flate2::read::MultiGzDecoder;
use std::fs;
use std::io::Read;

use super::error::{error_chain, InstallationFailed, UpdateError};
use super::github::{GithubClient, Release, RELEASE_INFO_TIMEOUT};
use super::platform::PlatformTarget;
use super::resolve::{resolve_asset, ResolvedAsset};
use super::storage::StorageLayout;

/// Downloads a release's binary and swaps it into the storage root.
///
/// Install order is: resolve, download, gunzip, stage to `<binary>.tmp`,
/// mark executable, rename onto the binary, record the tag. A failure
/// before the rename leaves the old binary and `VERSION` untouched.
#[derive(Debug, Clone)]
pub struct Installer {
    client: GithubClient,
    layout: StorageLayout,
    download_base: String,
}

impl Installer {
    pub fn new(
        client: GithubClient,
        layout: StorageLayout,
        download_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            layout,
            download_base: download_base.into(),
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Fetch the latest release and install it for `platform`
    pub fn install_latest(&self, platform: &PlatformTarget) -> Result<Release, InstallationFailed> {
        tracing::info!(url = %self.client.api_url(), "fetching release information");
        let release = self
            .client
            .fetch_latest_release(RELEASE_INFO_TIMEOUT)
            .map_err(|e| self.fail(e))?;
        self.install_release(&release, platform)?;
        Ok(release)
    }

    pub fn install_release(
        &self,
        release: &Release,
        platform: &PlatformTarget,
    ) -> Result<(), InstallationFailed> {
        self.try_install(release, platform).map_err(|e| self.fail(e))?;
        tracing::info!(tag = %release.tag_name, "successfully installed");
        Ok(())
    }

    fn fail(&self, cause: UpdateError) -> InstallationFailed {
        tracing::error!("installation failed: {}", error_chain(&cause));
        InstallationFailed::from(cause)
    }

    fn try_install(&self, release: &Release, platform: &PlatformTarget) -> Result<(), UpdateError> {
        let resolved = resolve_asset(release, platform, &self.download_base)?;
        tracing::info!(url = %resolved.url, rule = ?resolved.rule, "downloading binary");

        self.layout.ensure_root()?;
        self.remove_stale_staging();

        let payload = self.client.download(&resolved.url)?;
        let bytes = decompress(&resolved, payload)?;

        let staging = self.layout.staging_path();
        fs::write(&staging, &bytes).map_err(|e| UpdateError::io("write", &staging, e))?;

        if !platform.is_windows() {
            make_executable(&staging)?;
        }

        let binary = self.layout.binary_path();
        fs::rename(&staging, &binary)
            .map_err(|e| UpdateError::io("move binary into", &binary, e))?;

        self.layout.record_version(&release.tag_name)
    }

    fn remove_stale_staging(&self) {
        let staging = self.layout.staging_path();
        if staging.exists() {
            tracing::debug!(path = %staging.display(), "removing leftover staging file");
            if let Err(e) = fs::remove_file(&staging) {
                tracing::warn!(path = %staging.display(), "failed to remove staging file: {e}");
            }
        }
    }
}

/// Gunzip `.gz` assets, all members; anything else is used as downloaded
fn decompress(resolved: &ResolvedAsset, payload: Vec<u8>) -> Result<Vec<u8>, UpdateError> {
    if !resolved.url.ends_with(".gz") {
        return Ok(payload);
    }

    let mut bytes = Vec::new();
    MultiGzDecoder::new(payload.as_slice())
        .read_to_end(&mut bytes)
        .map_err(|source| UpdateError::Decompress {
            url: resolved.url.clone(),
            source,
        })?;
    Ok(bytes)
}

/// Add the owner-execute bit, keeping the rest of the mode
#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> Result<(), UpdateError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| UpdateError::io("read permissions of", path, e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o100);
    fs::set_permissions(path, perms).map_err(|e| UpdateError::io("set permissions on", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> Result<(), UpdateError> {
    Ok(())
}
