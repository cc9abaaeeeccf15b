use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::UpdateError;
use super::platform::PlatformTarget;

const VERSION_FILE: &str = "VERSION";

/// Where the server binary and its recorded version live
#[derive(Debug, Clone, PartialEq)]
pub struct StorageLayout {
    root: PathBuf,
    binary_name: String,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>, platform: &PlatformTarget) -> Self {
        Self {
            root: root.into(),
            binary_name: platform.binary_filename(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn binary_path(&self) -> PathBuf {
        self.root.join(&self.binary_name)
    }

    pub fn version_path(&self) -> PathBuf {
        self.root.join(VERSION_FILE)
    }

    /// Staging file next to the binary, so the final rename stays on one filesystem
    pub fn staging_path(&self) -> PathBuf {
        self.root.join(format!("{}.tmp", self.binary_name))
    }

    pub fn binary_exists(&self) -> bool {
        self.binary_path().is_file()
    }

    /// The recorded release tag, or `None` if nothing was ever installed
    pub fn installed_version(&self) -> Option<String> {
        match fs::read_to_string(self.version_path()) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %self.version_path().display(),
                    "failed to read installed version: {e}"
                );
                None
            }
        }
    }

    pub fn record_version(&self, tag: &str) -> Result<(), UpdateError> {
        self.ensure_root()?;
        let path = self.version_path();
        fs::write(&path, tag).map_err(|e| UpdateError::io("record version in", path, e))
    }

    pub fn ensure_root(&self) -> Result<(), UpdateError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| UpdateError::io("create storage directory", &self.root, e))
    }
}
