use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_REPOSITORY: &str = "genericptr/pascal-language-server";
const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Let this tool install and replace the pasls binary
    #[serde(default = "default_true")]
    pub manage_binary: bool,

    /// Where the binary and its VERSION file are kept
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// GitHub `owner/name` publishing the releases
    #[serde(default = "default_repository")]
    pub repository: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,
}

fn default_true() -> bool {
    true
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_download_base_url() -> String {
    DEFAULT_DOWNLOAD_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manage_binary: true,
            storage_dir: None,
            repository: default_repository(),
            api_base_url: default_api_base_url(),
            download_base_url: default_download_base_url(),
        }
    }
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config in {}", config_path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pasls-manager")
            .join("config.toml")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pasls-manager")
        })
    }

    /// `https://api.github.com/repos/<owner>/<repo>/releases/latest`
    pub fn release_api_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base_url.trim_end_matches('/'),
            self.repository
        )
    }

    /// Prefix for release assets addressed by tag
    pub fn releases_download_base(&self) -> String {
        format!(
            "{}/{}/releases/download",
            self.download_base_url.trim_end_matches('/'),
            self.repository
        )
    }
}
