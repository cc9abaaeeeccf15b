use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;

use super::error::{http_reason, UpdateError};

/// Upper bound on buffer space reserved up front from Content-Length
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

const USER_AGENT: &str = concat!("pasls-manager/", env!("CARGO_PKG_VERSION"));

/// Timeout for a plain "is there something newer" check
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for fetching release info right before an install
pub const RELEASE_INFO_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for downloading the binary itself
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

/// Blocking client for the release index and asset downloads
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::blocking::Client,
    api_url: String,
    show_progress: bool,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>) -> reqwest::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            show_progress: false,
        })
    }

    /// Draw a progress bar on stderr while downloading
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch the latest release info from the release index
    pub fn fetch_latest_release(&self, timeout: Duration) -> Result<Release, UpdateError> {
        let unavailable = |reason: String| UpdateError::RemoteUnavailable {
            url: self.api_url.clone(),
            reason,
        };

        tracing::debug!(url = %self.api_url, "fetching release index");

        let response = self
            .http
            .get(&self.api_url)
            .header("Accept", "application/vnd.github+json")
            .timeout(timeout)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(http_reason(response.status())));
        }

        let release = response
            .json::<Release>()
            .map_err(|e| unavailable(format!("malformed release JSON: {}", e)))?;

        if release.tag_name.is_empty() {
            return Err(unavailable("no tag_name in release data".to_string()));
        }

        Ok(release)
    }

    /// Download an asset fully into memory
    pub fn download(&self, url: &str) -> Result<Vec<u8>, UpdateError> {
        let failed = |reason: String| UpdateError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .http
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(http_reason(response.status())));
        }

        let total_size = response.content_length();
        let pb = self.progress_bar(total_size);

        let capacity = total_size.unwrap_or(0).min(MAX_PREALLOC);
        let mut bytes = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| failed(e.to_string()))?;
            if bytes_read == 0 {
                break;
            }
            bytes.extend_from_slice(&buffer[..bytes_read]);
            pb.set_position(bytes.len() as u64);
        }

        pb.finish_and_clear();
        tracing::debug!(url, size = bytes.len(), "download complete");
        Ok(bytes)
    }

    fn progress_bar(&self, total_size: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match total_size {
            Some(len) => {
                let pb = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_json_ignores_extra_fields() {
        let json = r#"{
            "tag_name": "v0.9.1",
            "name": "pasls 0.9.1",
            "html_url": "https://github.com/genericptr/pascal-language-server/releases/tag/v0.9.1",
            "assets": [
                {
                    "name": "pasls-linux-x86_64",
                    "browser_download_url": "https://example.com/a",
                    "size": 12
                }
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v0.9.1");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "pasls-linux-x86_64");
    }

    #[test]
    fn test_release_json_without_assets() {
        let release: Release = serde_json::from_str(r#"{"tag_name": "v1"}"#).unwrap();
        assert!(release.assets.is_empty());
    }

    #[test]
    fn test_fetch_latest_release_non_success_is_unavailable() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/releases/latest")
            .with_status(503)
            .create();

        let client = GithubClient::new(format!("{}/releases/latest", server.url())).unwrap();
        let err = client.fetch_latest_release(CHECK_TIMEOUT).unwrap_err();

        mock.assert();
        match err {
            UpdateError::RemoteUnavailable { reason, .. } => {
                assert_eq!(reason, "HTTP 503 Service Unavailable")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_latest_release_rejects_empty_tag() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/releases/latest")
            .with_status(200)
            .with_body(r#"{"tag_name": "", "assets": []}"#)
            .create();

        let client = GithubClient::new(format!("{}/releases/latest", server.url())).unwrap();
        let err = client.fetch_latest_release(CHECK_TIMEOUT).unwrap_err();
        assert!(matches!(err, UpdateError::RemoteUnavailable { .. }));
    }

    #[test]
    fn test_download_reports_status() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/pasls").with_status(404).create();

        let client = GithubClient::new(server.url()).unwrap();
        let url = format!("{}/pasls", server.url());
        match client.download(&url).unwrap_err() {
            UpdateError::DownloadFailed { url: failed_url, reason } => {
                assert_eq!(failed_url, url);
                assert_eq!(reason, "HTTP 404 Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
