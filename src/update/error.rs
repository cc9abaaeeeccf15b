use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::platform::TOOL_NAME;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// The release index could not be reached or returned something unusable
    #[error("release index {url} unavailable: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    #[error(
        "No suitable binary found for {platform}-{arch}. \
         Please install {tool} manually and set manageBinary to false.",
        tool = TOOL_NAME
    )]
    NoCompatibleAsset { platform: String, arch: String },

    #[error("Failed to download binary from {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to decompress {url}")]
    Decompress {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UpdateError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// The one error an install attempt surfaces; the detailed cause is the source
#[derive(Debug, Error)]
#[error("Failed to download latest PasLS")]
pub struct InstallationFailed {
    #[source]
    cause: UpdateError,
}

impl InstallationFailed {
    pub fn cause(&self) -> &UpdateError {
        &self.cause
    }
}

impl From<UpdateError> for InstallationFailed {
    fn from(cause: UpdateError) -> Self {
        Self { cause }
    }
}

/// `err` followed by each of its sources, joined with `: `
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Render `HTTP 404 Not Found` style reasons from a status code
pub(crate) fn http_reason(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}
