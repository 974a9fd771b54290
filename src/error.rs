//! Error types shared by the library.
//!
//! Each failure ends the current action only; callers turn them into
//! user-visible notices (see [`crate::session::Notice`]).

use std::path::PathBuf;

/// Failure talking to the remote storage provider.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("access denied (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },
    #[error("request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("listing exceeded {0} pages")]
    PageLimit(u32),
}

/// Failure while locating or downloading a map artifact.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to list files in Dropbox folder: {0}")]
    List(#[source] RemoteError),
    #[error("Map file '{0}' not found in Dropbox.")]
    NotFound(String),
    #[error("Failed to download file: {0}")]
    Download(#[source] RemoteError),
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Failure reading or writing a rendered page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot build a file URL for {}", .0.display())]
    Url(PathBuf),
}

/// Failure resolving configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "no Dropbox access token: set DROPBOX_ACCESS_TOKEN or add `dropbox_access_token` to {}",
        secrets.display()
    )]
    MissingToken { secrets: PathBuf },
    #[error("could not read secrets file {}: {source}", path.display())]
    ReadSecrets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid secrets file {}: {source}", path.display())]
    ParseSecrets {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}
