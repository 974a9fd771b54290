//! Runtime configuration: Dropbox credential, remote folder, frame size.
//!
//! Values are resolved once at startup, environment first, then the
//! secrets file, then defaults. The credential is never compiled in.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_TOKEN: &str = "DROPBOX_ACCESS_TOKEN";
pub const ENV_FOLDER: &str = "HIPHOP_MAP_FOLDER";
pub const ENV_TIMEOUT: &str = "HIPHOP_MAP_TIMEOUT_SECS";
pub const ENV_SECRETS: &str = "HIPHOP_MAP_SECRETS";

pub const DEFAULT_FOLDER: &str = "/Maps";
pub const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com";
pub const DEFAULT_CONTENT_BASE: &str = "https://content.dropboxapi.com";
pub const DEFAULT_FRAME_HEIGHT: u32 = 600;

/// Bearer token for the storage API. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Contents of the TOML secrets file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Secrets {
    pub dropbox_access_token: Option<String>,
    pub folder: Option<String>,
    pub timeout_secs: Option<u64>,
    pub frame_height: Option<u32>,
}

impl Secrets {
    /// Parse a secrets file. A missing file yields empty secrets.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::ReadSecrets {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::ParseSecrets {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: AccessToken,
    /// Remote folder holding the artifacts.
    pub folder: String,
    pub api_base: String,
    pub content_base: String,
    /// Total request timeout; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Height in pixels of the frame the map is embedded in.
    pub frame_height: u32,
}

impl Config {
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            folder: DEFAULT_FOLDER.into(),
            api_base: DEFAULT_API_BASE.into(),
            content_base: DEFAULT_CONTENT_BASE.into(),
            timeout_secs: None,
            frame_height: DEFAULT_FRAME_HEIGHT,
        }
    }

    /// Resolve configuration from the process environment and the default secrets file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok(), &secrets_path())
    }

    /// Resolve configuration from an arbitrary variable lookup and secrets file.
    ///
    /// `HIPHOP_MAP_SECRETS` in `vars` overrides `default_secrets`.
    pub fn load_from<F>(vars: F, default_secrets: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| vars(key).filter(|v| !v.trim().is_empty());

        let secrets_file = var(ENV_SECRETS)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_secrets.to_path_buf());
        let secrets = Secrets::load(&secrets_file)?;

        let token = var(ENV_TOKEN)
            .or(secrets.dropbox_access_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingToken {
                secrets: secrets_file.clone(),
            })?;

        let mut cfg = Config::new(AccessToken::new(token));
        if let Some(folder) = var(ENV_FOLDER).or(secrets.folder) {
            cfg.folder = folder;
        }
        cfg.timeout_secs = match var(ENV_TIMEOUT) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT,
                value: raw.clone(),
            })?),
            None => secrets.timeout_secs,
        };
        if let Some(h) = secrets.frame_height {
            if h == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "frame_height",
                    value: h.to_string(),
                });
            }
            cfg.frame_height = h;
        }

        log::debug!(
            "configuration resolved: folder={:?}, secrets={}",
            cfg.folder,
            secrets_file.display()
        );
        Ok(cfg)
    }
}

/// Default location of the secrets file: `<config dir>/hiphop-map/secrets.toml`.
pub fn secrets_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hiphop-map")
        .join("secrets.toml")
}
