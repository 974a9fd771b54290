//! Remote storage access for map artifacts.
//!
//! [`RemoteStore`] is the seam between the fetch workflow and the storage
//! provider. [`DropboxClient`] implements it over the **Dropbox HTTP API (v2)**.
//!
//! ### Notes
//! - Only file entries are reported by [`RemoteStore::list_files`]; folders are skipped.
//! - Listings are paginated by Dropbox (`has_more` + `cursor`); pages are followed
//!   automatically up to a safety cap.
//! - Requests are **not** retried; the caller decides what to do with a failure.
//!
//! Typical usage:
//! ```no_run
//! # use hiphop_map::remote::{DropboxClient, RemoteStore};
//! # use hiphop_map::config::{AccessToken, Config};
//! let cfg = Config::new(AccessToken::new("sl.example"));
//! let dbx = DropboxClient::new(&cfg)?;
//! let names = dbx.list_files("/Maps")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::config::{AccessToken, Config};
use crate::error::RemoteError;
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Listing and downloading files from a remote folder.
pub trait RemoteStore {
    /// Names of the file entries directly inside `folder`.
    fn list_files(&self, folder: &str) -> Result<Vec<String>, RemoteError>;

    /// Raw bytes of `folder/name`.
    fn download(&self, folder: &str, name: &str) -> Result<Vec<u8>, RemoteError>;
}

// Safety cap to avoid pathological listings
const MAX_PAGES: u32 = 1000;

#[derive(Debug, Deserialize)]
struct ListFolderResult {
    entries: Vec<Metadata>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
enum Metadata {
    File { name: String },
    Folder {},
    Deleted {},
}

impl ListFolderResult {
    fn file_names(self) -> impl Iterator<Item = String> {
        self.entries.into_iter().filter_map(|e| match e {
            Metadata::File { name } => Some(name),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DropboxClient {
    api_base: String,
    content_base: String,
    token: AccessToken,
    max_pages: u32,
    http: HttpClient,
}

impl DropboxClient {
    pub fn new(cfg: &Config) -> Result<Self, RemoteError> {
        let mut builder = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("hiphop-map/", env!("CARGO_PKG_VERSION")));
        // reqwest's blocking client defaults to 30s; no configured timeout means none at all
        builder = builder.timeout(cfg.timeout_secs.map(Duration::from_secs));
        Ok(Self {
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            content_base: cfg.content_base.trim_end_matches('/').to_string(),
            token: cfg.access_token.clone(),
            max_pages: MAX_PAGES,
            http: builder.build()?,
        })
    }

    /// Lower the listing page cap (default 1000).
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn rpc(&self, endpoint: &str, body: serde_json::Value) -> Result<ListFolderResult, RemoteError> {
        let url = format!("{}/2/{}", self.api_base, endpoint);
        log::debug!("POST {url}");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()?;
        let resp = check_status(resp)?;
        resp.json::<ListFolderResult>()
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

impl RemoteStore for DropboxClient {
    fn list_files(&self, folder: &str) -> Result<Vec<String>, RemoteError> {
        let mut page = self.rpc("files/list_folder", json!({ "path": api_path(folder) }))?;
        let mut names = Vec::new();
        let mut pages = 1u32;
        loop {
            let (has_more, cursor) = (page.has_more, std::mem::take(&mut page.cursor));
            names.extend(page.file_names());
            if !has_more {
                break;
            }
            if pages >= self.max_pages {
                return Err(RemoteError::PageLimit(self.max_pages));
            }
            page = self.rpc("files/list_folder/continue", json!({ "cursor": cursor }))?;
            pages += 1;
        }
        log::debug!("{} file(s) in {folder:?}", names.len());
        Ok(names)
    }

    fn download(&self, folder: &str, name: &str) -> Result<Vec<u8>, RemoteError> {
        let path = join_path(folder, name);
        let url = format!("{}/2/files/download", self.content_base);
        log::debug!("download {path:?}");
        let arg = header_safe_json(&json!({ "path": path }).to_string());
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .header("Dropbox-API-Arg", arg)
            .send()?;
        let resp = check_status(resp)?;
        Ok(resp.bytes()?.to_vec())
    }
}

fn check_status(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let code = status.as_u16();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(RemoteError::Unauthorized { status: code, body })
    } else {
        Err(RemoteError::Status { status: code, body })
    }
}

/// Dropbox names the root folder `""`, not `"/"`.
pub fn api_path(folder: &str) -> String {
    let trimmed = folder.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Full remote path of `name` inside `folder`.
pub fn join_path(folder: &str, name: &str) -> String {
    format!("{}/{}", api_path(folder), name)
}

/// HTTP headers must be ASCII; Dropbox wants the rest as `\uXXXX` escapes.
pub fn header_safe_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_folder_is_empty_string() {
        assert_eq!(api_path("/"), "");
        assert_eq!(api_path(""), "");
        assert_eq!(api_path("Maps/"), "/Maps");
        assert_eq!(join_path("/Maps", "a.html"), "/Maps/a.html");
        assert_eq!(join_path("/", "a.html"), "/a.html");
    }

    #[test]
    fn header_escapes_non_ascii() {
        assert_eq!(header_safe_json(r#"{"path":"/é"}"#), r#"{"path":"/\u00e9"}"#);
        assert_eq!(header_safe_json("🎤"), "\\ud83c\\udfa4");
        assert_eq!(header_safe_json("plain"), "plain");
    }

    #[test]
    fn listing_keeps_only_files() {
        let raw = r#"{
            "entries": [
                {".tag": "folder", "name": "old", "id": "id:1"},
                {".tag": "file", "name": "County_Year of Initial Exposure_None_Average_Non-Weighted.html", "size": 10},
                {".tag": "deleted", "name": "gone.html"}
            ],
            "cursor": "c1",
            "has_more": false
        }"#;
        let page: ListFolderResult = serde_json::from_str(raw).unwrap();
        let files: Vec<_> = page.file_names().collect();
        assert_eq!(
            files,
            vec!["County_Year of Initial Exposure_None_Average_Non-Weighted.html"]
        );
    }
}
