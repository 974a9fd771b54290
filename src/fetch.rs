//! Locate a map artifact in the remote folder and pull it to local disk.

use crate::error::FetchError;
use crate::remote::RemoteStore;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fetches artifacts from one remote folder of a [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct ArtifactFetcher<S> {
    store: S,
    folder: String,
    // None means the system temp dir
    scratch_dir: Option<PathBuf>,
}

impl<S: RemoteStore> ArtifactFetcher<S> {
    pub fn new(store: S, folder: impl Into<String>) -> Self {
        Self {
            store,
            folder: folder.into(),
            scratch_dir: None,
        }
    }

    /// Write downloads into `dir` instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Artifact names currently available in the folder.
    pub fn available(&self) -> Result<Vec<String>, FetchError> {
        self.store.list_files(&self.folder).map_err(FetchError::List)
    }

    /// Download `artifact` into a fresh temporary `.html` file and return its path.
    ///
    /// The folder is listed first; if the artifact is not in the listing no
    /// download is attempted. The temporary file is kept after return and is
    /// never cleaned up by this crate.
    pub fn fetch(&self, artifact: &str) -> Result<PathBuf, FetchError> {
        let available = self.available()?;
        if !available.iter().any(|n| n == artifact) {
            log::warn!("{artifact:?} not found in {:?}", self.folder);
            return Err(FetchError::NotFound(artifact.to_string()));
        }

        let bytes = self
            .store
            .download(&self.folder, artifact)
            .map_err(FetchError::Download)?;

        let dir = self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
        let path = write_scratch(&dir, &bytes)?;
        log::info!(
            "downloaded {artifact:?} ({} bytes) to {}",
            bytes.len(),
            path.display()
        );
        Ok(path)
    }
}

fn write_scratch(dir: &Path, bytes: &[u8]) -> Result<PathBuf, FetchError> {
    let scratch_err = |source: std::io::Error| FetchError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut file = tempfile::Builder::new()
        .prefix("hiphop-map-")
        .suffix(".html")
        .tempfile_in(dir)
        .map_err(scratch_err)?;
    file.write_all(bytes).map_err(scratch_err)?;
    let (_, path) = file.keep().map_err(|e| scratch_err(e.error))?;
    Ok(path)
}
