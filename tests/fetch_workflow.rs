use hiphop_map::error::{FetchError, RemoteError};
use hiphop_map::models::{Genre, Geography, Selection};
use hiphop_map::session::{Action, Notice};
use hiphop_map::render;
use hiphop_map::{ArtifactFetcher, RemoteStore, Session};
use std::cell::Cell;
use std::collections::HashMap;

/// In-memory stand-in for Dropbox that counts calls.
#[derive(Default)]
struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
    fail_list: bool,
    fail_download: bool,
    lists: Cell<usize>,
    downloads: Cell<usize>,
}

impl MemoryStore {
    fn with(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(n, b)| (n.to_string(), b.as_bytes().to_vec()))
                .collect(),
            ..Self::default()
        }
    }
}

impl RemoteStore for MemoryStore {
    fn list_files(&self, _folder: &str) -> Result<Vec<String>, RemoteError> {
        self.lists.set(self.lists.get() + 1);
        if self.fail_list {
            return Err(RemoteError::Unauthorized {
                status: 401,
                body: "expired_access_token".into(),
            });
        }
        Ok(self.files.keys().cloned().collect())
    }

    fn download(&self, _folder: &str, name: &str) -> Result<Vec<u8>, RemoteError> {
        self.downloads.set(self.downloads.get() + 1);
        if self.fail_download {
            return Err(RemoteError::Status {
                status: 409,
                body: "path/not_found".into(),
            });
        }
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::Decode(format!("no such file {name}")))
    }
}

const DEFAULT_NAME: &str =
    "Radio Station Broadcast Range_1997 Hip Hop Exposure_None_Average_Non-Weighted.html";

#[test]
fn missing_artifact_skips_download() {
    let fetcher = ArtifactFetcher::new(MemoryStore::with(&[("other.html", "x")]), "/Maps");
    let session = Session::default().apply(Action::Load, &fetcher);

    assert!(!session.is_loaded());
    assert_eq!(fetcher.store().downloads.get(), 0);
    assert_eq!(
        session.notice(),
        Some(&Notice::Error(format!("Map file '{DEFAULT_NAME}' not found in Dropbox.")))
    );
}

#[test]
fn present_artifact_downloads_once_and_sets_flag() {
    let fetcher = ArtifactFetcher::new(
        MemoryStore::with(&[(DEFAULT_NAME, "<html>map</html>"), ("other.html", "x")]),
        "/Maps",
    );
    let session = Session::default();
    assert!(!session.is_loaded());

    let session = session.apply(Action::Load, &fetcher);
    assert_eq!(fetcher.store().lists.get(), 1);
    assert_eq!(fetcher.store().downloads.get(), 1);

    let map = session.loaded().expect("map loaded");
    assert_eq!(map.artifact, DEFAULT_NAME);
    assert_eq!(std::fs::read_to_string(&map.path).unwrap(), "<html>map</html>");
    assert!(map.path.extension().is_some_and(|e| e == "html"));
    assert_eq!(
        session.notice(),
        Some(&Notice::Info(format!("Map loaded: {DEFAULT_NAME}")))
    );
    std::fs::remove_file(&map.path).ok();
}

#[test]
fn each_load_uses_a_fresh_temp_file() {
    let fetcher = ArtifactFetcher::new(MemoryStore::with(&[(DEFAULT_NAME, "m")]), "/Maps");
    let a = fetcher.fetch(DEFAULT_NAME).unwrap();
    let b = fetcher.fetch(DEFAULT_NAME).unwrap();
    assert_ne!(a, b);
    assert!(a.exists() && b.exists());
    std::fs::remove_file(a).ok();
    std::fs::remove_file(b).ok();
}

#[test]
fn selection_change_resets_flag() {
    let county = Selection {
        geography: Geography::County,
        ..Selection::default()
    };
    let fetcher = ArtifactFetcher::new(
        MemoryStore::with(&[(county.artifact_name().as_str(), "m")]),
        "/Maps",
    );

    let session = Session::new(county).apply(Action::Load, &fetcher);
    assert!(session.is_loaded());
    let path = session.loaded().unwrap().path.clone();

    let session = session.apply(Action::ToggleGenre(Genre::Black), &fetcher);
    assert!(!session.is_loaded());
    assert_eq!(fetcher.store().downloads.get(), 1);
    std::fs::remove_file(path).ok();
}

#[test]
fn listing_failure_is_distinct_from_not_found() {
    let store = MemoryStore {
        fail_list: true,
        ..MemoryStore::with(&[(DEFAULT_NAME, "m")])
    };
    let fetcher = ArtifactFetcher::new(store, "/Maps");

    let err = fetcher.fetch(DEFAULT_NAME).unwrap_err();
    assert!(matches!(err, FetchError::List(RemoteError::Unauthorized { .. })));
    assert!(!err.is_not_found());

    let session = Session::default().apply(Action::Load, &fetcher);
    assert!(!session.is_loaded());
    let notice = session.notice().unwrap();
    assert!(notice.is_error());
    assert!(notice.text().starts_with("Failed to list files in Dropbox folder:"));
    assert_eq!(fetcher.store().downloads.get(), 0);
}

#[test]
fn download_failure_keeps_selection_and_flag() {
    let store = MemoryStore {
        fail_download: true,
        ..MemoryStore::with(&[(DEFAULT_NAME, "m")])
    };
    let fetcher = ArtifactFetcher::new(store, "/Maps");

    let before = Session::default();
    let after = before.clone().apply(Action::Load, &fetcher);
    assert!(!after.is_loaded());
    assert_eq!(after.selection(), before.selection());
    assert!(after.notice().unwrap().text().starts_with("Failed to load map:"));

    // the user may retry; nothing is retried automatically
    assert_eq!(fetcher.store().downloads.get(), 1);
}

#[test]
fn background_load_for_old_selection_is_ignored() {
    let fetcher = ArtifactFetcher::new(MemoryStore::with(&[(DEFAULT_NAME, "m")]), "/Maps");
    let session = Session::default();
    let request = session.begin_load();
    let result = fetcher.fetch(&request.artifact);
    let path = result.as_ref().unwrap().clone();

    let session = session
        .select(Action::SetGeography(Geography::CensusTract))
        .finish_load(request, result);
    assert!(!session.is_loaded());
    std::fs::remove_file(path).ok();
}

#[test]
fn downloads_land_in_scratch_dir() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ArtifactFetcher::new(MemoryStore::with(&[(DEFAULT_NAME, "m")]), "/Maps")
        .with_scratch_dir(dir.path());
    let path = fetcher.fetch(DEFAULT_NAME).unwrap();
    assert_eq!(path.parent(), Some(dir.path()));
}

#[test]
fn unwritable_scratch_dir_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let fetcher = ArtifactFetcher::new(MemoryStore::with(&[(DEFAULT_NAME, "m")]), "/Maps")
        .with_scratch_dir(&missing);

    match fetcher.fetch(DEFAULT_NAME).unwrap_err() {
        FetchError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("expected Io, got {other:?}"),
    }

    let before = Session::default();
    let after = before.clone().apply(Action::Load, &fetcher);
    assert!(!after.is_loaded());
    assert_eq!(after.selection(), before.selection());
    let notice = after.notice().unwrap();
    assert!(notice.is_error());
    assert!(notice.text().starts_with("Failed to load map:"));
}

#[test]
fn render_failure_is_reported_without_dropping_the_map() {
    let county = Selection {
        geography: Geography::County,
        ..Selection::default()
    };
    let fetcher = ArtifactFetcher::new(
        MemoryStore::with(&[(county.artifact_name().as_str(), "m")]),
        "/Maps",
    );
    let session = Session::new(county.clone()).apply(Action::Load, &fetcher);
    let path = session.loaded().unwrap().path.clone();
    std::fs::remove_file(&path).unwrap();

    let err = render::read_artifact(&path).unwrap_err();
    let session = session.report(Notice::render_failed(err));

    let notice = session.notice().unwrap();
    assert!(notice.is_error());
    assert!(
        notice
            .text()
            .starts_with("An error occurred while rendering the map: could not read")
    );
    assert_eq!(session.selection(), &county);
    assert!(session.is_loaded());
    // the legend is drawn from the selection, whether or not the page rendered
    assert!(session.selection().shows_legend());
}
