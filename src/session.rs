//! Per-session UI state and the handler that advances it.
//!
//! A [`Session`] is passed by value into [`Session::apply`] together with an
//! [`Action`] and comes back updated. The loaded flag is modelled as
//! `Option<LoadedMap>`: it is set only after a successful download and is
//! cleared by any change to the selection.

use crate::error::FetchError;
use crate::fetch::ArtifactFetcher;
use crate::models::{Aggregation, ExposureMetric, Genre, GenreSet, Geography, Selection, Weighting};
use crate::remote::RemoteStore;
use std::fmt;
use std::path::PathBuf;

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetGeography(Geography),
    SetExposure(ExposureMetric),
    SetGenres(GenreSet),
    ToggleGenre(Genre),
    SetAggregation(Aggregation),
    SetWeighting(Weighting),
    /// Press of the "Load Map" button.
    Load,
}

/// A downloaded artifact ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMap {
    pub artifact: String,
    pub path: PathBuf,
}

/// Message shown inline to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Error(s) => s,
        }
    }

    /// User-facing wording for a failed load.
    pub fn from_fetch_error(err: &FetchError) -> Self {
        match err {
            FetchError::List(_) | FetchError::NotFound(_) => Notice::Error(err.to_string()),
            FetchError::Download(_) | FetchError::Io { .. } => {
                Notice::Error(format!("Failed to load map: {err}"))
            }
        }
    }

    /// User-facing wording for a failed render.
    pub fn render_failed(err: impl fmt::Display) -> Self {
        Notice::Error(format!("An error occurred while rendering the map: {err}"))
    }
}

/// Ticket for a load running outside [`Session::apply`] (e.g. on a worker thread).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub artifact: String,
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    selection: Selection,
    loaded: Option<LoadedMap>,
    notice: Option<Notice>,
    // bumped on every selection change
    generation: u64,
}

impl Session {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn loaded(&self) -> Option<&LoadedMap> {
        self.loaded.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Artifact name for the current selection.
    pub fn artifact_name(&self) -> String {
        self.selection.artifact_name()
    }

    /// Apply one user action, running a load synchronously if asked to.
    pub fn apply<S: RemoteStore>(self, action: Action, fetcher: &ArtifactFetcher<S>) -> Session {
        match action {
            Action::Load => {
                let request = self.begin_load();
                let result = fetcher.fetch(&request.artifact);
                self.finish_load(request, result)
            }
            other => self.select(other),
        }
    }

    /// Apply a selection action. Loads are ignored here.
    pub fn select(mut self, action: Action) -> Session {
        let mut next = self.selection.clone();
        match action {
            Action::SetGeography(g) => next.geography = g,
            Action::SetExposure(e) => next.exposure = e,
            Action::SetGenres(set) => next.genres = set,
            Action::ToggleGenre(g) => next.genres.toggle(g),
            Action::SetAggregation(a) => next.aggregation = a,
            Action::SetWeighting(w) => next.weighting = w,
            Action::Load => return self,
        }
        if next != self.selection {
            self.selection = next;
            self.loaded = None;
            self.notice = None;
            self.generation += 1;
        }
        self
    }

    /// Start a load for the current selection.
    pub fn begin_load(&self) -> LoadRequest {
        LoadRequest {
            artifact: self.artifact_name(),
            generation: self.generation,
        }
    }

    /// Record the outcome of a load started with [`Session::begin_load`].
    ///
    /// Outcomes for a selection that has since changed are dropped.
    pub fn finish_load(
        mut self,
        request: LoadRequest,
        result: Result<PathBuf, FetchError>,
    ) -> Session {
        if request.generation != self.generation {
            log::debug!("dropping stale load of {:?}", request.artifact);
            return self;
        }
        match result {
            Ok(path) => {
                self.notice = Some(Notice::Info(format!("Map loaded: {}", request.artifact)));
                self.loaded = Some(LoadedMap {
                    artifact: request.artifact,
                    path,
                });
            }
            Err(err) => {
                self.loaded = None;
                self.notice = Some(Notice::from_fetch_error(&err));
            }
        }
        self
    }

    /// Surface a render failure without touching the selection.
    pub fn report(mut self, notice: Notice) -> Session {
        self.notice = Some(notice);
        self
    }
}
