//! hiphop_map
//!
//! A small Rust library for locating, downloading and displaying pre-rendered
//! Hip Hop exposure maps. Pairs with the `hiphop-map` CLI and the
//! `hiphop-map-gui` desktop viewer.
//!
//! The maps themselves are produced offline; this crate only
//! - turns the user's display options into a canonical artifact name,
//! - checks that the artifact exists in a Dropbox folder and downloads it,
//! - embeds the HTML in a page, with a color legend for the 1997 score.
//!
//! ### Example
//! ```no_run
//! use hiphop_map::{ArtifactFetcher, Config, DropboxClient, Session};
//! use hiphop_map::models::{Genre, Geography};
//! use hiphop_map::session::Action;
//!
//! let cfg = Config::load()?;
//! let fetcher = ArtifactFetcher::new(DropboxClient::new(&cfg)?, cfg.folder.clone());
//! let session = Session::default()
//!     .select(Action::SetGeography(Geography::County))
//!     .select(Action::ToggleGenre(Genre::HipHop))
//!     .apply(Action::Load, &fetcher);
//! if let Some(map) = session.loaded() {
//!     hiphop_map::render::render_to_file(
//!         &map.path,
//!         session.selection(),
//!         "map.html",
//!         &Default::default(),
//!     )?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod remote;
pub mod render;
pub mod session;

pub use config::Config;
pub use fetch::ArtifactFetcher;
pub use models::Selection;
pub use remote::{DropboxClient, RemoteStore};
pub use session::Session;
