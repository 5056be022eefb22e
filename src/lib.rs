//! # brewgen
//!
//! Generates Homebrew formulas from GitHub releases: fetches release
//! metadata, matches assets to platforms, checksums them and renders one
//! formula per project, plus pinned `name@major.minor` formulas for past
//! minor versions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brewgen::{Downloader, FormulaDir, Generator, Project, ReleaseApi};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let api = ReleaseApi::new();
//!     let generator = Generator::new(
//!         api.clone(),
//!         Downloader::new(api),
//!         FormulaDir::new("Formula", false),
//!     );
//!     let projects = vec![Project::new("owner/tool").unwrap()];
//!     let summary = generator.run(projects).await;
//!     assert!(summary.is_success());
//! }
//! ```

pub mod api;
pub mod config;
pub mod downloader;
pub mod error;
pub mod files;
pub mod formula;
pub mod generator;
pub mod platform;
pub mod progress;
pub mod release;
pub mod version;

pub use api::ReleaseApi;
pub use config::{format_project_list, load_config, select_projects, Project};
pub use downloader::Downloader;
pub use error::{Error, Result};
pub use files::FormulaDir;
pub use generator::{Generator, ProjectReport, Summary};
pub use platform::Platform;
pub use progress::default_progress_fn;
pub use release::{Asset, Release};
