use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or generating formulas.
#[derive(Error, Debug)]
pub enum Error {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("error reading config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid repository '{0}', expected 'owner/repo'")]
    InvalidRepo(String),

    #[error("project '{0}' not found in config")]
    ProjectNotFound(String),

    #[error("repository or release not found: {0}")]
    NotFound(String),

    #[error("GitHub API rate limit exceeded. Set GITHUB_TOKEN env var.")]
    RateLimited,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("no releases found for {0}")]
    NoReleases(String),

    #[error("no valid releases found for {0}")]
    NoValidReleases(String),

    #[error("no release of {0} could be processed")]
    NoAssets(String),

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
