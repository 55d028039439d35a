//! Errors that abort a run before any job starts.

use std::path::PathBuf;
use thiserror::Error;

use crate::matcher::SidecarKind;

/// Fatal configuration problems. Every variant is detected before the first
/// file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Directory does not exist: {0:?}")]
    MissingDirectory(PathBuf),

    #[error("Path is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Unsupported lyrics encoding: '{0}'")]
    UnsupportedEncoding(String),

    #[error("Ambiguous {kind} files for '{base_name}': {first:?} and {second:?}")]
    AmbiguousSidecar {
        kind: SidecarKind,
        base_name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Nothing to embed: lyrics are skipped and no cover directory was given")]
    NothingToEmbed,

    #[error("max_concurrent_jobs must be at least 1")]
    InvalidConcurrency,

    #[error("Failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Media toolkit not available: {0}")]
    ToolkitUnavailable(String),
}
