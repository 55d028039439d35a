//! Embedding lyrics and cover art into audio files.
//!
//! [`Orchestrator`] owns the per-file workflow (decode lyrics, write a
//! temporary output, swap it in, clean up sidecars). The actual container
//! rewrite is delegated to a [`MediaToolkit`].

mod models;
mod orchestrator;
mod toolkit;

pub use models::{
    EmbedOptions, EmbedRequest, EmbedResult, EmbedStatus, JobError, RunReport, RunSummary,
};
pub use orchestrator::{Orchestrator, TEMP_FILE_PREFIX};
pub use toolkit::{FfmpegToolkit, MediaToolkit, ToolkitError};
