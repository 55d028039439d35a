use std::path::{Path, PathBuf};
use thiserror::Error;

use super::toolkit::ToolkitError;

/// Per-run switches for the orchestrator.
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    pub embed_lyrics: bool,
    pub embed_cover: bool,
    /// Keep lyric sidecars after a successful embed instead of deleting them.
    pub keep_lyrics: bool,
    pub hardware_accel: bool,
    /// Upper bound on concurrent toolkit invocations.
    pub max_concurrent_jobs: usize,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            embed_lyrics: true,
            embed_cover: true,
            keep_lyrics: false,
            hardware_accel: false,
            max_concurrent_jobs: 1,
        }
    }
}

/// Everything the toolkit needs for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRequest {
    pub source: PathBuf,
    pub lyrics: Option<String>,
    pub cover: Option<PathBuf>,
    pub hardware_accel: bool,
}

impl EmbedRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            lyrics: None,
            cover: None,
            hardware_accel: false,
        }
    }

    /// True if there is nothing to embed.
    pub fn is_empty(&self) -> bool {
        self.lyrics.is_none() && self.cover.is_none()
    }

    /// Lower-cased extension of the source file.
    pub fn extension(&self) -> Option<String> {
        self.source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Short human readable description of the payload, e.g. "lyrics and cover".
    pub fn describe(&self) -> &'static str {
        match (self.lyrics.is_some(), self.cover.is_some()) {
            (true, true) => "lyrics and cover",
            (true, false) => "lyrics",
            (false, true) => "cover",
            (false, false) => "nothing",
        }
    }
}

/// Why a single job failed. None of these abort the run.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to read lyrics {path:?}: {source}")]
    LyricsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create temporary output next to {path:?}: {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),

    #[error("toolkit reported success but produced no output")]
    EmptyOutput,

    #[error("failed to replace {path:?}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("interrupted before completion")]
    Interrupted,
}

/// Terminal state of one job.
#[derive(Debug)]
pub enum EmbedStatus {
    /// The audio file was rewritten in place. `payload` says what went in.
    Embedded {
        output: PathBuf,
        payload: &'static str,
    },
    /// Nothing applied to this job, no file was touched.
    Unchanged,
    Failed { reason: JobError },
}

/// Outcome of one job.
#[derive(Debug)]
pub struct EmbedResult {
    pub audio: PathBuf,
    pub status: EmbedStatus,
    /// Set when the embed succeeded but the lyric sidecar could not be removed.
    pub cleanup_warning: Option<String>,
}

impl EmbedResult {
    pub fn embedded(audio: &Path, payload: &'static str) -> Self {
        Self {
            audio: audio.to_path_buf(),
            status: EmbedStatus::Embedded {
                output: audio.to_path_buf(),
                payload,
            },
            cleanup_warning: None,
        }
    }

    pub fn unchanged(audio: &Path) -> Self {
        Self {
            audio: audio.to_path_buf(),
            status: EmbedStatus::Unchanged,
            cleanup_warning: None,
        }
    }

    pub fn failed(audio: &Path, reason: JobError) -> Self {
        Self {
            audio: audio.to_path_buf(),
            status: EmbedStatus::Failed { reason },
            cleanup_warning: None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.status, EmbedStatus::Failed { .. })
    }

    pub fn error(&self) -> Option<&JobError> {
        match &self.status {
            EmbedStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Embedded plus unchanged jobs.
    pub succeeded: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

/// Results of a run, in job order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<EmbedResult>,
}

impl RunReport {
    pub fn push(&mut self, result: EmbedResult) {
        self.results.push(result);
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for result in &self.results {
            match result.status {
                EmbedStatus::Embedded { .. } => summary.succeeded += 1,
                EmbedStatus::Unchanged => {
                    summary.succeeded += 1;
                    summary.unchanged += 1;
                }
                EmbedStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(EmbedResult::is_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_describe() {
        let mut req = EmbedRequest::new("/a.mp3");
        assert!(req.is_empty());
        assert_eq!(req.describe(), "nothing");
        req.lyrics = Some("la".to_string());
        assert_eq!(req.describe(), "lyrics");
        req.cover = Some(PathBuf::from("/a.jpg"));
        assert_eq!(req.describe(), "lyrics and cover");
        assert_eq!(req.extension().as_deref(), Some("mp3"));
    }

    #[test]
    fn test_summary_counts() {
        let mut report = RunReport::default();
        report.push(EmbedResult::embedded(Path::new("/a.mp3"), "lyrics"));
        report.push(EmbedResult::unchanged(Path::new("/b.mp3")));
        report.push(EmbedResult::failed(
            Path::new("/c.mp3"),
            JobError::Interrupted,
        ));

        let summary = report.summary();
        assert_eq!(
            summary,
            RunSummary {
                succeeded: 2,
                unchanged: 1,
                failed: 1
            }
        );
        assert_eq!(summary.to_string(), "2 succeeded, 1 failed");
        assert!(!report.is_success());
    }
}
