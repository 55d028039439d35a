//! Runs matched jobs through a [`MediaToolkit`], one temporary output per job.

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::models::{EmbedOptions, EmbedRequest, EmbedResult, EmbedStatus, JobError, RunReport};
use super::toolkit::MediaToolkit;
use crate::encoding::{decode_lyrics, default_encoding};
use crate::matcher::MatchedJob;

/// Prefix of the hidden temporary files written next to each audio file.
pub const TEMP_FILE_PREFIX: &str = ".lyric-embed-";

/// Drives every job from pending to a terminal [`EmbedStatus`].
///
/// Jobs are independent: a failure is recorded in that job's result and the
/// run moves on. Up to `max_concurrent_jobs` toolkit invocations run at once,
/// but results are always reported in job order.
pub struct Orchestrator {
    toolkit: Arc<dyn MediaToolkit>,
    options: EmbedOptions,
}

impl Orchestrator {
    pub fn new(toolkit: Arc<dyn MediaToolkit>, options: EmbedOptions) -> Self {
        Self { toolkit, options }
    }

    pub fn options(&self) -> &EmbedOptions {
        &self.options
    }

    /// Process all jobs. Cancelling `shutdown` stops in-flight jobs (their
    /// temporary files are removed) and marks every unfinished job as
    /// interrupted.
    pub async fn run(&self, jobs: Vec<MatchedJob>, shutdown: CancellationToken) -> RunReport {
        let total = jobs.len();
        let concurrency = self.options.max_concurrent_jobs.max(1);
        info!(
            "Processing {} files, up to {} at a time",
            total, concurrency
        );

        let mut results = stream::iter(jobs)
            .map(|job| self.process(job, &shutdown))
            .buffered(concurrency);

        let mut report = RunReport::default();
        while let Some(result) = results.next().await {
            log_result(report.results.len() + 1, total, &result);
            report.push(result);
        }
        report
    }

    async fn process(&self, job: MatchedJob, shutdown: &CancellationToken) -> EmbedResult {
        let audio = job.audio.path.as_path();
        if shutdown.is_cancelled() {
            return EmbedResult::failed(audio, JobError::Interrupted);
        }

        // Cancellation may only win before the original is replaced.
        let written = tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(JobError::Interrupted),
            written = self.write_job(&job) => written,
        };

        match written {
            Ok(Some(request)) => self.finish_job(&job, &request).await,
            Ok(None) => EmbedResult::unchanged(audio),
            Err(e) => EmbedResult::failed(audio, e),
        }
    }

    /// Build the request and swap the embedded output in. `None` when there
    /// was nothing to embed.
    async fn write_job(&self, job: &MatchedJob) -> Result<Option<EmbedRequest>, JobError> {
        let request = self.build_request(job).await?;
        if request.is_empty() {
            return Ok(None);
        }

        debug!("Embedding {} into {:?}", request.describe(), job.audio.path);
        self.write_embedded(&request, &job.audio.path).await?;
        Ok(Some(request))
    }

    /// Sidecar cleanup after the original has been replaced.
    async fn finish_job(&self, job: &MatchedJob, request: &EmbedRequest) -> EmbedResult {
        let mut result = EmbedResult::embedded(&job.audio.path, request.describe());

        // Covers are shared between albums, only lyrics are consumed.
        if request.lyrics.is_some() && !self.options.keep_lyrics {
            if let Some(lyrics) = &job.lyrics {
                if let Err(e) = tokio::fs::remove_file(&lyrics.path).await {
                    result.cleanup_warning =
                        Some(format!("could not delete {:?}: {}", lyrics.path, e));
                }
            }
        }

        result
    }

    /// Collect what applies to this job under the current options.
    async fn build_request(&self, job: &MatchedJob) -> Result<EmbedRequest, JobError> {
        let mut request = EmbedRequest::new(&job.audio.path);
        request.hardware_accel = self.options.hardware_accel;

        if self.options.embed_lyrics {
            if let Some(sidecar) = &job.lyrics {
                let bytes =
                    tokio::fs::read(&sidecar.path)
                        .await
                        .map_err(|source| JobError::LyricsRead {
                            path: sidecar.path.clone(),
                            source,
                        })?;

                let decoded = decode_lyrics(&bytes, sidecar.encoding.unwrap_or(default_encoding()));
                if decoded.had_errors {
                    warn!(
                        "Dropped malformed {} sequences in {:?}",
                        decoded.encoding.name(),
                        sidecar.path
                    );
                }

                if decoded.is_blank() {
                    warn!("Lyrics file {:?} is empty, skipping lyrics", sidecar.path);
                } else {
                    request.lyrics = Some(decoded.text);
                }
            }
        }

        if self.options.embed_cover {
            request.cover = job.cover.as_ref().map(|cover| cover.path.clone());
        }

        Ok(request)
    }

    /// Have the toolkit write into a temporary file beside `audio`, then
    /// atomically move it over `audio`. The original is untouched on error.
    async fn write_embedded(&self, request: &EmbedRequest, audio: &Path) -> Result<(), JobError> {
        let dir = audio
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let suffix = request
            .extension()
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        // Removed on drop, including when this future is cancelled.
        let temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|source| JobError::TempFile {
                path: audio.to_path_buf(),
                source,
            })?
            .into_temp_path();

        self.toolkit.embed(request, &temp).await?;

        let written = tokio::fs::metadata(&temp)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(JobError::EmptyOutput);
        }

        // Temporary files are created owner-only; carry the original mode over.
        if let Ok(metadata) = tokio::fs::metadata(audio).await {
            if let Err(e) = tokio::fs::set_permissions(&temp, metadata.permissions()).await {
                debug!("Could not copy permissions to {:?}: {}", temp, e);
            }
        }

        temp.persist(audio).map_err(|e| JobError::Replace {
            path: audio.to_path_buf(),
            source: e.error,
        })?;

        Ok(())
    }
}

fn log_result(position: usize, total: usize, result: &EmbedResult) {
    let name = result
        .audio
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| result.audio.display().to_string());

    match &result.status {
        EmbedStatus::Embedded { payload, .. } => {
            info!("[{}/{}] Embedded {} into {}", position, total, payload, name)
        }
        EmbedStatus::Unchanged => {
            info!("[{}/{}] Nothing to embed for {}", position, total, name)
        }
        EmbedStatus::Failed { reason } => {
            error!("[{}/{}] Failed to process {}: {}", position, total, name, reason)
        }
    }

    if let Some(warning) = &result.cleanup_warning {
        warn!("[{}/{}] Embedded {}, but {}", position, total, name, warning);
    }
}
