//! Fake [`MediaToolkit`] implementations.

#![allow(dead_code)]

use async_trait::async_trait;
use lyric_embedder::embed::{EmbedRequest, MediaToolkit, ToolkitError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Separates the copied source from the appended payload in fake outputs.
pub const EMBED_MARKER: &[u8] = b"\n#EMBEDDED#\n";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Copies the source to the output, then appends [`EMBED_MARKER`], the
/// lyrics and the cover path. Every request is recorded.
#[derive(Default)]
pub struct RecordingToolkit {
    requests: Mutex<Vec<EmbedRequest>>,
}

impl RecordingToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<EmbedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The request made for the given audio file name.
    pub fn request_for(&self, name: &str) -> Option<EmbedRequest> {
        self.requests()
            .into_iter()
            .find(|r| file_name(&r.source) == name)
    }

    fn write_output(request: &EmbedRequest, output: &Path) -> Result<(), ToolkitError> {
        let mut data = std::fs::read(&request.source).map_err(|source| ToolkitError::Spawn {
            program: PathBuf::from("fake"),
            source,
        })?;
        data.extend_from_slice(EMBED_MARKER);
        if let Some(lyrics) = &request.lyrics {
            data.extend_from_slice(lyrics.as_bytes());
        }
        if let Some(cover) = &request.cover {
            data.extend_from_slice(cover.to_string_lossy().as_bytes());
        }
        std::fs::write(output, data).map_err(|source| ToolkitError::Spawn {
            program: PathBuf::from("fake"),
            source,
        })
    }
}

#[async_trait]
impl MediaToolkit for RecordingToolkit {
    async fn embed(&self, request: &EmbedRequest, output: &Path) -> Result<(), ToolkitError> {
        self.requests.lock().unwrap().push(request.clone());
        Self::write_output(request, output)
    }
}

/// Fails for the listed audio file names after writing a partial output,
/// behaves like [`RecordingToolkit`] for everything else.
pub struct FailingToolkit {
    failing: Vec<String>,
    inner: RecordingToolkit,
}

impl FailingToolkit {
    pub fn new(failing: &[&str]) -> Self {
        Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            inner: RecordingToolkit::new(),
        }
    }
}

#[async_trait]
impl MediaToolkit for FailingToolkit {
    async fn embed(&self, request: &EmbedRequest, output: &Path) -> Result<(), ToolkitError> {
        if self.failing.contains(&file_name(&request.source)) {
            let _ = std::fs::write(output, b"partial");
            return Err(ToolkitError::Failed {
                status: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        self.inner.embed(request, output).await
    }
}

/// Sleeps per audio file name before delegating to a [`RecordingToolkit`],
/// and tracks the completion order and peak concurrency.
pub struct DelayedToolkit {
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    inner: RecordingToolkit,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl DelayedToolkit {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            delays: HashMap::new(),
            default_delay,
            inner: RecordingToolkit::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaToolkit for DelayedToolkit {
    async fn embed(&self, request: &EmbedRequest, output: &Path) -> Result<(), ToolkitError> {
        let name = file_name(&request.source);
        let delay = self
            .delays
            .get(&name)
            .copied()
            .unwrap_or(self.default_delay);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        // Half the work lands before the delay, like a real encoder
        let _ = std::fs::write(output, b"partial");
        tokio::time::sleep(delay).await;

        let result = self.inner.embed(request, output).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(name);
        result
    }
}
