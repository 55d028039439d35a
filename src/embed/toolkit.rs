//! The external media toolkit seam and its ffmpeg implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::models::EmbedRequest;

/// Errors reported by a media toolkit invocation.
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {}: {stderr}", exit_label(.status))]
    Failed { status: Option<i32>, stderr: String },

    #[error("failed to write lyrics metadata file: {0}")]
    Metadata(#[source] std::io::Error),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}

/// Something that can rewrite an audio container with embedded lyrics and art.
///
/// Implementations write the result to `output` and must not touch the
/// source file.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    async fn embed(&self, request: &EmbedRequest, output: &Path) -> Result<(), ToolkitError>;
}

/// [`MediaToolkit`] backed by the ffmpeg command line tool.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    program: PathBuf,
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegToolkit {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that ffmpeg can be launched at all.
    pub async fn check_available(&self) -> Result<(), ToolkitError> {
        let output = self.run_capture(&["-version"]).await?;
        if !output.status.success() {
            return Err(ToolkitError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    /// True if this ffmpeg build ships NVIDIA NVENC encoders.
    pub async fn supports_hw_accel(&self) -> bool {
        match self.run_capture(&["-hide_banner", "-encoders"]).await {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .to_lowercase()
                .contains("nvenc"),
            Ok(_) => false,
            Err(e) => {
                debug!("Could not list ffmpeg encoders: {}", e);
                false
            }
        }
    }

    async fn run_capture(&self, args: &[&str]) -> Result<std::process::Output, ToolkitError> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolkitError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    /// Build the ffmpeg argument vector for one embed.
    ///
    /// Lyrics travel in `metadata`, an ffmetadata file written by
    /// [`ffmetadata_document`], so argument length limits never apply to them.
    /// Every path is passed as a single argument; nothing goes through a shell.
    pub fn build_args(
        request: &EmbedRequest,
        metadata: Option<&Path>,
        output: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-loglevel", "error"]
            .iter()
            .map(OsString::from)
            .collect();

        if request.hardware_accel {
            args.push("-hwaccel".into());
            args.push("auto".into());
        }

        // Inputs: 0 is the source, then the cover, then the lyrics metadata.
        args.push("-i".into());
        args.push(request.source.as_os_str().to_owned());
        if let Some(cover) = &request.cover {
            args.push("-i".into());
            args.push(cover.as_os_str().to_owned());
        }
        if let Some(metadata) = metadata {
            args.push("-f".into());
            args.push("ffmetadata".into());
            args.push("-i".into());
            args.push(metadata.as_os_str().to_owned());
        }

        if request.cover.is_some() {
            // Replace any existing picture with the new one.
            for arg in [
                "-map",
                "0:a",
                "-map",
                "1:v",
                "-disposition:v:0",
                "attached_pic",
                "-metadata:s:v",
                "title=Album cover",
                "-metadata:s:v",
                "comment=Cover (front)",
            ] {
                args.push(arg.into());
            }
        } else {
            args.push("-map".into());
            args.push("0".into());
        }

        if metadata.is_some() {
            // The first mapping wins on conflicting keys, so new lyrics
            // replace old ones while every other source tag is kept.
            let index = if request.cover.is_some() { "2" } else { "1" };
            args.push("-map_metadata".into());
            args.push(index.into());
        }

        for arg in ["-map_metadata", "0", "-c", "copy"] {
            args.push(arg.into());
        }

        if request.extension().as_deref() == Some("mp3") {
            args.push("-id3v2_version".into());
            args.push("3".into());
        }

        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Render lyrics as an ffmpeg metadata document with a single `lyrics` key.
pub fn ffmetadata_document(lyrics: &str) -> String {
    let mut document = String::from(";FFMETADATA1\nlyrics=");
    for c in lyrics.replace("\r\n", "\n").chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            document.push('\\');
        }
        document.push(c);
    }
    document.push('\n');
    document
}

async fn write_metadata_file(lyrics: &str) -> Result<tempfile::TempPath, ToolkitError> {
    let path = tempfile::Builder::new()
        .prefix(".lyric-embed-meta-")
        .suffix(".txt")
        .tempfile()
        .map_err(ToolkitError::Metadata)?
        .into_temp_path();
    tokio::fs::write(&path, ffmetadata_document(lyrics))
        .await
        .map_err(ToolkitError::Metadata)?;
    Ok(path)
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn embed(&self, request: &EmbedRequest, output: &Path) -> Result<(), ToolkitError> {
        // Deleted on drop, after ffmpeg has exited or been killed.
        let metadata = match &request.lyrics {
            Some(lyrics) => Some(write_metadata_file(lyrics).await?),
            None => None,
        };
        let args = Self::build_args(request, metadata.as_deref(), output);
        debug!("Running {:?} with {} arguments", self.program, args.len());

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolkitError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolkitError::Failed {
                status: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
