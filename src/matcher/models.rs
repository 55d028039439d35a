use encoding_rs::Encoding;
use std::fmt;
use std::path::PathBuf;

/// The kind of sidecar file attached to an audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidecarKind {
    Lyrics,
    Cover,
}

impl SidecarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SidecarKind::Lyrics => "lyrics",
            SidecarKind::Cover => "cover",
        }
    }
}

impl fmt::Display for SidecarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audio file found in the scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    /// File name without its extension, original case.
    pub base_name: String,
    /// Lower-cased extension, without the dot.
    pub extension: String,
}

impl AudioFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.base_name.clone())
    }
}

/// A lyric or cover file matched to an audio file by base name.
#[derive(Debug, Clone)]
pub struct SidecarFile {
    pub path: PathBuf,
    pub base_name: String,
    pub kind: SidecarKind,
    /// Declared text encoding, lyrics only.
    pub encoding: Option<&'static Encoding>,
}

/// One unit of work: an audio file and whatever sidecars matched it.
#[derive(Debug, Clone)]
pub struct MatchedJob {
    pub audio: AudioFile,
    pub lyrics: Option<SidecarFile>,
    pub cover: Option<SidecarFile>,
}

impl MatchedJob {
    /// A job is worth running only if it carries at least one sidecar.
    pub fn is_actionable(&self) -> bool {
        self.lyrics.is_some() || self.cover.is_some()
    }
}
