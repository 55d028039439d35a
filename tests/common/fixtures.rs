//! Temporary music library layouts.

#![allow(dead_code)]

use lyric_embedder::embed::TEMP_FILE_PREFIX;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in audio payload. The fake toolkits never parse it.
pub const AUDIO_BYTES: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00fake-audio-frames";

/// Stand-in cover image.
pub const COVER_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

/// A temporary directory with `audio/`, `lyrics/` and `covers/` inside.
pub struct MusicLibrary {
    // Keeps the directory alive for the duration of the test
    _root: TempDir,
    pub audio_dir: PathBuf,
    pub lyrics_dir: PathBuf,
    pub cover_dir: PathBuf,
}

impl MusicLibrary {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let audio_dir = root.path().join("audio");
        let lyrics_dir = root.path().join("lyrics");
        let cover_dir = root.path().join("covers");
        for dir in [&audio_dir, &lyrics_dir, &cover_dir] {
            fs::create_dir_all(dir).expect("Failed to create library dir");
        }
        Self {
            _root: root,
            audio_dir,
            lyrics_dir,
            cover_dir,
        }
    }

    pub fn add_audio(&self, name: &str) -> PathBuf {
        write(&self.audio_dir, name, AUDIO_BYTES)
    }

    pub fn add_lyrics(&self, name: &str, text: &str) -> PathBuf {
        self.add_lyrics_bytes(name, text.as_bytes())
    }

    pub fn add_lyrics_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        write(&self.lyrics_dir, name, bytes)
    }

    pub fn add_cover(&self, name: &str) -> PathBuf {
        write(&self.cover_dir, name, COVER_BYTES)
    }

    pub fn read_audio(&self, name: &str) -> Vec<u8> {
        fs::read(self.audio_dir.join(name)).expect("Failed to read audio file")
    }
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("Failed to write fixture");
    path
}

/// Temporary outputs left behind in `dir`.
pub fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .expect("Failed to list dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().starts_with(TEMP_FILE_PREFIX))
                .unwrap_or(false)
        })
        .collect()
}
