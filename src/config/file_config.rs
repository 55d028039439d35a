use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Directories (can override CLI)
    pub audio_dir: Option<String>,
    pub lyrics_dir: Option<String>,
    pub cover_dir: Option<String>,

    // Behaviour
    pub encoding: Option<String>,
    pub keep_lyrics: Option<bool>,
    pub skip_lyrics: Option<bool>,
    pub gpu: Option<bool>,
    pub ffmpeg_path: Option<String>,
    pub max_concurrent_jobs: Option<usize>,

    pub extensions: Option<ExtensionsConfig>,
}

/// `[extensions]` table. Each list replaces the built-in one.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ExtensionsConfig {
    pub audio: Option<Vec<String>>,
    pub lyrics: Option<Vec<String>>,
    pub cover: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
