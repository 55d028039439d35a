mod file_config;

pub use file_config::{ExtensionsConfig, FileConfig};

use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

use crate::embed::EmbedOptions;
use crate::encoding::resolve_encoding;
use crate::error::ConfigError;
use crate::matcher::{
    normalize_extensions, MatchRules, DEFAULT_AUDIO_EXTENSIONS, DEFAULT_COVER_EXTENSIONS,
    DEFAULT_LYRICS_EXTENSIONS,
};

/// Upper bound for the default number of concurrent jobs.
pub const MAX_DEFAULT_JOBS: usize = 4;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub audio_dir: Option<PathBuf>,
    pub lyrics_dir: Option<PathBuf>,
    pub cover_dir: Option<PathBuf>,
    pub encoding: Option<String>,
    pub keep_lyrics: bool,
    pub skip_lyrics: bool,
    pub gpu: bool,
    pub ffmpeg_path: Option<PathBuf>,
    pub max_concurrent_jobs: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Directories
    pub audio_dir: PathBuf,
    pub lyrics_dir: PathBuf,
    pub cover_dir: Option<PathBuf>,

    // Behaviour
    pub encoding: &'static Encoding,
    pub keep_lyrics: bool,
    pub skip_lyrics: bool,
    pub gpu: bool,
    pub ffmpeg_path: PathBuf,
    pub max_concurrent_jobs: usize,

    // Extension allow-lists, normalized
    pub audio_extensions: Vec<String>,
    pub lyrics_extensions: Vec<String>,
    pub cover_extensions: Vec<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let audio_dir = file
            .audio_dir
            .map(PathBuf::from)
            .or_else(|| cli.audio_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let lyrics_dir = file
            .lyrics_dir
            .map(PathBuf::from)
            .or_else(|| cli.lyrics_dir.clone())
            .unwrap_or_else(|| audio_dir.clone());
        let cover_dir = file
            .cover_dir
            .map(PathBuf::from)
            .or_else(|| cli.cover_dir.clone());

        let keep_lyrics = file.keep_lyrics.unwrap_or(cli.keep_lyrics);
        let skip_lyrics = file.skip_lyrics.unwrap_or(cli.skip_lyrics);
        let gpu = file.gpu.unwrap_or(cli.gpu);

        if skip_lyrics && cover_dir.is_none() {
            return Err(ConfigError::NothingToEmbed);
        }

        validate_dir(&audio_dir)?;
        if !skip_lyrics {
            validate_dir(&lyrics_dir)?;
        }
        if let Some(dir) = &cover_dir {
            validate_dir(dir)?;
        }

        let encoding = resolve_encoding(file.encoding.as_deref().or(cli.encoding.as_deref()))?;

        let ffmpeg_path = file
            .ffmpeg_path
            .map(PathBuf::from)
            .or_else(|| cli.ffmpeg_path.clone())
            .unwrap_or_else(|| PathBuf::from("ffmpeg"));

        let max_concurrent_jobs = file
            .max_concurrent_jobs
            .or(cli.max_concurrent_jobs)
            .unwrap_or_else(default_concurrency);
        if max_concurrent_jobs == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        let extensions = file.extensions.unwrap_or_default();
        let audio_extensions = extension_list(extensions.audio, DEFAULT_AUDIO_EXTENSIONS);
        let lyrics_extensions = extension_list(extensions.lyrics, DEFAULT_LYRICS_EXTENSIONS);
        let cover_extensions = extension_list(extensions.cover, DEFAULT_COVER_EXTENSIONS);

        Ok(Self {
            audio_dir,
            lyrics_dir,
            cover_dir,
            encoding,
            keep_lyrics,
            skip_lyrics,
            gpu,
            ffmpeg_path,
            max_concurrent_jobs,
            audio_extensions,
            lyrics_extensions,
            cover_extensions,
        })
    }

    /// Directory to search for lyric sidecars, `None` in cover-only mode.
    pub fn lyrics_dir(&self) -> Option<&Path> {
        if self.skip_lyrics {
            None
        } else {
            Some(self.lyrics_dir.as_path())
        }
    }

    pub fn match_rules(&self) -> MatchRules {
        MatchRules {
            audio_extensions: self.audio_extensions.clone(),
            lyrics_extensions: self.lyrics_extensions.clone(),
            cover_extensions: self.cover_extensions.clone(),
            lyrics_encoding: self.encoding,
        }
    }

    /// Orchestrator options. `hardware_accel` is passed separately because it
    /// depends on probing the toolkit, not just on the `gpu` switch.
    pub fn embed_options(&self, hardware_accel: bool) -> EmbedOptions {
        EmbedOptions {
            embed_lyrics: !self.skip_lyrics,
            embed_cover: self.cover_dir.is_some(),
            keep_lyrics: self.keep_lyrics,
            hardware_accel,
            max_concurrent_jobs: self.max_concurrent_jobs,
        }
    }
}

fn validate_dir(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingDirectory(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Configured list if it has any usable entry, the built-in list otherwise.
fn extension_list(configured: Option<Vec<String>>, defaults: &[&str]) -> Vec<String> {
    configured
        .map(|list| normalize_extensions(list.as_slice()))
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| normalize_extensions(defaults))
}

/// Available parallelism, capped at [`MAX_DEFAULT_JOBS`].
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_DEFAULT_JOBS)
}
