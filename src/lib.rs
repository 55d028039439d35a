//! Lyric Embedder Library
//!
//! Pairs audio files with `.lrc` lyrics and cover images and embeds them
//! into the audio containers through ffmpeg. The binary in `main.rs` is a
//! thin CLI over these modules.

pub mod cli_style;
pub mod config;
pub mod embed;
pub mod encoding;
pub mod error;
pub mod matcher;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use embed::{EmbedOptions, FfmpegToolkit, MediaToolkit, Orchestrator, RunReport};
pub use error::ConfigError;
pub use matcher::{match_files, MatchRules, MatchedJob};
