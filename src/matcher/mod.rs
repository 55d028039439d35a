//! Pairs audio files with lyric and cover sidecars by base file name.
//!
//! Matching is case-insensitive and ignores the sidecar's extension, so
//! `Song1.mp3` pairs with `song1.lrc` and `SONG1.JPG`. Two sidecars of the
//! same kind that normalize to the same name are a configuration error.

mod models;

pub use models::{AudioFile, MatchedJob, SidecarFile, SidecarKind};

use encoding_rs::Encoding;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::encoding::default_encoding;
use crate::error::ConfigError;

/// Audio extensions processed when none are configured.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a"];

/// Lyric sidecar extensions recognized when none are configured.
pub const DEFAULT_LYRICS_EXTENSIONS: &[&str] = &["lrc"];

/// Cover image extensions recognized when none are configured.
pub const DEFAULT_COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Extension allow-lists and lyric encoding used while matching.
#[derive(Debug, Clone)]
pub struct MatchRules {
    pub audio_extensions: Vec<String>,
    pub lyrics_extensions: Vec<String>,
    pub cover_extensions: Vec<String>,
    pub lyrics_encoding: &'static Encoding,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            audio_extensions: to_owned_list(DEFAULT_AUDIO_EXTENSIONS),
            lyrics_extensions: to_owned_list(DEFAULT_LYRICS_EXTENSIONS),
            cover_extensions: to_owned_list(DEFAULT_COVER_EXTENSIONS),
            lyrics_encoding: default_encoding(),
        }
    }
}

impl MatchRules {
    fn extensions_for(&self, kind: SidecarKind) -> &[String] {
        match kind {
            SidecarKind::Lyrics => &self.lyrics_extensions,
            SidecarKind::Cover => &self.cover_extensions,
        }
    }
}

/// Normalize an extension list: lower-case, no leading dot, no blanks.
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn to_owned_list(extensions: &[&str]) -> Vec<String> {
    extensions.iter().map(|e| e.to_string()).collect()
}

/// The key two files must share to match.
pub fn normalize_base_name(base_name: &str) -> String {
    base_name.to_lowercase()
}

/// Split a path into its stem and lower-cased extension when the extension
/// is one of `allowed`.
fn split_known_extension(path: &Path, allowed: &[String]) -> Option<(String, String)> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    if !allowed.contains(&extension) {
        return None;
    }
    let stem = path.file_stem()?.to_string_lossy().into_owned();
    Some((stem, extension))
}

/// Regular, non-hidden files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ConfigError::ReadDir {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        // Hidden files include our own in-flight temporary outputs.
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

/// List the audio files in `dir`, sorted by path.
pub fn scan_audio_files(dir: &Path, rules: &MatchRules) -> Result<Vec<AudioFile>, ConfigError> {
    let mut audio_files: Vec<AudioFile> = list_files(dir)?
        .into_iter()
        .filter(|path| {
            !path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(".temp."))
        })
        .filter_map(|path| {
            let (base_name, extension) = split_known_extension(&path, &rules.audio_extensions)?;
            Some(AudioFile {
                path,
                base_name,
                extension,
            })
        })
        .collect();

    audio_files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(audio_files)
}

/// Build the normalized name -> sidecar lookup for one directory.
pub fn build_sidecar_table(
    dir: &Path,
    kind: SidecarKind,
    rules: &MatchRules,
) -> Result<HashMap<String, SidecarFile>, ConfigError> {
    let mut table: HashMap<String, SidecarFile> = HashMap::new();
    let encoding = match kind {
        SidecarKind::Lyrics => Some(rules.lyrics_encoding),
        SidecarKind::Cover => None,
    };

    for path in list_files(dir)? {
        let Some((base_name, _)) = split_known_extension(&path, rules.extensions_for(kind)) else {
            continue;
        };
        let key = normalize_base_name(&base_name);

        if let Some(existing) = table.get(&key) {
            return Err(ConfigError::AmbiguousSidecar {
                kind,
                base_name: key,
                first: existing.path.clone(),
                second: path,
            });
        }

        table.insert(
            key,
            SidecarFile {
                path,
                base_name,
                kind,
                encoding,
            },
        );
    }

    debug!("Found {} {} files in {:?}", table.len(), kind, dir);
    Ok(table)
}

/// Pair every audio file in `audio_dir` with its sidecars.
///
/// A missing sidecar directory simply yields no matches of that kind. Audio
/// files without any sidecar produce no job. Jobs are ordered by audio path.
pub fn match_files(
    audio_dir: &Path,
    lyrics_dir: Option<&Path>,
    cover_dir: Option<&Path>,
    rules: &MatchRules,
) -> Result<Vec<MatchedJob>, ConfigError> {
    let audio_files = scan_audio_files(audio_dir, rules)?;

    let lyrics_table = lyrics_dir
        .map(|dir| build_sidecar_table(dir, SidecarKind::Lyrics, rules))
        .transpose()?
        .unwrap_or_default();
    let cover_table = cover_dir
        .map(|dir| build_sidecar_table(dir, SidecarKind::Cover, rules))
        .transpose()?
        .unwrap_or_default();

    let mut jobs = Vec::new();
    for audio in audio_files {
        let key = normalize_base_name(&audio.base_name);
        let job = MatchedJob {
            lyrics: lyrics_table.get(&key).cloned(),
            cover: cover_table.get(&key).cloned(),
            audio,
        };

        if job.is_actionable() {
            debug!(
                "Matched {} (lyrics: {}, cover: {})",
                job.audio.file_name(),
                job.lyrics.is_some(),
                job.cover.is_some()
            );
            jobs.push(job);
        } else {
            info!("No lyrics or cover found for {}", job.audio.file_name());
        }
    }

    Ok(jobs)
}
