//! Text encoding resolution and lyric decoding.
//!
//! The encoding is always resolved up front, either from the user supplied
//! label or from [`DEFAULT_LYRICS_ENCODING`]. There is no locale sniffing.

use encoding_rs::{Encoding, REPLACEMENT, UTF_8};
use tracing::debug;

use crate::error::ConfigError;

/// Encoding assumed for lyric files when none is given. `encoding_rs` maps
/// this label to GBK, a superset of GB2312.
pub const DEFAULT_LYRICS_ENCODING: &str = "gb2312";

/// The encoding [`DEFAULT_LYRICS_ENCODING`] resolves to.
pub fn default_encoding() -> &'static Encoding {
    encoding_rs::GBK
}

/// Resolve an encoding label into an `encoding_rs` encoding.
pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, ConfigError> {
    let label = label.unwrap_or(DEFAULT_LYRICS_ENCODING);
    match Encoding::for_label(label.trim().as_bytes()) {
        // "replacement" is a WHATWG label for a decoder that yields nothing useful.
        Some(encoding) if encoding != REPLACEMENT => Ok(encoding),
        _ => Err(ConfigError::UnsupportedEncoding(label.to_string())),
    }
}

/// Lyric text decoded from a sidecar file.
#[derive(Debug, Clone)]
pub struct DecodedLyrics {
    pub text: String,
    /// The encoding that produced `text`.
    pub encoding: &'static Encoding,
    /// True if malformed sequences were dropped while decoding.
    pub had_errors: bool,
}

impl DecodedLyrics {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Decode raw lyric bytes.
///
/// Malformed sequences are dropped rather than replaced. When the declared
/// encoding chokes on input that is valid UTF-8, the UTF-8 reading wins.
pub fn decode_lyrics(bytes: &[u8], encoding: &'static Encoding) -> DecodedLyrics {
    let (decoded, had_errors) = encoding.decode_with_bom_removal(bytes);

    if had_errors && encoding != UTF_8 {
        if let Some(utf8) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
            debug!(
                "Input is not valid {}, decoding as UTF-8 instead",
                encoding.name()
            );
            return DecodedLyrics {
                text: clean_text(&utf8),
                encoding: UTF_8,
                had_errors: false,
            };
        }
    }

    DecodedLyrics {
        text: clean_text(&decoded),
        encoding,
        had_errors,
    }
}

fn clean_text(text: &str) -> String {
    text.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}
