//! Common test infrastructure
//!
//! Fake media toolkits and on-disk music library fixtures, so the
//! integration tests never need a real ffmpeg.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{MusicLibrary, RecordingToolkit};
//!
//! #[tokio::test]
//! async fn test_embed() {
//!     let library = MusicLibrary::new();
//!     library.add_audio("song.mp3");
//!     let toolkit = RecordingToolkit::new();
//!     // ...
//! }
//! ```

mod fixtures;
mod toolkit;

// Public API - this is what tests import
pub use fixtures::{leftover_temp_files, MusicLibrary, AUDIO_BYTES};
pub use toolkit::{DelayedToolkit, FailingToolkit, RecordingToolkit, EMBED_MARKER};
