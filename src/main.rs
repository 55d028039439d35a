use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyric_embedder::cli_style::{after_help, get_styles};
use lyric_embedder::config::{AppConfig, CliConfig, FileConfig};
use lyric_embedder::embed::{FfmpegToolkit, Orchestrator};
use lyric_embedder::error::ConfigError;
use lyric_embedder::matcher::match_files;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Embed .lrc lyrics and cover images into audio files.
#[derive(Parser, Debug)]
#[command(name = "lyric-embed", version, styles = get_styles(), after_help = after_help())]
struct CliArgs {
    /// Directory containing the audio files. Defaults to the current directory.
    #[clap(short = 'd', long = "dir", value_parser = parse_path)]
    pub audio_dir: Option<PathBuf>,

    /// Directory containing the lyric files. Defaults to the audio directory.
    #[clap(short = 'l', long, value_parser = parse_path)]
    pub lyrics_dir: Option<PathBuf>,

    /// Directory containing cover images. Covers are only embedded when set.
    #[clap(short = 'c', long = "cover", value_parser = parse_path)]
    pub cover_dir: Option<PathBuf>,

    /// Text encoding of the lyric files [default: gb2312].
    #[clap(short, long)]
    pub encoding: Option<String>,

    /// Keep lyric files after embedding them.
    #[clap(short, long = "keep")]
    pub keep_lyrics: bool,

    /// Do not embed lyrics, only covers.
    #[clap(short, long)]
    pub skip_lyrics: bool,

    /// Use hardware acceleration when ffmpeg supports it.
    #[clap(short, long)]
    pub gpu: bool,

    /// Maximum number of files processed at the same time.
    #[clap(short = 'j', long = "jobs")]
    pub max_concurrent_jobs: Option<usize>,

    /// Path to the ffmpeg binary.
    #[clap(long = "ffmpeg")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            audio_dir: args.audio_dir.clone(),
            lyrics_dir: args.lyrics_dir.clone(),
            cover_dir: args.cover_dir.clone(),
            encoding: args.encoding.clone(),
            keep_lyrics: args.keep_lyrics,
            skip_lyrics: args.skip_lyrics,
            gpu: args.gpu,
            ffmpeg_path: args.ffmpeg_path.clone(),
            max_concurrent_jobs: args.max_concurrent_jobs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    match run(&cli_args).await {
        Ok(code) => Ok(code),
        Err(e) => {
            error!("{:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(cli_args: &CliArgs) -> Result<ExitCode> {
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(cli_args), file_config)?;

    let toolkit = FfmpegToolkit::new(&config.ffmpeg_path);
    toolkit
        .check_available()
        .await
        .map_err(|e| ConfigError::ToolkitUnavailable(e.to_string()))?;

    let hardware_accel = if config.gpu {
        if toolkit.supports_hw_accel().await {
            info!("Hardware acceleration enabled");
            true
        } else {
            warn!(
                "No hardware encoder found in {:?}, using software processing",
                toolkit.program()
            );
            false
        }
    } else {
        false
    };

    info!("Audio directory: {:?}", config.audio_dir);
    if let Some(dir) = config.lyrics_dir() {
        info!("Lyrics directory: {:?} ({})", dir, config.encoding.name());
    }
    if let Some(dir) = &config.cover_dir {
        info!("Cover directory: {:?}", dir);
    }

    let jobs = match_files(
        &config.audio_dir,
        config.lyrics_dir(),
        config.cover_dir.as_deref(),
        &config.match_rules(),
    )?;
    if jobs.is_empty() {
        info!("No audio files with matching lyrics or covers found");
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping running jobs...");
            signal_token.cancel();
        }
    });

    let orchestrator = Orchestrator::new(Arc::new(toolkit), config.embed_options(hardware_accel));
    let report = orchestrator.run(jobs, shutdown).await;

    let summary = report.summary();
    info!("{}", summary);

    if summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
