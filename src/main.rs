use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{error, info, Level};

use shorts_compositor::{
    composition::{CompositionEngine, JobManifest},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "shorts-compositor",
    version,
    about = "Assemble narrated vertical shorts with karaoke captions",
    long_about = "Shorts-Compositor lays a list of narrated facts out on one audio timeline, animates background stills behind them and renders word-synchronized captions, banners and progress indicators into an encoded vertical video."
)]
struct Cli {
    /// Job manifest (TOML) listing facts, narration files and the image directory
    #[arg(short, long)]
    job: PathBuf,

    /// Output directory (defaults to output/video_<timestamp>)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip thumbnail generation
    #[arg(long)]
    no_thumbnail: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Shorts-Compositor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.validate()?;

    let job = JobManifest::from_file(&cli.job)?;
    let output_dir = cli.output_dir.unwrap_or_else(|| {
        PathBuf::from("output").join(format!("video_{}", Local::now().format("%Y%m%d_%H%M%S")))
    });

    let mut engine = CompositionEngine::new(config);
    if cli.no_thumbnail {
        engine = engine.without_thumbnail();
    }

    match engine.compose(&job, &output_dir).await {
        Ok(report) => {
            info!("Video:     {:?}", report.video_path);
            info!("Audio:     {:?}", report.audio_path);
            if let Some(thumbnail) = &report.thumbnail_path {
                info!("Thumbnail: {:?}", thumbnail);
            }
            info!(
                "{} facts | {:.1}s | {} frames | {:.1} MB",
                report.fact_count,
                report.total_duration,
                report.frame_count,
                report.file_size as f64 / 1_048_576.0
            );
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_message());
            Err(e.into())
        }
    }
}
