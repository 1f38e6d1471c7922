// Render individual composited frames of a job to PNG without encoding

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use shorts_compositor::{
    composition::{CompositionEngine, JobManifest},
    config::Config,
};

#[derive(Parser)]
#[command(name = "render_still", about = "Render single frames of a job to PNG")]
struct Cli {
    /// Job manifest (TOML)
    #[arg(short, long)]
    job: PathBuf,

    /// Times to render, in seconds
    #[arg(short, long = "at", num_args = 1.., required = true)]
    at: Vec<f64>,

    /// Directory for the PNG files
    #[arg(short, long, default_value = "stills")]
    out: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;
    let job = JobManifest::from_file(&cli.job)?;

    let engine = CompositionEngine::new(config);
    let (_, compositor) = engine.prepare(&job).await?;
    let total = compositor.timeline().total_duration();

    std::fs::create_dir_all(&cli.out)?;

    let mut rendered = 0;
    for &t in &cli.at {
        if !(0.0..total).contains(&t) {
            warn!("Skipping {:.2}s, timeline is {:.2}s long", t, total);
            continue;
        }
        let path = cli.out.join(format!("frame_{:08.3}.png", t));
        compositor.render(t).save_png(&path)?;
        info!("✅ {:.2}s -> {:?}", t, path);
        rendered += 1;
    }

    if rendered == 0 {
        bail!("no requested time fell inside [0, {:.2})", total);
    }
    Ok(())
}
