//! # Shorts-Compositor
//!
//! Assemble narrated vertical short videos: a series of facts, each with
//! its own narration clip, laid out on one audio timeline with animated
//! backgrounds and karaoke captions locked to it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shorts_compositor::{
//!     composition::{CompositionEngine, JobManifest},
//!     config::Config,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let job = JobManifest::from_file("job/job.toml")?;
//! let engine = CompositionEngine::new(Config::default());
//!
//! let report = engine.compose(&job, "output/").await?;
//! println!("{} facts, {:.1}s", report.fact_count, report.total_duration);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`timing`] - Word timing estimation and the segment timeline
//! - [`audio`] - Narration loading, ambient synthesis and mixing
//! - [`video`] - Background animation, encoding and thumbnails
//! - [`overlay`] - Time-driven layers drawn over each frame
//! - [`composition`] - Frame compositor and the end-to-end engine
//! - [`config`] - Configuration management
//!
//! ## Custom Layers
//!
//! Extra decorations can be added by implementing [`Layer`](overlay::Layer):
//!
//! ```rust
//! use shorts_compositor::overlay::{FrameContext, Layer, OverlayCanvas, Rect};
//!
//! struct Letterbox;
//!
//! impl Layer for Letterbox {
//!     fn name(&self) -> &str {
//!         "letterbox"
//!     }
//!
//!     fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
//!         let bar = Rect::new(0.0, 0.0, ctx.width(), 40.0);
//!         canvas.fill_rect(bar, [0, 0, 0, 255]);
//!     }
//! }
//! ```

pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod overlay;
pub mod timing;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::CompositionEngine,
    config::Config,
    error::{CompositorError, Result},
};
