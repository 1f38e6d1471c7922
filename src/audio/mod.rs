//! # Audio Module
//!
//! Builds the single audio timeline the video is locked to: narration
//! ingestion, ambient bed and cue tone synthesis, mixing and WAV export.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shorts_compositor::audio::{AudioLoader, AudioTimelineMixer, NarrationClip};
//! use shorts_compositor::config::AudioConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AudioConfig::default();
//! let audio = AudioLoader::load("f0.mp3").await?;
//! let clip = NarrationClip::prepare(&audio, &config);
//!
//! let mixer = AudioTimelineMixer::new(config);
//! let mix = mixer.mix(clip.duration(), &[(0.0, &clip)]);
//! println!("Mixed {:.1}s", mix.duration);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod mixer;
pub mod narration;
pub mod synth;
pub mod types;
pub mod writer;

pub use loader::AudioLoader;
pub use mixer::AudioTimelineMixer;
pub use narration::NarrationClip;
pub use types::{sample_count, AudioData, MixedAudio};
pub use writer::AudioWriter;
