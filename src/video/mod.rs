//! # Video Module
//!
//! Background ingestion and animation, frame encoding through FFmpeg and
//! thumbnail generation.

pub mod background;
pub mod encoder;
pub mod loader;
pub mod thumbnail;
pub mod types;

pub use background::{BackgroundAnimator, BackgroundSample, ClipEffect, ClipSpec};
pub use encoder::{EncodedVideo, EncoderSession, FfmpegEncoder, FrameSink};
pub use loader::ImageLoader;
pub use thumbnail::ThumbnailGenerator;
pub use types::{BackgroundImage, Frame};
