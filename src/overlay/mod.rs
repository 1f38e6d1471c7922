//! # Overlay Layers
//!
//! Time-driven decorations drawn onto a transparent canvas and alpha-blended
//! over the background: particles, karaoke captions, banners, segment dots
//! and the progress bar.

pub mod banners;
pub mod canvas;
pub mod dots;
pub mod karaoke;
pub mod particles;
pub mod progress;
pub mod stack;
pub mod text;
pub mod traits;

pub use canvas::{OverlayCanvas, Rect};
pub use particles::{Particle, ParticleField};
pub use stack::LayerStack;
pub use text::{Anchor, TextRenderer, TextStyle};
pub use traits::{FrameContext, Layer};
