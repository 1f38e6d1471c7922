//! # Composition Engine
//!
//! Turns a job manifest into finished artifacts: fact selection, the shared
//! timeline, the audio mix, per-frame compositing and encoding.

pub mod compositor;
pub mod engine;
pub mod job;

// Re-exports for convenience
pub use compositor::FrameCompositor;
pub use engine::{CompositionEngine, CompositionReport};
pub use job::{FactEntry, FactSelector, JobManifest, Offer, SelectedFact};
