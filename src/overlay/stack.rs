use tracing::debug;

use crate::overlay::banners::{HeaderLayer, OutroLayer};
use crate::overlay::canvas::OverlayCanvas;
use crate::overlay::dots::SegmentDotsLayer;
use crate::overlay::karaoke::KaraokeLayer;
use crate::overlay::particles::{ParticleField, ParticleLayer};
use crate::overlay::progress::ProgressLayer;
use crate::overlay::traits::{FrameContext, Layer};

/// Ordered list of overlay layers, drawn back to front
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    pub fn empty() -> Self {
        Self { layers: Vec::new() }
    }

    /// The built-in layers in their fixed draw order
    pub fn builtin(particles: ParticleField) -> Self {
        let mut stack = Self::empty();
        stack.push(ParticleLayer::new(particles));
        stack.push(KaraokeLayer);
        stack.push(HeaderLayer);
        stack.push(SegmentDotsLayer);
        stack.push(ProgressLayer);
        stack.push(OutroLayer);
        stack
    }

    /// Append a layer on top of the existing ones
    pub fn push<L: Layer + 'static>(&mut self, layer: L) {
        debug!("Registered overlay layer '{}'", layer.name());
        self.layers.push(Box::new(layer));
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn draw_all(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        for layer in &self.layers {
            layer.draw(canvas, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;

    #[test]
    fn test_builtin_order() {
        let stack = LayerStack::builtin(ParticleField::generate(4, 42, &CanvasConfig::default()));
        assert_eq!(
            stack.names(),
            vec!["particles", "karaoke", "header", "dots", "progress", "outro"]
        );
    }

    #[test]
    fn test_empty_stack() {
        let stack = LayerStack::empty();
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
    }
}
