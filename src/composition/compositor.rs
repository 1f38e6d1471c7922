use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{CanvasConfig, OverlayConfig, RenderConfig};
use crate::error::{Result, VideoError};
use crate::overlay::{FrameContext, LayerStack, OverlayCanvas, ParticleField, TextRenderer};
use crate::timing::Timeline;
use crate::video::background::BackgroundAnimator;
use crate::video::encoder::FrameSink;
use crate::video::types::Frame;

/// Renders final frames as a pure function of time
///
/// Everything held here is an immutable snapshot built once per job, so
/// frames can be rendered in any order and on any thread.
pub struct FrameCompositor {
    canvas: CanvasConfig,
    overlay: OverlayConfig,
    timeline: Timeline,
    background: BackgroundAnimator,
    layers: LayerStack,
    text: TextRenderer,
}

impl FrameCompositor {
    /// Compositor with the built-in layer stack
    pub fn new(
        canvas: CanvasConfig,
        overlay: OverlayConfig,
        timeline: Timeline,
        background: BackgroundAnimator,
        text: TextRenderer,
    ) -> Self {
        let layers = LayerStack::builtin(ParticleField::from_config(&overlay, &canvas));
        Self::with_layers(canvas, overlay, timeline, background, text, layers)
    }

    pub fn with_layers(
        canvas: CanvasConfig,
        overlay: OverlayConfig,
        timeline: Timeline,
        background: BackgroundAnimator,
        text: TextRenderer,
        layers: LayerStack,
    ) -> Self {
        debug!("Compositor layers: {}", layers.names().join(", "));
        Self {
            canvas,
            overlay,
            timeline,
            background,
            layers,
            text,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn background(&self) -> &BackgroundAnimator {
        &self.background
    }

    pub fn text(&self) -> &TextRenderer {
        &self.text
    }

    /// Number of output frames, `round(total_duration * fps)`
    pub fn frame_count(&self) -> usize {
        self.canvas.frame_count(self.timeline.total_duration())
    }

    /// Composite frame at absolute time `t`
    ///
    /// # Panics
    ///
    /// If `t` is outside `[0, total_duration)`.
    pub fn render(&self, t: f64) -> Frame {
        let total = self.timeline.total_duration();
        assert!(
            (0.0..total).contains(&t),
            "render time {} outside [0, {})",
            t,
            total
        );

        let mut frame = self.background.frame_at(t);
        let Some(mut overlay) = OverlayCanvas::new(self.canvas.width, self.canvas.height) else {
            return frame;
        };
        let ctx = FrameContext {
            t,
            timeline: &self.timeline,
            canvas: &self.canvas,
            overlay: &self.overlay,
            text: &self.text,
        };

        self.layers.draw_all(&mut overlay, &ctx);
        overlay.composite_onto(&mut frame);
        frame
    }

    pub fn render_frame(&self, index: usize) -> Frame {
        self.render(self.canvas.frame_time(index))
    }

    /// Render every frame in parallel chunks and hand them to `sink` in order
    pub fn render_sequence<S: FrameSink>(&self, sink: &mut S, config: &RenderConfig) -> Result<usize> {
        let total_frames = self.frame_count();
        let chunk = config.chunk_frames.max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| VideoError::FrameProcessingFailed {
                reason: format!("Failed to build render thread pool: {}", e),
            })?;

        info!(
            "Rendering {} frames ({}x{} @ {}fps) on {} threads",
            total_frames, self.canvas.width, self.canvas.height, self.canvas.fps, pool.current_num_threads()
        );

        let mut written = 0;
        for start in (0..total_frames).step_by(chunk) {
            let end = (start + chunk).min(total_frames);
            let frames: Vec<Frame> = pool.install(|| {
                (start..end)
                    .into_par_iter()
                    .map(|index| self.render_frame(index))
                    .collect()
            });

            for frame in &frames {
                sink.write_frame(frame)?;
            }
            written += frames.len();

            debug!("Rendered frames {}..{} of {}", start, end, total_frames);
        }

        info!("   ✅ Rendered {} frames", written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackgroundConfig;
    use crate::timing::WordTimingEstimator;

    fn small_canvas() -> CanvasConfig {
        CanvasConfig { width: 54, height: 96, fps: 10 }
    }

    fn compositor(durations: &[(&str, f64)]) -> FrameCompositor {
        let canvas = small_canvas();
        let timeline = Timeline::build(durations, &WordTimingEstimator::default(), 0.0);
        let background = BackgroundAnimator::new(
            Vec::new(),
            timeline.total_duration(),
            canvas,
            &BackgroundConfig::default(),
        );
        FrameCompositor::new(canvas, OverlayConfig::default(), timeline, background, TextRenderer::without_font())
    }

    #[test]
    fn test_render_is_deterministic() {
        let c = compositor(&[("Honey never spoils", 2.0), ("Bananas are berries", 1.5)]);

        let later = c.render(2.7);
        let first = c.render(0.4);
        assert_eq!(c.render(0.4), first);
        assert_eq!(c.render(2.7), later);
        assert_ne!(first, later);
    }

    #[test]
    fn test_parallel_sequence_matches_sequential_renders() {
        let c = compositor(&[("One fact here", 1.0), ("Another fact", 1.2)]);
        assert_eq!(c.frame_count(), 22);

        let mut sink: Vec<Frame> = Vec::new();
        let config = RenderConfig { threads: 3, chunk_frames: 4 };
        let written = c.render_sequence(&mut sink, &config).unwrap();

        assert_eq!(written, 22);
        for (index, frame) in sink.iter().enumerate().rev() {
            assert_eq!(frame, &c.render_frame(index), "frame {} differs", index);
        }
    }

    #[test]
    fn test_frame_dimensions() {
        let c = compositor(&[("Short", 1.0)]);
        let frame = c.render(0.0);
        assert_eq!((frame.width(), frame.height()), (54, 96));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_render_rejects_time_past_end() {
        let c = compositor(&[("Short", 1.0)]);
        c.render(1.0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_render_rejects_negative_time() {
        let c = compositor(&[("Short", 1.0)]);
        c.render(-0.1);
    }
}
