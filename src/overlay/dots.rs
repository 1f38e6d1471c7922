use crate::overlay::canvas::OverlayCanvas;
use crate::overlay::traits::{FrameContext, Layer};

const MAX_SPACING: u32 = 32;
const SIDE_MARGIN: u32 = 120;
const BOTTOM_OFFSET: f32 = 85.0;
const ACTIVE: (f32, [u8; 4]) = (9.0, [255, 220, 0, 230]);
const INACTIVE: (f32, [u8; 4]) = (4.0, [255, 255, 255, 90]);

/// One indicator per segment; the active segment's dot is larger and yellow
pub struct SegmentDotsLayer;

impl SegmentDotsLayer {
    /// Centre x of each of `count` dots on a canvas `width` pixels wide
    pub fn positions(count: usize, width: u32) -> Vec<u32> {
        let n = count as u32;
        let spacing = MAX_SPACING.min(width.saturating_sub(SIDE_MARGIN) / n.max(1));
        let start = (width / 2).saturating_sub(n * spacing / 2);
        (0..n).map(|i| start + i * spacing + spacing / 2).collect()
    }
}

impl Layer for SegmentDotsLayer {
    fn name(&self) -> &str {
        "dots"
    }

    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        let active = ctx.timeline.active_index(ctx.t);
        let y = ctx.height() - BOTTOM_OFFSET;

        for (i, x) in Self::positions(ctx.timeline.len(), ctx.canvas.width).into_iter().enumerate() {
            let (radius, color) = if Some(i) == active { ACTIVE } else { INACTIVE };
            canvas.fill_circle(x as f32, y, radius, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanvasConfig, OverlayConfig};
    use crate::overlay::text::TextRenderer;
    use crate::timing::Timeline;

    #[test]
    fn test_positions_centered() {
        assert_eq!(SegmentDotsLayer::positions(3, 1080), vec![508, 540, 572]);
        assert!(SegmentDotsLayer::positions(0, 1080).is_empty());
    }

    #[test]
    fn test_spacing_capped_for_many_segments() {
        let xs = SegmentDotsLayer::positions(100, 1080);
        assert_eq!(xs[1] - xs[0], 9);
    }

    #[test]
    fn test_active_dot_highlighted() {
        let timeline = Timeline::from_durations(&[5.0, 7.0, 4.0], 0.0);
        let canvas_config = CanvasConfig::default();
        let overlay = OverlayConfig::default();
        let text = TextRenderer::without_font();
        let ctx = FrameContext { t: 6.0, timeline: &timeline, canvas: &canvas_config, overlay: &overlay, text: &text };

        let mut canvas = OverlayCanvas::new(1080, 1920).unwrap();
        SegmentDotsLayer.draw(&mut canvas, &ctx);

        let y = 1920 - 85;
        assert_eq!(canvas.pixel(540, y), [255, 220, 0, 230]);
        assert_eq!(canvas.pixel(508, y), [255, 255, 255, 90]);
        // Radius 7 away from an inactive dot's centre is empty, not from the active one
        assert_eq!(canvas.pixel(508, y - 7)[3], 0);
        assert!(canvas.pixel(540, y - 7)[3] > 0);
    }
}
