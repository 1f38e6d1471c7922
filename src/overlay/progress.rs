use crate::overlay::canvas::{OverlayCanvas, Rect};
use crate::overlay::traits::{FrameContext, Layer};

const MARGIN: f32 = 50.0;
const TRACK_HEIGHT: f32 = 10.0;
const TRACK_COLOR: [u8; 4] = [255, 255, 255, 50];
const FILL_COLOR: [u8; 4] = [255, 220, 0, 200];
const THUMB_COLOR: [u8; 4] = [255, 255, 255, 200];

/// Bottom progress bar filled in proportion to `t / total_duration`
pub struct ProgressLayer;

impl ProgressLayer {
    /// x coordinate of the fill edge at time `t`
    pub fn fill_edge(t: f64, total: f64, width: f32) -> f32 {
        let progress = if total > 0.0 { (t / total).min(1.0) } else { 1.0 };
        let (x1, x2) = (MARGIN, width - MARGIN);
        x1 + ((x2 - x1) as f64 * progress).floor() as f32
    }
}

impl Layer for ProgressLayer {
    fn name(&self) -> &str {
        "progress"
    }

    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        let (x1, x2) = (MARGIN, ctx.width() - MARGIN);
        let y = ctx.height() - MARGIN;
        let radius = TRACK_HEIGHT / 2.0;

        canvas.fill_rounded_rect(Rect::new(x1, y, x2, y + TRACK_HEIGHT), radius, TRACK_COLOR);

        let fx = Self::fill_edge(ctx.t, ctx.timeline.total_duration(), ctx.width());
        if fx > x1 + 5.0 {
            canvas.fill_rounded_rect(Rect::new(x1, y, fx, y + TRACK_HEIGHT), radius, FILL_COLOR);
        }
        canvas.fill_ellipse(Rect::new(fx - 7.0, y - 3.0, fx + 7.0, y + 13.0), THUMB_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_edge() {
        assert_eq!(ProgressLayer::fill_edge(0.0, 16.0, 1080.0), 50.0);
        assert_eq!(ProgressLayer::fill_edge(8.0, 16.0, 1080.0), 540.0);
        assert_eq!(ProgressLayer::fill_edge(20.0, 16.0, 1080.0), 1030.0);
    }
}
