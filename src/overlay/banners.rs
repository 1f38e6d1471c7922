use crate::overlay::canvas::{OverlayCanvas, Rect};
use crate::overlay::text::TextStyle;
use crate::overlay::traits::{scale_alpha, window_alpha, FrameContext, Layer};

const YELLOW: [u8; 3] = [255, 220, 0];
const WHITE: [u8; 3] = [255, 255, 255];

const INTRO_HEIGHT: f32 = 230.0;
const INTRO_TITLE_Y: f32 = 78.0;
const INTRO_SUBTITLE_Y: f32 = 172.0;

const FOLLOW_PEAK: u8 = 220;
const FOLLOW_SIZE: (f32, f32) = (740.0, 100.0);
const FOLLOW_TOP: f32 = 65.0;
const FOLLOW_RADIUS: f32 = 20.0;

const WATERMARK_Y: f32 = 52.0;
const WATERMARK_COLOR: [u8; 4] = [255, 255, 255, 140];

const OUTRO_HEIGHT: f32 = 290.0;
const OUTRO_TITLE_OFFSET: f32 = 210.0;
const OUTRO_SUBTITLE_OFFSET: f32 = 110.0;

fn rgba(rgb: [u8; 3], a: u8) -> [u8; 4] {
    [rgb[0], rgb[1], rgb[2], a]
}

/// Which top-of-frame element is visible at a given time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderPhase {
    /// Intro banner, with seconds since the start
    Intro(f64),
    /// Follow prompt, with seconds since the timeline midpoint
    Follow(f64),
    Watermark,
}

impl HeaderPhase {
    pub fn at(t: f64, total: f64, intro: f64, follow: f64) -> Self {
        let midpoint = total / 2.0;
        if t < intro {
            HeaderPhase::Intro(t)
        } else if midpoint <= t && t < midpoint + follow {
            HeaderPhase::Follow(t - midpoint)
        } else {
            HeaderPhase::Watermark
        }
    }
}

/// Intro banner, mid-video follow prompt, or persistent watermark
pub struct HeaderLayer;

impl Layer for HeaderLayer {
    fn name(&self) -> &str {
        "header"
    }

    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        let cfg = ctx.overlay;
        let sizes = &cfg.font_sizes;
        let w = ctx.width();
        let phase = HeaderPhase::at(ctx.t, ctx.timeline.total_duration(), cfg.intro_duration, cfg.follow_duration);

        match phase {
            HeaderPhase::Intro(elapsed) => {
                let a = window_alpha(elapsed, cfg.intro_duration, cfg.ramp_in, cfg.ramp_out, 255);
                canvas.fill_rect(Rect::new(0.0, 0.0, w, INTRO_HEIGHT), [0, 0, 0, scale_alpha(a, 0.85)]);

                let title = TextStyle::new(sizes.banner_title, rgba(YELLOW, a)).stroke(2, [0, 0, 0, a]);
                ctx.text.draw(canvas, &cfg.intro_title, w / 2.0, INTRO_TITLE_Y, &title);
                let subtitle = TextStyle::new(sizes.banner_subtitle, rgba(WHITE, a));
                ctx.text.draw(canvas, &cfg.intro_subtitle, w / 2.0, INTRO_SUBTITLE_Y, &subtitle);
            }
            HeaderPhase::Follow(elapsed) => {
                let a = window_alpha(elapsed, cfg.follow_duration, cfg.ramp_in, cfg.ramp_out, FOLLOW_PEAK);
                let (bw, bh) = FOLLOW_SIZE;
                let x0 = (w / 2.0 - bw / 2.0).floor();
                let panel = Rect::new(x0, FOLLOW_TOP, x0 + bw, FOLLOW_TOP + bh);

                canvas.fill_rounded_rect(panel, FOLLOW_RADIUS, [200, 0, 0, scale_alpha(a, 0.9)]);
                canvas.stroke_rounded_rect(panel, FOLLOW_RADIUS, 2.0, [255, 255, 255, 80]);

                let style = TextStyle::new(sizes.banner_subtitle, rgba(WHITE, a)).stroke(1, [0, 0, 0, 150]);
                ctx.text.draw(canvas, &cfg.follow_prompt, w / 2.0, FOLLOW_TOP + bh / 2.0, &style);
            }
            HeaderPhase::Watermark => {
                let style = TextStyle::new(sizes.watermark, WATERMARK_COLOR).stroke(1, [0, 0, 0, 140]);
                ctx.text.draw(canvas, &cfg.watermark, w / 2.0, WATERMARK_Y, &style);
            }
        }
    }
}

/// Closing banner over the final seconds
pub struct OutroLayer;

impl Layer for OutroLayer {
    fn name(&self) -> &str {
        "outro"
    }

    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        let cfg = ctx.overlay;
        let start = ctx.timeline.total_duration() - cfg.outro_duration;
        if ctx.t <= start {
            return;
        }

        let a = window_alpha(ctx.t - start, cfg.outro_duration, cfg.ramp_in, cfg.ramp_out, 255);
        let (w, h) = (ctx.width(), ctx.height());

        canvas.fill_rect(Rect::new(0.0, h - OUTRO_HEIGHT, w, h), [0, 0, 0, scale_alpha(a, 0.88)]);

        let title = TextStyle::new(cfg.font_sizes.banner_title, rgba(YELLOW, a)).stroke(2, [0, 0, 0, a]);
        ctx.text.draw(canvas, &cfg.outro_title, w / 2.0, h - OUTRO_TITLE_OFFSET, &title);
        let subtitle = TextStyle::new(cfg.font_sizes.banner_subtitle, rgba(WHITE, a));
        ctx.text.draw(canvas, &cfg.outro_subtitle, w / 2.0, h - OUTRO_SUBTITLE_OFFSET, &subtitle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanvasConfig, OverlayConfig};
    use crate::overlay::text::TextRenderer;
    use crate::timing::Timeline;

    #[test]
    fn test_header_phases() {
        assert_eq!(HeaderPhase::at(0.5, 40.0, 2.0, 4.5), HeaderPhase::Intro(0.5));
        assert_eq!(HeaderPhase::at(21.0, 40.0, 2.0, 4.5), HeaderPhase::Follow(1.0));
        assert_eq!(HeaderPhase::at(24.5, 40.0, 2.0, 4.5), HeaderPhase::Watermark);
        assert_eq!(HeaderPhase::at(10.0, 40.0, 2.0, 4.5), HeaderPhase::Watermark);
    }

    fn draw(layer: &dyn Layer, t: f64) -> OverlayCanvas {
        let timeline = Timeline::from_durations(&[10.0, 10.0], 0.0);
        let canvas_config = CanvasConfig { width: 108, height: 400, fps: 30 };
        let overlay = OverlayConfig::default();
        let text = TextRenderer::without_font();
        let ctx = FrameContext { t, timeline: &timeline, canvas: &canvas_config, overlay: &overlay, text: &text };

        let mut canvas = OverlayCanvas::new(108, 400).unwrap();
        layer.draw(&mut canvas, &ctx);
        canvas
    }

    #[test]
    fn test_intro_band_fades() {
        assert_eq!(draw(&HeaderLayer, 1.0).pixel(10, 100), [0, 0, 0, 216]);
        assert_eq!(draw(&HeaderLayer, 1.75).pixel(10, 100)[3], scale_alpha(127, 0.85));
        assert_eq!(draw(&HeaderLayer, 5.0).pixel(10, 100)[3], 0);
    }

    #[test]
    fn test_outro_only_in_final_window() {
        assert_eq!(draw(&OutroLayer, 17.0).pixel(10, 390)[3], 0);
        assert_eq!(draw(&OutroLayer, 18.5).pixel(10, 390), [0, 0, 0, 224]);
        assert_eq!(draw(&OutroLayer, 18.5).pixel(10, 50)[3], 0);
    }
}
