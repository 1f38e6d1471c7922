use crate::config::{CanvasConfig, OverlayConfig};
use crate::overlay::canvas::OverlayCanvas;
use crate::overlay::text::TextRenderer;
use crate::timing::Timeline;

/// Everything a layer may read while drawing one frame
///
/// All fields are shared, read-only snapshots; a layer's output depends only
/// on these and `t`.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Absolute time in seconds
    pub t: f64,
    pub timeline: &'a Timeline,
    pub canvas: &'a CanvasConfig,
    pub overlay: &'a OverlayConfig,
    pub text: &'a TextRenderer,
}

impl<'a> FrameContext<'a> {
    pub fn width(&self) -> f32 {
        self.canvas.width as f32
    }

    pub fn height(&self) -> f32 {
        self.canvas.height as f32
    }
}

/// Core trait that all overlay layers implement
pub trait Layer: Send + Sync {
    /// Returns the unique name of this layer
    fn name(&self) -> &str;

    /// Draw this layer's contribution for the frame described by `ctx`
    ///
    /// Implementations must not keep state between calls.
    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>);
}

/// Opacity of a time-windowed banner
///
/// Ramps linearly from 0 to `peak` over `ramp_in`, holds, then ramps back to
/// 0 over the last `ramp_out` seconds of `window`. Zero outside the window.
pub fn window_alpha(elapsed: f64, window: f64, ramp_in: f64, ramp_out: f64, peak: u8) -> u8 {
    if elapsed < 0.0 || elapsed >= window {
        return 0;
    }
    let factor = if elapsed < window - ramp_out {
        if ramp_in > 0.0 { (elapsed / ramp_in).min(1.0) } else { 1.0 }
    } else if ramp_out > 0.0 {
        (window - elapsed) / ramp_out
    } else {
        1.0
    };
    (peak as f64 * factor).clamp(0.0, peak as f64) as u8
}

/// Scale an alpha value by `factor`, truncating
pub fn scale_alpha(alpha: u8, factor: f64) -> u8 {
    (alpha as f64 * factor).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_alpha_ramps() {
        assert_eq!(window_alpha(0.0, 2.0, 0.35, 0.5, 255), 0);
        assert_eq!(window_alpha(0.175, 2.0, 0.35, 0.5, 255), 127);
        assert_eq!(window_alpha(1.0, 2.0, 0.35, 0.5, 255), 255);
        assert_eq!(window_alpha(1.75, 2.0, 0.35, 0.5, 255), 127);
        assert_eq!(window_alpha(2.0, 2.0, 0.35, 0.5, 255), 0);
        assert_eq!(window_alpha(-0.1, 2.0, 0.35, 0.5, 255), 0);
    }

    #[test]
    fn test_window_alpha_respects_peak() {
        assert_eq!(window_alpha(2.0, 4.5, 0.35, 0.5, 220), 220);
        assert_eq!(window_alpha(4.25, 4.5, 0.35, 0.5, 220), 110);
    }

    #[test]
    fn test_scale_alpha() {
        assert_eq!(scale_alpha(200, 0.85), 170);
        assert_eq!(scale_alpha(0, 0.9), 0);
    }
}
