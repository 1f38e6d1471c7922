use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tracing::{debug, info, warn};

use crate::error::{Result, VideoError};
use crate::overlay::canvas::OverlayCanvas;

/// Advance per character, as a fraction of the font size, used when no font is loaded
const FALLBACK_ADVANCE: f32 = 0.55;

/// Which point of the text box `(x, y)` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Horizontal and vertical centre
    Middle,
    /// Left edge, vertical centre
    LeftMiddle,
}

/// Outline drawn beneath the glyphs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: u32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: [u8; 4],
    pub anchor: Anchor,
    pub stroke: Option<Stroke>,
}

impl TextStyle {
    pub fn new(size: f32, color: [u8; 4]) -> Self {
        Self {
            size,
            color,
            anchor: Anchor::Middle,
            stroke: None,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn stroke(mut self, width: u32, color: [u8; 4]) -> Self {
        self.stroke = (width > 0).then_some(Stroke { width, color });
        self
    }
}

/// Coverage mask for one rendered string
struct TextMask {
    left: i32,
    top: i32,
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl TextMask {
    /// Grow the mask by a disc of radius `radius`
    fn dilate(&self, radius: u32) -> TextMask {
        let r = radius as i32;
        let width = self.width + 2 * radius as usize;
        let height = self.height + 2 * radius as usize;
        let mut data = vec![0u8; width * height];

        let offsets: Vec<(i32, i32)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        for sy in 0..self.height {
            for sx in 0..self.width {
                let m = self.data[sy * self.width + sx];
                if m == 0 {
                    continue;
                }
                for &(dx, dy) in &offsets {
                    let tx = (sx as i32 + r + dx) as usize;
                    let ty = (sy as i32 + r + dy) as usize;
                    let cell = &mut data[ty * width + tx];
                    *cell = (*cell).max(m);
                }
            }
        }

        TextMask {
            left: self.left - r,
            top: self.top - r,
            width,
            height,
            data,
        }
    }
}

/// Measures and rasterises single-line text with `fontdue`
///
/// Glyphs are rasterised on every call; the renderer holds no caches so it can
/// be shared across render threads by reference.
pub struct TextRenderer {
    font: Option<Font>,
}

impl TextRenderer {
    /// Load the first usable font from `candidates`
    ///
    /// When none can be loaded the renderer still measures text (with an
    /// estimated advance) but draws nothing.
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            match Self::from_file(path) {
                Ok(renderer) => {
                    info!("Using font {:?}", path);
                    return renderer;
                }
                Err(e) => debug!("Font candidate {:?} unavailable: {}", path, e),
            }
        }

        warn!("No usable font found in {} candidates, captions will not be drawn", candidates.len());
        Self::without_font()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|_| VideoError::LoadFailed {
            path: path.display().to_string(),
        })?;
        Self::from_bytes(bytes).map_err(|e| {
            VideoError::LoadFailed {
                path: format!("{}: {}", path.display(), e),
            }
            .into()
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> std::result::Result<Self, String> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| e.to_string())?;
        Ok(Self { font: Some(font) })
    }

    pub fn without_font() -> Self {
        Self { font: None }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Advance width of `text` at `size` pixels
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match &self.font {
            Some(font) => {
                let mut width = 0.0;
                let mut previous: Option<char> = None;
                for c in text.chars() {
                    if let Some(p) = previous {
                        width += font.horizontal_kern(p, c, size).unwrap_or(0.0);
                    }
                    width += font.metrics(c, size).advance_width;
                    previous = Some(c);
                }
                width
            }
            None => text.chars().count() as f32 * size * FALLBACK_ADVANCE,
        }
    }

    /// Ascent and (negative) descent at `size`
    fn vertical_metrics(font: &Font, size: f32) -> (f32, f32) {
        font.horizontal_line_metrics(size)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((size * 0.8, -size * 0.2))
    }

    /// Rasterise `text` with its baseline origin at `(origin_x, baseline)`
    fn rasterize(font: &Font, text: &str, size: f32, origin_x: f32, baseline: f32) -> Option<TextMask> {
        let mut glyphs = Vec::new();
        let mut pen = origin_x;
        let mut previous: Option<char> = None;

        for c in text.chars() {
            if let Some(p) = previous {
                pen += font.horizontal_kern(p, c, size).unwrap_or(0.0);
            }
            let (metrics, bitmap) = font.rasterize(c, size);
            if metrics.width > 0 && metrics.height > 0 {
                let x = pen.round() as i32 + metrics.xmin;
                let y = baseline.round() as i32 - metrics.height as i32 - metrics.ymin;
                glyphs.push((x, y, metrics.width, metrics.height, bitmap));
            }
            pen += metrics.advance_width;
            previous = Some(c);
        }

        let left = glyphs.iter().map(|g| g.0).min()?;
        let top = glyphs.iter().map(|g| g.1).min()?;
        let right = glyphs.iter().map(|g| g.0 + g.2 as i32).max()?;
        let bottom = glyphs.iter().map(|g| g.1 + g.3 as i32).max()?;

        let width = (right - left) as usize;
        let height = (bottom - top) as usize;
        let mut data = vec![0u8; width * height];

        for (gx, gy, gw, gh, bitmap) in &glyphs {
            for row in 0..*gh {
                let ty = (gy - top) as usize + row;
                for col in 0..*gw {
                    let tx = (gx - left) as usize + col;
                    let cell = &mut data[ty * width + tx];
                    *cell = (*cell).max(bitmap[row * gw + col]);
                }
            }
        }

        Some(TextMask { left, top, width, height, data })
    }

    /// Draw `text` anchored at `(x, y)`; returns the advance width used for layout
    pub fn draw(&self, canvas: &mut OverlayCanvas, text: &str, x: f32, y: f32, style: &TextStyle) -> f32 {
        let advance = self.measure(text, style.size);
        let Some(font) = &self.font else {
            return advance;
        };

        let left = match style.anchor {
            Anchor::Middle => x - advance / 2.0,
            Anchor::LeftMiddle => x,
        };
        let (ascent, descent) = Self::vertical_metrics(font, style.size);
        let baseline = y + (ascent + descent) / 2.0;

        let Some(mask) = Self::rasterize(font, text, style.size, left, baseline) else {
            return advance;
        };

        if let Some(stroke) = style.stroke {
            let outline = mask.dilate(stroke.width);
            canvas.draw_mask(outline.left, outline.top, outline.width, &outline.data, stroke.color);
        }
        canvas.draw_mask(mask.left, mask.top, mask.width, &mask.data, style.color);

        advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_measure_scales_with_size_and_length() {
        let text = TextRenderer::without_font();
        assert!(!text.has_font());
        assert!((text.measure("abcd", 10.0) - 22.0).abs() < 1e-4);
        assert!((text.measure("abcd", 20.0) - 44.0).abs() < 1e-4);
        assert_eq!(text.measure("", 58.0), 0.0);
    }

    #[test]
    fn test_draw_without_font_is_noop() {
        let text = TextRenderer::without_font();
        let mut canvas = OverlayCanvas::new(50, 20).unwrap();
        let advance = text.draw(&mut canvas, "hello", 25.0, 10.0, &TextStyle::new(12.0, [255, 255, 255, 255]));

        assert!(advance > 0.0);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_load_with_no_candidates_warns_and_falls_back() {
        let text = TextRenderer::load(&[PathBuf::from("/nonexistent/font.ttf")]);
        assert!(!text.has_font());
    }

    #[test]
    fn test_invalid_font_bytes_rejected() {
        assert!(TextRenderer::from_bytes(vec![0, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_dilate_grows_mask() {
        let mask = TextMask { left: 5, top: 5, width: 1, height: 1, data: vec![255] };
        let grown = mask.dilate(1);

        assert_eq!((grown.left, grown.top, grown.width, grown.height), (4, 4, 3, 3));
        assert_eq!(grown.data, vec![0, 255, 0, 255, 255, 255, 0, 255, 0]);
    }

    #[test]
    fn test_system_font_draws_when_available() {
        let candidates = crate::config::OverlayConfig::default().font_paths;
        let text = TextRenderer::load(&candidates);
        if !text.has_font() {
            return;
        }

        let mut canvas = OverlayCanvas::new(200, 60).unwrap();
        let style = TextStyle::new(32.0, [255, 255, 255, 255]).stroke(2, [0, 0, 0, 255]);
        text.draw(&mut canvas, "FACT", 100.0, 30.0, &style);

        assert!(!canvas.is_blank());
        assert!(text.measure("FACT FACT", 32.0) > text.measure("FACT", 32.0));
    }
}
