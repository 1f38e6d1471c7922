use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::{CanvasConfig, OverlayConfig};
use crate::error::{Result, VideoError};
use crate::overlay::canvas::{OverlayCanvas, Rect};
use crate::overlay::karaoke::wrap_words;
use crate::overlay::text::{TextRenderer, TextStyle};
use crate::video::types::{BackgroundImage, Frame};

const CANDIDATES: usize = 6;
const STAR_COUNT: usize = 38;
const STAR_SEED: u64 = 7;
const YELLOW: [u8; 3] = [255, 220, 0];
const PREVIEW_CHARS: usize = 60;
const PREVIEW_WRAP: usize = 32;

/// Still preview image built from the busiest background and the fact list
pub struct ThumbnailGenerator {
    canvas: CanvasConfig,
    overlay: OverlayConfig,
}

impl ThumbnailGenerator {
    pub fn new(canvas: CanvasConfig, overlay: OverlayConfig) -> Self {
        Self { canvas, overlay }
    }

    /// Index of the most visually busy image among the first few candidates
    pub fn select_background(candidates: &[BackgroundImage]) -> Option<usize> {
        candidates
            .iter()
            .take(CANDIDATES)
            .enumerate()
            .map(|(i, image)| (i, image.visual_variance()))
            .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    /// Compose the thumbnail
    pub fn render(&self, backgrounds: &[BackgroundImage], facts: &[String], text: &TextRenderer) -> Frame {
        let (w, h) = (self.canvas.width, self.canvas.height);

        let base = match Self::select_background(backgrounds) {
            Some(index) => {
                debug!("Thumbnail background: candidate {}", index);
                let pixels = backgrounds[index].pixels();
                if pixels.dimensions() == (w, h) {
                    pixels.clone()
                } else {
                    imageops::resize(pixels, w, h, FilterType::Lanczos3)
                }
            }
            None => Frame::vertical_gradient(w, h, [10, 0, 80], [70, 0, 200]).into_image(),
        };

        let mut base = enhance(&base, 1.6, 1.2, 0.55);
        base = imageops::blur(&base, 2.0);

        let mut frame = Frame::new(base);
        if let Some(mut canvas) = OverlayCanvas::new(w, h) {
            self.draw_shading(&mut canvas);
            self.draw_decorations(&mut canvas);
            self.draw_text(&mut canvas, facts, text);
            canvas.composite_onto(&mut frame);
        }
        Frame::new(imageops::unsharpen(frame.as_image(), 1.2, 2))
    }

    /// Render and write as JPEG (quality 97) or, for a `.png` path, PNG
    pub fn generate<P: AsRef<Path>>(
        &self,
        backgrounds: &[BackgroundImage],
        facts: &[String],
        text: &TextRenderer,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        let frame = self.render(backgrounds, facts, text);
        let failed = |reason: String| VideoError::FrameProcessingFailed {
            reason: format!("could not write thumbnail {}: {}", path.display(), reason),
        };

        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        if is_png {
            frame.save_png(path).map_err(|e| failed(e.to_string()))?;
        } else {
            let mut writer = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(&mut writer, 97)
                .encode_image(frame.as_image())
                .map_err(|e| failed(e.to_string()))?;
        }

        info!("Thumbnail written to {:?}", path);
        Ok(())
    }

    /// Inset darkening toward the centre plus dark top and bottom bands
    fn draw_shading(&self, canvas: &mut OverlayCanvas) {
        let (w, h) = (self.canvas.width as i32, self.canvas.height as i32);

        let mut inset_mask = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                let inset = x.min(y).min(w - 1 - x).min(h - 1 - y).min(279) as f64;
                inset_mask.push((200.0 * (inset / 280.0).powf(1.8)) as u8);
            }
        }
        canvas.draw_mask(0, 0, w as usize, &inset_mask, [0, 0, 0, 255]);

        let band = 520.min(h);
        for y in 0..band {
            let a = (230.0 * (1.0 - y as f64 / 520.0).powf(1.3)) as u8;
            canvas.fill_rect(Rect::new(0.0, y as f32, w as f32, y as f32 + 1.0), [5, 0, 25, a]);
        }
        for y in (h - band)..h {
            let a = (240.0 * ((y - (h - 520)) as f64 / 520.0).max(0.0).powf(1.2)) as u8;
            canvas.fill_rect(Rect::new(0.0, y as f32, w as f32, y as f32 + 1.0), [5, 0, 20, a]);
        }
    }

    /// Corner brackets and seeded star dots
    fn draw_decorations(&self, canvas: &mut OverlayCanvas) {
        let (w, h) = (self.canvas.width as f32, self.canvas.height as f32);
        let color = [YELLOW[0], YELLOW[1], YELLOW[2], 180];
        let size = 90.0;

        for (x, y, sx, sy) in [
            (55.0, 55.0, 1.0, 1.0),
            (w - 55.0, 55.0, -1.0, 1.0),
            (55.0, h - 55.0, 1.0, -1.0),
            (w - 55.0, h - 55.0, -1.0, -1.0),
        ] {
            canvas.draw_line((x, y), (x + sx * size, y), 5.0, color);
            canvas.draw_line((x, y), (x, y + sy * size), 5.0, color);
            canvas.fill_circle(x, y, 6.0, color);
        }

        let mut rng = SmallRng::seed_from_u64(STAR_SEED);
        let (wi, hi) = (self.canvas.width as i32, self.canvas.height as i32);
        for _ in 0..STAR_COUNT {
            let x = rng.gen_range(30..=(wi - 30).max(30));
            let y = rng.gen_range(30..=(hi - 30).max(30));
            let radius = rng.gen_range(2..=6);
            let alpha = rng.gen_range(40..=160);
            canvas.fill_circle(x as f32, y as f32, radius as f32, [255, 255, 220, alpha]);
        }
    }

    fn draw_text(&self, canvas: &mut OverlayCanvas, facts: &[String], text: &TextRenderer) {
        let (w, h) = (self.canvas.width as f32, self.canvas.height as f32);
        let cx = w / 2.0;

        // Badge
        let badge = "RANDOM FACTS";
        let bw = text.measure(badge, 52.0) + 60.0;
        let badge_rect = Rect::new((cx - bw / 2.0).floor(), 115.0, (cx - bw / 2.0).floor() + bw, 195.0);
        canvas.fill_rounded_rect(badge_rect, 40.0, [255, 220, 0, 235]);
        canvas.stroke_rounded_rect(badge_rect, 40.0, 2.0, [255, 255, 255, 120]);
        text.draw(canvas, badge, cx, 155.0, &TextStyle::new(52.0, [10, 10, 30, 255]));

        // Title panel
        let cy = (h / 2.0 - 80.0).floor();
        let panel = Rect::new(60.0, cy - 230.0, w - 60.0, cy + 230.0);
        canvas.fill_rounded_rect(panel, 36.0, [0, 0, 0, 160]);
        canvas.stroke_rounded_rect(panel, 36.0, 3.0, [255, 220, 0, 100]);

        glow_text(canvas, text, "DID  YOU", (cx, cy - 110.0), 128.0, [255, 255, 255, 255], [120, 180, 255], 20);
        glow_text(canvas, text, "KNOW?", (cx, cy + 80.0), 172.0, [255, 225, 0, 255], [255, 190, 0], 35);
        for (width, alpha) in [(8.0, 200), (4.0, 110), (2.0, 55)] {
            canvas.draw_line((cx - 340.0, cy + 195.0), (cx + 340.0, cy + 195.0), width, [255, 220, 0, alpha]);
        }
        let subtitle = format!("{} Mind-Blowing Facts", facts.len());
        glow_text(canvas, text, &subtitle, (cx, cy + 290.0), 62.0, [255, 255, 255, 245], [180, 220, 255], 14);

        // Preview of the first fact
        if let Some(first) = facts.first() {
            let lines = preview_lines(first);
            let ph = lines.len() as f32 * 64.0 + 38.0;
            let py = h - 380.0 - ph;
            let preview = Rect::new(60.0, py, w - 60.0, py + ph);
            canvas.fill_rounded_rect(preview, 22.0, [10, 10, 40, 190]);
            canvas.stroke_rounded_rect(preview, 22.0, 2.0, [255, 220, 0, 90]);

            let label = self.overlay.fact_label.replace("{n}", "1");
            let label_style = TextStyle::new(44.0, [255, 220, 0, 200]).stroke(1, [0, 0, 0, 180]);
            text.draw(canvas, &label, cx, py - 36.0, &label_style);

            let line_style = TextStyle::new(42.0, [255, 255, 255, 230]).stroke(1, [0, 0, 0, 160]);
            for (i, line) in lines.iter().enumerate() {
                text.draw(canvas, line, cx, py + 28.0 + i as f32 * 64.0, &line_style);
            }
        }

        // Call to action
        let cta_y = h - 175.0;
        let cta = TextStyle::new(62.0, [255, 220, 0, 235]).stroke(3, [0, 0, 0, 210]);
        text.draw(canvas, "▶  WATCH NOW", cx, cta_y - 28.0, &cta);
        let swipe = TextStyle::new(44.0, [255, 255, 255, 180]).stroke(1, [0, 0, 0, 160]);
        text.draw(canvas, "Swipe Up", cx, cta_y + 52.0, &swipe);
    }
}

/// Shadowed, haloed headline text
#[allow(clippy::too_many_arguments)]
fn glow_text(
    canvas: &mut OverlayCanvas,
    text: &TextRenderer,
    content: &str,
    (x, y): (f32, f32),
    size: f32,
    fill: [u8; 4],
    glow: [u8; 3],
    radius: i32,
) {
    for (ox, oy, a) in [(5.0, 8.0, 140), (3.0, 5.0, 100), (1.0, 3.0, 60)] {
        let shadow = TextStyle::new(size, [0, 0, 0, a]).stroke(5, [0, 0, 0, a]);
        text.draw(canvas, content, x + ox, y + oy, &shadow);
    }

    let halo = TextStyle::new(size, [glow[0], glow[1], glow[2], 22]);
    for r in [radius, radius * 2 / 3, radius / 3] {
        let step = (r / 3).max(1) as usize;
        for dx in (-r..=r).step_by(step) {
            for dy in (-r..=r).step_by(step) {
                if (dx.abs() + dy.abs()) as f32 > r as f32 * 1.4 {
                    continue;
                }
                text.draw(canvas, content, x + dx as f32, y + dy as f32, &halo);
            }
        }
    }

    let main = TextStyle::new(size, fill).stroke(6, [0, 0, 0, 230]);
    text.draw(canvas, content, x, y, &main);
}

/// First fact truncated and wrapped to at most two lines
pub fn preview_lines(fact: &str) -> Vec<String> {
    let mut preview: String = fact.chars().take(PREVIEW_CHARS).collect();
    if fact.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }

    let words: Vec<&str> = preview.split_whitespace().collect();
    wrap_words(&words, PREVIEW_WRAP)
        .into_iter()
        .take(2)
        .map(|line| line.iter().map(|&i| words[i]).collect::<Vec<_>>().join(" "))
        .collect()
}

/// Saturation, contrast and brightness adjustments in that order
pub fn enhance(image: &RgbImage, saturation: f32, contrast: f32, brightness: f32) -> RgbImage {
    let luma = |p: &[u8]| (p[0] as f32 * 299.0 + p[1] as f32 * 587.0 + p[2] as f32 * 114.0) / 1000.0;
    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;

    let mut out = image.clone();
    for p in out.pixels_mut() {
        let l = luma(&p.0);
        for c in 0..3 {
            p[c] = to_u8(l + (p[c] as f32 - l) * saturation);
        }
    }

    let n = (out.width() * out.height()).max(1) as f32;
    let mean = (out.pixels().map(|p| luma(&p.0)).sum::<f32>() / n).round();
    for p in out.pixels_mut() {
        for c in 0..3 {
            p[c] = to_u8((mean + (p[c] as f32 - mean) * contrast) * brightness);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    #[test]
    fn test_select_busiest_background() {
        let flat = BackgroundImage::new(RgbImage::from_pixel(40, 40, Rgb([100, 100, 100])));
        let busy = BackgroundImage::new(RgbImage::from_fn(40, 40, |x, _| {
            if x % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        }));

        assert_eq!(ThumbnailGenerator::select_background(&[]), None);
        assert_eq!(ThumbnailGenerator::select_background(&[flat.clone(), busy.clone(), flat.clone()]), Some(1));

        // Only the first six are considered
        let mut many = vec![flat.clone(); 6];
        many.push(busy);
        assert_eq!(ThumbnailGenerator::select_background(&many), Some(0));
    }

    #[test]
    fn test_preview_lines_truncate_and_wrap() {
        let fact = "Octopuses have three hearts and blue blood which helps them survive in cold deep water";
        let lines = preview_lines(fact);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 32));
        assert_eq!(preview_lines("Short fact"), vec!["Short fact".to_string()]);
    }

    #[test]
    fn test_enhance_darkens() {
        let image = RgbImage::from_pixel(4, 4, Rgb([200, 100, 50]));
        let out = enhance(&image, 1.0, 1.0, 0.5);
        assert_eq!(out.get_pixel(0, 0).0, [100, 50, 25]);
    }

    #[test]
    fn test_generate_without_backgrounds_or_font() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("thumbnail.jpg");
        let canvas = CanvasConfig { width: 108, height: 192, fps: 30 };
        let generator = ThumbnailGenerator::new(canvas, OverlayConfig::default());

        generator
            .generate(&[], &["A fact".to_string()], &TextRenderer::without_font(), &path)
            .unwrap();

        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (108, 192));
    }
}
