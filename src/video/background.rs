use image::imageops::{self, FilterType};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{BackgroundConfig, CanvasConfig};
use crate::video::types::{BackgroundImage, Frame};

/// Time-varying effect applied to one still, evaluated by [`ClipEffect::render`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipEffect {
    /// Centered zoom-in plus an oscillating tint toward the dominant color
    ZoomTint {
        zoom_end: f64,
        tint_base: f32,
        tint_amplitude: f32,
        tint_rate: f64,
    },
}

impl ClipEffect {
    fn from_config(config: &BackgroundConfig) -> Self {
        ClipEffect::ZoomTint {
            zoom_end: config.zoom_end,
            tint_base: config.tint_base,
            tint_amplitude: config.tint_amplitude,
            tint_rate: config.tint_rate,
        }
    }

    /// Render `image` at clip-local time `local` of a clip lasting `duration`
    pub fn render(&self, image: &BackgroundImage, local: f64, duration: f64, canvas: &CanvasConfig) -> Frame {
        match *self {
            ClipEffect::ZoomTint { zoom_end, tint_base, tint_amplitude, tint_rate } => {
                let progress = (local / duration).clamp(0.0, 1.0);
                let scale = 1.0 + (zoom_end - 1.0) * progress;
                let mut frame = zoomed(image, scale, canvas);

                let strength = tint_base + tint_amplitude * (local * tint_rate).sin() as f32;
                tint(&mut frame, image.dominant_color(), strength);
                frame
            }
        }
    }
}

/// Crop a centered window shrunk by `scale` and upscale it back to the canvas
fn zoomed(image: &BackgroundImage, scale: f64, canvas: &CanvasConfig) -> Frame {
    let pixels = image.pixels();
    let (w, h) = (pixels.width(), pixels.height());
    let sw = ((w as f64 / scale) as u32).clamp(1, w);
    let sh = ((h as f64 / scale) as u32).clamp(1, h);
    let x0 = (w - sw) / 2;
    let y0 = (h - sh) / 2;

    if sw == canvas.width && sh == canvas.height {
        return Frame::new(imageops::crop_imm(pixels, x0, y0, sw, sh).to_image());
    }

    let window = imageops::crop_imm(pixels, x0, y0, sw, sh).to_image();
    Frame::new(imageops::resize(&window, canvas.width, canvas.height, FilterType::Triangle))
}

fn tint(frame: &mut Frame, color: [u8; 3], strength: f32) {
    let strength = strength.clamp(0.0, 1.0);
    for px in frame.as_raw_mut().chunks_exact_mut(3) {
        for c in 0..3 {
            let v = px[c] as f32 * (1.0 - strength) + color[c] as f32 * strength;
            px[c] = v.clamp(0.0, 255.0) as u8;
        }
    }
}

/// One still placed on the concatenated (pre-loop) background sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSpec {
    pub image: usize,
    pub start: f64,
    pub duration: f64,
    pub effect: ClipEffect,
}

impl ClipSpec {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// What the background shows at a given instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundSample {
    Clip { clip: usize, local: f64 },
    CrossFade {
        outgoing: usize,
        outgoing_local: f64,
        incoming: usize,
        incoming_local: f64,
        alpha: f64,
    },
}

/// Turns stills into one continuous, looping, cross-faded background
///
/// Clip `i` starts at `i * (clip_duration - crossfade)`; consecutive clips
/// overlap by `crossfade` seconds. The concatenated sequence repeats until it
/// covers the whole timeline.
pub struct BackgroundAnimator {
    canvas: CanvasConfig,
    images: Vec<BackgroundImage>,
    clips: Vec<ClipSpec>,
    crossfade: f64,
    cycle: f64,
    total_duration: f64,
}

impl BackgroundAnimator {
    /// Build the animator, substituting gradients when no image is available
    pub fn new(
        images: Vec<BackgroundImage>,
        total_duration: f64,
        canvas: CanvasConfig,
        config: &BackgroundConfig,
    ) -> Self {
        let images = if images.is_empty() {
            let needed = config.needed_images(total_duration);
            warn!("No background images available, using {} gradient fallbacks", needed);
            fallback_gradients(needed, &canvas, config.fallback_seed)
        } else {
            images
        };

        let effect = ClipEffect::from_config(config);
        let stride = config.clip_duration - config.crossfade;
        let clips: Vec<ClipSpec> = (0..images.len())
            .map(|i| ClipSpec {
                image: i,
                start: i as f64 * stride,
                duration: config.clip_duration,
                effect,
            })
            .collect();

        let cycle = clips.last().map(ClipSpec::end).unwrap_or(0.0);

        info!(
            "Background: {} clips, {:.1}s per cycle, {:.1}s total",
            clips.len(),
            cycle,
            total_duration
        );

        Self {
            canvas,
            images,
            clips,
            crossfade: config.crossfade,
            cycle,
            total_duration,
        }
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clips(&self) -> &[ClipSpec] {
        &self.clips
    }

    pub fn images(&self) -> &[BackgroundImage] {
        &self.images
    }

    /// Length of one pass over all clips before looping
    pub fn cycle_duration(&self) -> f64 {
        self.cycle
    }

    /// Resolve absolute time `t` to clip-local times
    pub fn sample(&self, t: f64) -> BackgroundSample {
        let t = t.clamp(0.0, self.total_duration.max(0.0));
        let local = if self.cycle > 0.0 { t % self.cycle } else { 0.0 };

        let current = self
            .clips
            .iter()
            .rposition(|c| c.start <= local)
            .unwrap_or(0);
        let clip = &self.clips[current];

        if current > 0 {
            let previous = &self.clips[current - 1];
            if local < previous.end() && self.crossfade > 0.0 {
                return BackgroundSample::CrossFade {
                    outgoing: current - 1,
                    outgoing_local: local - previous.start,
                    incoming: current,
                    incoming_local: local - clip.start,
                    alpha: (local - clip.start) / self.crossfade,
                };
            }
        }

        BackgroundSample::Clip {
            clip: current,
            local: local - clip.start,
        }
    }

    /// Render the background frame at absolute time `t`
    pub fn frame_at(&self, t: f64) -> Frame {
        match self.sample(t) {
            BackgroundSample::Clip { clip, local } => self.render_clip(clip, local),
            BackgroundSample::CrossFade { outgoing, outgoing_local, incoming, incoming_local, alpha } => {
                let a = self.render_clip(outgoing, outgoing_local);
                let b = self.render_clip(incoming, incoming_local);
                Frame::blend(&a, &b, alpha as f32)
            }
        }
    }

    fn render_clip(&self, clip: usize, local: f64) -> Frame {
        let spec = &self.clips[clip];
        spec.effect.render(&self.images[spec.image], local, spec.duration, &self.canvas)
    }
}

/// Deterministic two-color gradients, one per image slot
pub fn fallback_gradients(count: usize, canvas: &CanvasConfig, seed: u64) -> Vec<BackgroundImage> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let palettes: Vec<([u8; 3], [u8; 3])> = (0..count)
        .map(|_| {
            let top = [rng.gen_range(20..=100), rng.gen_range(20..=100), rng.gen_range(100..=200)];
            let bottom = [rng.gen_range(100..=200), rng.gen_range(20..=100), rng.gen_range(20..=80)];
            (top, bottom)
        })
        .collect();

    debug!("Generating {} fallback gradients", count);

    palettes
        .into_par_iter()
        .map(|(top, bottom)| {
            let frame = Frame::vertical_gradient(canvas.width, canvas.height, top, bottom);
            BackgroundImage::with_dominant_color(frame.into_image(), top)
        })
        .collect()
}
