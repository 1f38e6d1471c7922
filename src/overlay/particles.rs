use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{CanvasConfig, OverlayConfig};
use crate::overlay::canvas::OverlayCanvas;
use crate::overlay::traits::{FrameContext, Layer};

const PARTICLE_COLOR: [u8; 3] = [255, 255, 210];

/// Initial state of one floating dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Upward drift in px/s
    pub vy: f64,
    /// Sideways drift in px/s
    pub vx: f64,
    pub radius: u32,
    pub phase: f64,
}

impl Particle {
    /// Position at time `t`, wrapped around the canvas
    pub fn position(&self, t: f64, width: f64, height: f64) -> (f64, f64) {
        let x = (self.x + self.vx * t).rem_euclid(width);
        let y = (self.y - self.vy * t).rem_euclid(height);
        (x, y)
    }

    /// Flickering opacity, never below 15
    pub fn alpha(&self, t: f64) -> u8 {
        let a = (50.0 + 45.0 * (t * 2.5 + self.phase).sin()) as i32;
        a.max(15) as u8
    }
}

/// Immutable particle table generated once from a fixed seed
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn generate(count: usize, seed: u64, canvas: &CanvasConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (w, h) = (canvas.width as f64, canvas.height as f64);

        let particles = (0..count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..w),
                y: rng.gen_range(0.0..h),
                vy: rng.gen_range(50.0..130.0),
                vx: rng.gen_range(-20.0..20.0),
                radius: rng.gen_range(2..=6),
                phase: rng.gen_range(0.0..TAU),
            })
            .collect();

        Self { particles }
    }

    pub fn from_config(config: &OverlayConfig, canvas: &CanvasConfig) -> Self {
        Self::generate(config.particle_count, config.particle_seed, canvas)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

/// Drifting, flickering dots behind everything else
pub struct ParticleLayer {
    field: ParticleField,
}

impl ParticleLayer {
    pub fn new(field: ParticleField) -> Self {
        Self { field }
    }
}

impl Layer for ParticleLayer {
    fn name(&self) -> &str {
        "particles"
    }

    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        let (w, h) = (ctx.width() as f64, ctx.height() as f64);
        for particle in self.field.particles() {
            let (x, y) = particle.position(ctx.t, w, h);
            let [r, g, b] = PARTICLE_COLOR;
            canvas.fill_circle(x as f32, y as f32, particle.radius as f32, [r, g, b, particle.alpha(ctx.t)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_field() {
        let canvas = CanvasConfig::default();
        let a = ParticleField::generate(28, 42, &canvas);
        let b = ParticleField::generate(28, 42, &canvas);
        assert_eq!(a, b);
        assert_eq!(a.particles().len(), 28);
        assert_ne!(a, ParticleField::generate(28, 43, &canvas));
    }

    #[test]
    fn test_parameters_in_range() {
        let canvas = CanvasConfig::default();
        for p in ParticleField::generate(200, 1, &canvas).particles() {
            assert!((0.0..1080.0).contains(&p.x));
            assert!((0.0..1920.0).contains(&p.y));
            assert!((50.0..130.0).contains(&p.vy));
            assert!((-20.0..20.0).contains(&p.vx));
            assert!((2..=6).contains(&p.radius));
        }
    }

    #[test]
    fn test_position_wraps() {
        let p = Particle { x: 10.0, y: 10.0, vy: 100.0, vx: -20.0, radius: 3, phase: 0.0 };
        let (x, y) = p.position(1.0, 1080.0, 1920.0);
        assert!((x - 1070.0).abs() < 1e-9);
        assert!((y - 1830.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_floor() {
        let p = Particle { x: 0.0, y: 0.0, vy: 50.0, vx: 0.0, radius: 2, phase: -std::f64::consts::FRAC_PI_2 };
        assert_eq!(p.alpha(0.0), 15);
        let q = Particle { phase: std::f64::consts::FRAC_PI_2, ..p };
        assert_eq!(q.alpha(0.0), 95);
    }
}
