use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the Shorts-Compositor
///
/// Every component receives the sections it needs by reference, so several
/// jobs with different canvases can run side by side in one process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output canvas and frame rate
    pub canvas: CanvasConfig,

    /// Word timing heuristics
    pub timing: TimingConfig,

    /// Audio mixing settings
    pub audio: AudioConfig,

    /// Animated background settings
    pub background: BackgroundConfig,

    /// Overlay layer settings
    pub overlay: OverlayConfig,

    /// Frame rendering settings
    pub render: RenderConfig,

    /// Encoder settings
    pub encoder: EncoderConfig,

    /// Fact selection window
    pub selection: SelectionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        self.timing.validate()?;
        self.audio.validate()?;
        self.background.validate()?;
        self.render.validate()?;
        self.selection.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> crate::error::CompositorError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }.into()
}

/// Largest accepted canvas edge in pixels
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Fixed portrait canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
        }
    }
}

impl CanvasConfig {
    /// Number of frames covering `duration` seconds
    pub fn frame_count(&self, duration: f64) -> usize {
        (duration * self.fps as f64).round().max(0.0) as usize
    }

    /// Timestamp of a frame index
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 / self.fps as f64
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.width > MAX_CANVAS_SIDE || self.height > MAX_CANVAS_SIDE {
            return Err(invalid("canvas.size", format!("{}x{}", self.width, self.height)));
        }
        if self.fps == 0 {
            return Err(invalid("canvas.fps", self.fps));
        }
        Ok(())
    }
}

/// Word timestamp heuristic constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Text-to-speech engine startup before the first word (seconds)
    pub lead: f64,

    /// Protected trailing silence and fade (seconds)
    pub trail: f64,

    /// Floor for the time available to words (seconds)
    pub min_available: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lead: 0.15,
            trail: 0.3,
            min_available: 0.5,
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<()> {
        if self.lead < 0.0 || self.trail < 0.0 {
            return Err(invalid("timing.lead_trail", format!("{}/{}", self.lead, self.trail)));
        }
        if self.min_available <= 0.0 {
            return Err(invalid("timing.min_available", self.min_available));
        }
        Ok(())
    }
}

/// Audio mixing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of the mixed timeline (Hz)
    pub sample_rate: u32,

    /// Fundamental frequencies of the ambient bed (Hz)
    pub ambient_partials: Vec<f64>,

    /// Ambient tremolo rate (Hz)
    pub tremolo_rate: f64,

    /// Peak amplitude of the normalized ambient bed
    pub ambient_peak: f32,

    /// Maximum ambient fade length (seconds)
    pub ambient_fade: f64,

    /// Ambient attenuation relative to narration (dB)
    pub ambient_attenuation_db: f32,

    /// Cue tone attenuation (dB)
    pub cue_attenuation_db: f32,

    /// Cue tone frequency (Hz)
    pub cue_frequency: f64,

    /// Cue tone length (seconds)
    pub cue_duration: f64,

    /// Narration fade-in applied at ingestion (seconds)
    pub narration_fade_in: f64,

    /// Narration fade-out applied at ingestion (seconds)
    pub narration_fade_out: f64,

    /// Silence appended after each narration clip (seconds)
    pub narration_padding: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            ambient_partials: vec![130.8, 164.8, 196.0, 261.6, 329.6],
            tremolo_rate: 0.07,
            ambient_peak: 0.18,
            ambient_fade: 3.0,
            ambient_attenuation_db: 14.0,
            cue_attenuation_db: 3.0,
            cue_frequency: 880.0,
            cue_duration: 0.5,
            narration_fade_in: 0.25,
            narration_fade_out: 0.4,
            narration_padding: 0.6,
        }
    }
}

impl AudioConfig {
    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", self.sample_rate));
        }
        if !(0.0..=1.0).contains(&self.ambient_peak) {
            return Err(invalid("audio.ambient_peak", self.ambient_peak));
        }
        if self.cue_duration <= 0.0 {
            return Err(invalid("audio.cue_duration", self.cue_duration));
        }
        Ok(())
    }
}

/// Animated background configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Length of each per-image clip (seconds)
    pub clip_duration: f64,

    /// Cross-fade overlap between consecutive clips (seconds)
    pub crossfade: f64,

    /// Scale factor reached at the end of each clip
    pub zoom_end: f64,

    /// Mean tint strength toward the dominant color
    pub tint_base: f32,

    /// Tint oscillation amplitude
    pub tint_amplitude: f32,

    /// Tint oscillation rate (rad/s)
    pub tint_rate: f64,

    /// Gaussian blur applied at ingestion
    pub ingest_blur: f32,

    /// Extra image slots beyond the ones needed to cover the timeline
    pub spare_slots: usize,

    /// Seed for fallback gradient colors
    pub fallback_seed: u64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            clip_duration: 4.0,
            crossfade: 0.5,
            zoom_end: 1.08,
            tint_base: 0.06,
            tint_amplitude: 0.04,
            tint_rate: 0.5,
            ingest_blur: 1.5,
            spare_slots: 3,
            fallback_seed: 0x5eed,
        }
    }
}

impl BackgroundConfig {
    /// Image slots needed to cover `total_duration`
    pub fn needed_images(&self, total_duration: f64) -> usize {
        (total_duration / self.clip_duration).ceil().max(0.0) as usize + self.spare_slots
    }

    fn validate(&self) -> Result<()> {
        if self.clip_duration <= 0.0 {
            return Err(invalid("background.clip_duration", self.clip_duration));
        }
        if self.crossfade < 0.0 || self.crossfade >= self.clip_duration {
            return Err(invalid("background.crossfade", self.crossfade));
        }
        if self.zoom_end < 1.0 {
            return Err(invalid("background.zoom_end", self.zoom_end));
        }
        Ok(())
    }
}

/// Overlay layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Number of floating particles
    pub particle_count: usize,

    /// Seed for particle parameters
    pub particle_seed: u64,

    /// Intro banner window (seconds)
    pub intro_duration: f64,

    /// Follow prompt window, starting at the timeline midpoint (seconds)
    pub follow_duration: f64,

    /// Outro banner window (seconds)
    pub outro_duration: f64,

    /// Banner ramp-up time (seconds)
    pub ramp_in: f64,

    /// Banner ramp-down time (seconds)
    pub ramp_out: f64,

    /// Caption wrap width in characters
    pub caption_wrap: usize,

    pub intro_title: String,
    pub intro_subtitle: String,
    pub follow_prompt: String,
    pub watermark: String,
    pub outro_title: String,
    pub outro_subtitle: String,

    /// Caption label, `{n}` is replaced with the one-based fact number
    pub fact_label: String,

    /// Text sizes in pixels
    pub font_sizes: FontSizes,

    /// Candidate font files, the first readable one wins
    pub font_paths: Vec<PathBuf>,
}

/// Pixel sizes for each kind of overlay text
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub caption: f32,
    pub label: f32,
    pub banner_title: f32,
    pub banner_subtitle: f32,
    pub watermark: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            caption: 58.0,
            label: 44.0,
            banner_title: 72.0,
            banner_subtitle: 44.0,
            watermark: 32.0,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            particle_count: 28,
            particle_seed: 42,
            intro_duration: 2.0,
            follow_duration: 4.5,
            outro_duration: 2.5,
            ramp_in: 0.35,
            ramp_out: 0.5,
            caption_wrap: 25,
            intro_title: "★  Did You Know?  ★".to_string(),
            intro_subtitle: "- Mind-Blowing Facts -".to_string(),
            follow_prompt: "[+]  Follow for more facts!".to_string(),
            watermark: "★ Did You Know? ★".to_string(),
            outro_title: ">> That's a Wrap! <<".to_string(),
            outro_subtitle: "Like  |  Follow  |  Share".to_string(),
            fact_label: "✦  FACT  #{n}  ✦".to_string(),
            font_sizes: FontSizes::default(),
            font_paths: vec![
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/freefont/FreeSansBold.ttf"),
            ],
        }
    }
}

/// Frame rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of parallel render threads
    pub threads: usize,

    /// Frames rendered per parallel batch before hand-off to the encoder
    pub chunk_frames: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            chunk_frames: 48,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(invalid("render.threads", self.threads));
        }
        if self.chunk_frames == 0 {
            return Err(invalid("render.chunk_frames", self.chunk_frames));
        }
        Ok(())
    }
}

/// Encoder sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub ffmpeg: String,
    pub video_codec: String,
    pub video_bitrate: String,
    pub audio_codec: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            video_bitrate: "5000k".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

/// Window the selected narration must fit in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Stop accepting facts once this total is reached (seconds)
    pub target_total: f64,

    /// Never exceed this total (seconds)
    pub max_total: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_total: 50.0,
            max_total: 60.0,
        }
    }
}

impl SelectionConfig {
    fn validate(&self) -> Result<()> {
        if self.target_total > self.max_total {
            return Err(invalid(
                "selection.window",
                format!("{}-{}", self.target_total, self.max_total),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas.width, 1080);
        assert_eq!(config.canvas.height, 1920);
        assert_eq!(config.canvas.fps, 30);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.canvas.fps = 24;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.canvas.fps, 24);
        assert_eq!(original_config.audio.sample_rate, loaded_config.audio.sample_rate);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[canvas]\nwidth = 540\nheight = 960\nfps = 25\n").unwrap();
        assert_eq!(config.canvas.width, 540);
        assert_eq!(config.timing.lead, 0.15);
        assert_eq!(config.overlay.particle_count, 28);
    }

    #[test]
    fn test_invalid_crossfade() {
        let mut config = Config::default();
        config.background.crossfade = 4.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let mut config = Config::default();
        config.canvas.height = MAX_CANVAS_SIDE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_needed_images() {
        let config = BackgroundConfig::default();
        assert_eq!(config.needed_images(16.0), 7);
        assert_eq!(config.needed_images(17.0), 8);
    }

    #[test]
    fn test_frame_count() {
        let canvas = CanvasConfig::default();
        assert_eq!(canvas.frame_count(2.0), 60);
        assert_eq!(canvas.frame_time(15), 0.5);
    }
}
