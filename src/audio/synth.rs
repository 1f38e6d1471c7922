use std::f64::consts::PI;

use crate::audio::types::sample_count;
use crate::config::AudioConfig;

/// Convert a dB attenuation into a linear gain factor
pub fn attenuation_gain(db: f32) -> f32 {
    10f32.powf(-db / 20.0)
}

/// Generate the ambient music bed covering `duration` seconds
///
/// Each partial contributes its fundamental plus a quieter octave; the sum
/// gets a slow tremolo and linear fades, then is normalized so its peak
/// equals `config.ambient_peak`.
pub fn ambient_bed(duration: f64, config: &AudioConfig) -> Vec<f32> {
    let len = sample_count(duration, config.sample_rate);
    if len == 0 {
        return Vec::new();
    }

    let sr = config.sample_rate as f64;
    let mut bed: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            let harmonics: f64 = config
                .ambient_partials
                .iter()
                .map(|&f| 0.08 * (2.0 * PI * f * t).sin() + 0.025 * (4.0 * PI * f * t).sin())
                .sum();
            let tremolo = 0.75 + 0.25 * (2.0 * PI * config.tremolo_rate * t).sin();
            (harmonics * tremolo) as f32
        })
        .collect();

    let fade = sample_count(config.ambient_fade, config.sample_rate).min(len / 4);
    apply_linear_fades(&mut bed, fade, fade);

    let peak = bed.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 0.0 {
        let scale = config.ambient_peak / peak;
        bed.iter_mut().for_each(|s| *s *= scale);
    }

    bed
}

/// Short decaying sine stinger played at each segment start
pub fn cue_tone(config: &AudioConfig) -> Vec<f32> {
    let len = sample_count(config.cue_duration, config.sample_rate);
    let sr = config.sample_rate as f64;

    (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            ((2.0 * PI * config.cue_frequency * t).sin() * (-7.0 * t).exp() * 0.45) as f32
        })
        .collect()
}

/// Ramp the first `fade_in` samples up from 0 and the last `fade_out` down to 0
pub fn apply_linear_fades(samples: &mut [f32], fade_in: usize, fade_out: usize) {
    let len = samples.len();
    let fade_in = fade_in.min(len);
    let fade_out = fade_out.min(len);

    for i in 0..fade_in {
        samples[i] *= ramp(i, fade_in);
    }
    for i in 0..fade_out {
        samples[len - 1 - i] *= ramp(i, fade_out);
    }
}

fn ramp(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AudioConfig {
        AudioConfig {
            sample_rate: 8000,
            ..AudioConfig::default()
        }
    }

    #[test]
    fn test_ambient_bed_normalized_and_faded() {
        let config = small_config();
        let bed = ambient_bed(10.0, &config);

        assert_eq!(bed.len(), 80_000);
        let peak = bed.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - config.ambient_peak).abs() < 1e-5);
        assert_eq!(bed[0], 0.0);
        assert_eq!(*bed.last().unwrap(), 0.0);
    }

    #[test]
    fn test_short_bed_fades_over_a_quarter() {
        let config = small_config();
        let bed = ambient_bed(2.0, &config);

        // 16000 samples: fade is 4000, far shorter than 3s
        assert_eq!(bed.len(), 16_000);
        assert_eq!(bed[0], 0.0);
        assert!(bed[8000].abs() > 0.0 || bed[8001].abs() > 0.0);
    }

    #[test]
    fn test_zero_duration_is_empty() {
        assert!(ambient_bed(0.0, &small_config()).is_empty());
    }

    #[test]
    fn test_cue_tone_decays() {
        let config = small_config();
        let cue = cue_tone(&config);

        assert_eq!(cue.len(), 4000);
        let head = cue[..400].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = cue[3600..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head > tail * 10.0);
        assert!(head <= 0.45);
    }

    #[test]
    fn test_attenuation_gain() {
        assert!((attenuation_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((attenuation_gain(20.0) - 0.1).abs() < 1e-6);
    }
}
