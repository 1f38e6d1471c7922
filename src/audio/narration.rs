use crate::audio::synth::apply_linear_fades;
use crate::audio::types::{sample_count, AudioData};
use crate::config::AudioConfig;

/// A narration clip normalized to the mix format
///
/// Mono, at the mix sample rate, faded in and out and padded with trailing
/// silence. Its length is the segment's spoken duration.
#[derive(Debug, Clone)]
pub struct NarrationClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl NarrationClip {
    /// Convert decoded narration into a timeline-ready clip
    pub fn prepare(audio: &AudioData, config: &AudioConfig) -> Self {
        let mono = audio.mono_samples();
        let mut samples = resample_linear(&mono, audio.sample_rate, config.sample_rate);

        apply_linear_fades(
            &mut samples,
            sample_count(config.narration_fade_in, config.sample_rate),
            sample_count(config.narration_fade_out, config.sample_rate),
        );
        samples.resize(
            samples.len() + sample_count(config.narration_padding, config.sample_rate),
            0.0,
        );

        Self {
            samples,
            sample_rate: config.sample_rate,
        }
    }

    /// Wrap samples that are already in the mix format
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Spoken duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Linear-interpolation resampling
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = ((samples.len() as u64 * to_rate as u64) / from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let i0 = (pos.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let frac = (pos - i0 as f64) as f32;
            samples[i0] + (samples[i1] - samples[i0]) * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_pads_and_fades() {
        let config = AudioConfig {
            sample_rate: 1000,
            ..AudioConfig::default()
        };
        let audio = AudioData::from_mono(vec![1.0; 2000], 1000);
        let clip = NarrationClip::prepare(&audio, &config);

        // 2.0s of speech + 0.6s of silence
        assert_eq!(clip.samples().len(), 2600);
        assert!((clip.duration() - 2.6).abs() < 1e-9);
        assert_eq!(clip.samples()[0], 0.0);
        assert_eq!(clip.samples()[1000], 1.0);
        assert_eq!(clip.samples()[1999], 0.0);
        assert!(clip.samples()[2000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_prepare_resamples() {
        let config = AudioConfig {
            sample_rate: 2000,
            narration_fade_in: 0.0,
            narration_fade_out: 0.0,
            narration_padding: 0.0,
            ..AudioConfig::default()
        };
        let audio = AudioData::from_mono(vec![0.0, 1.0, 0.0, 1.0], 1000);
        let clip = NarrationClip::prepare(&audio, &config);

        assert_eq!(clip.samples(), &[0.0, 0.5, 1.0, 0.5, 0.0, 0.5, 1.0, 1.0]);
    }
}
