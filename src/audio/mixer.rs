use tracing::debug;

use crate::audio::narration::NarrationClip;
use crate::audio::synth::{ambient_bed, attenuation_gain, cue_tone};
use crate::audio::types::{sample_count, MixedAudio};
use crate::config::AudioConfig;

/// Combines ambient bed, narration and cue tones into one timeline
///
/// The output always holds exactly `sample_count(total_duration)` samples;
/// anything overlaid past the end is truncated.
pub struct AudioTimelineMixer {
    config: AudioConfig,
}

impl AudioTimelineMixer {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Mix narration clips anchored at their segment start offsets
    pub fn mix(&self, total_duration: f64, narration: &[(f64, &NarrationClip)]) -> MixedAudio {
        let sample_rate = self.config.sample_rate;
        let len = sample_count(total_duration, sample_rate);

        let ambient_gain = attenuation_gain(self.config.ambient_attenuation_db);
        let mut timeline: Vec<f32> = ambient_bed(total_duration, &self.config)
            .into_iter()
            .map(|s| s * ambient_gain)
            .collect();
        timeline.resize(len, 0.0);

        let cue_gain = attenuation_gain(self.config.cue_attenuation_db);
        let cue: Vec<f32> = cue_tone(&self.config).into_iter().map(|s| s * cue_gain).collect();

        for (index, (start_offset, clip)) in narration.iter().enumerate() {
            debug_assert_eq!(clip.sample_rate(), sample_rate, "narration must be prepared at the mix rate");

            let offset = sample_count(*start_offset, sample_rate);
            overlay(&mut timeline, clip.samples(), offset);
            overlay(&mut timeline, &cue, offset);

            debug!("Overlaid narration {} at {:.3}s ({} samples)", index, start_offset, clip.samples().len());
        }

        MixedAudio {
            samples: timeline,
            sample_rate,
            duration: total_duration,
        }
    }
}

/// Superimpose `source` onto `target` starting at `offset`, truncating at the end
fn overlay(target: &mut [f32], source: &[f32], offset: usize) {
    if offset >= target.len() {
        return;
    }
    target[offset..]
        .iter_mut()
        .zip(source)
        .for_each(|(t, s)| *t += s);
}
