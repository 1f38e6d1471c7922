/// Number of samples covering `duration` seconds at `sample_rate`
///
/// Every buffer on the timeline is sized with this so lengths agree exactly.
pub fn sample_count(duration: f64, sample_rate: u32) -> usize {
    (duration * sample_rate as f64).round().max(0.0) as usize
}

/// Raw audio data with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,
}

impl AudioData {
    /// Build in-memory mono audio, used for synthesized buffers and tests
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = samples.len() as f64 / sample_rate as f64;
        Self {
            samples,
            sample_rate,
            channels: 1,
            duration,
        }
    }

    /// Get mono mix of all channels
    pub fn mono_samples(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        let mut mono = Vec::with_capacity(self.samples.len() / self.channels as usize);

        for chunk in self.samples.chunks(self.channels as usize) {
            let sum: f32 = chunk.iter().sum();
            mono.push(sum / self.channels as f32);
        }

        mono
    }
}

/// The single mono timeline handed to the encoder
#[derive(Debug, Clone)]
pub struct MixedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration: f64,
}

impl MixedAudio {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_data_mono_conversion() {
        let audio_data = AudioData {
            samples: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], // L, R, L, R, L, R
            sample_rate: 44100,
            channels: 2,
            duration: 3.0 / 44100.0,
        };

        let mono = audio_data.mono_samples();
        assert_eq!(mono, vec![1.5, 3.5, 5.5]);
    }

    #[test]
    fn test_sample_count_rounds() {
        assert_eq!(sample_count(16.0, 44100), 705_600);
        assert_eq!(sample_count(0.0, 44100), 0);
        assert_eq!(sample_count(1.0 / 3.0, 3), 1);
    }
}
