use std::path::Path;

use tracing::info;

use crate::audio::types::MixedAudio;
use crate::error::{AudioError, Result};

/// Exports the mixed timeline for the encoder
pub struct AudioWriter;

impl AudioWriter {
    /// Write the mix as 16-bit mono PCM, clamping to [-1, 1]
    pub fn write_wav<P: AsRef<Path>>(audio: &MixedAudio, path: P) -> Result<()> {
        let path = path.as_ref();
        let write_failed = |e: hound::Error| AudioError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: audio.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(write_failed)?;
        for &sample in &audio.samples {
            writer
                .write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
                .map_err(write_failed)?;
        }
        writer.finalize().map_err(write_failed)?;

        info!("Wrote {:.1}s mix to {:?}", audio.duration, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_clamps_and_preserves_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.wav");
        let audio = MixedAudio {
            samples: vec![0.0, 2.0, -2.0, 0.5],
            sample_rate: 8000,
            duration: 4.0 / 8000.0,
        };

        AudioWriter::write_wav(&audio, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.into_samples().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(samples, vec![0, 32767, -32767, 16383]);
    }
}
