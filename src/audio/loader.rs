use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::task;
use tracing::{debug, warn};

use crate::audio::types::AudioData;
use crate::error::{AudioError, CompositorError, Result};

/// Narration loader supporting the formats text-to-speech engines emit
///
/// WAV is read with hound; anything else (mp3, m4a, aac, flac, ogg, ...)
/// is handed to symphonia's format detection.
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file and return raw audio data
    ///
    /// Decoding runs on the blocking thread pool.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path: PathBuf = path.as_ref().to_path_buf();
        task::spawn_blocking(move || Self::load_blocking(&path))
            .await
            .map_err(|e| CompositorError::generic(format!("audio decode task failed: {}", e)))?
    }

    /// Synchronous decode, dispatched on the file extension
    pub fn load_blocking(path: &Path) -> Result<AudioData> {
        let audio = match Self::detect_format(path).as_deref() {
            Some("wav") => Self::load_wav(path)?,
            _ => Self::load_with_symphonia(path)?,
        };

        if audio.samples.is_empty() {
            warn!("{:?} decoded to zero samples", path);
            return Err(AudioError::LoadFailed {
                path: path.display().to_string(),
            }
            .into());
        }
        Ok(audio)
    }

    /// Load WAV files using the hound crate (most reliable for WAV)
    fn load_wav(path: &Path) -> Result<AudioData> {
        let load_failed = || AudioError::LoadFailed {
            path: path.display().to_string()
        };

        let reader = hound::WavReader::open(path).map_err(|_| load_failed())?;

        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| load_failed())?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| load_failed())?
                    .into_iter()
                    .map(|sample| Self::int_to_float(sample, bit_depth))
                    .collect()
            }
        };

        let duration = samples.len() as f64 / (spec.sample_rate * spec.channels as u32) as f64;
        debug!("Loaded WAV {:?}: {:.2}s", path, duration);

        Ok(AudioData {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration,
        })
    }

    /// Load compressed formats using Symphonia
    fn load_with_symphonia(path: &Path) -> Result<AudioData> {
        let load_failed = || AudioError::LoadFailed {
            path: path.display().to_string()
        };

        let file = File::open(path).map_err(|_| load_failed())?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let detected = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| match e {
                SymphoniaError::Unsupported(_) => CompositorError::from(AudioError::UnsupportedFormat {
                    format: Self::detect_format(path).unwrap_or_else(|| "unknown".to_string()),
                }),
                _ => load_failed().into(),
            })?;
        let mut format = detected.format;

        // First audio track with a decodable codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(load_failed)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params.sample_rate
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No sample rate found".to_string()
            })?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|_| load_failed())?;

        let mut samples = Vec::new();
        let mut channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(1);

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // End of stream surfaces as an unexpected EOF
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    warn!("Stopped reading {:?} after {} samples: {}", path, samples.len(), e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    channels = spec.channels.count() as u16;
                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                }
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => {
                    warn!("Decoder failed on {:?}: {}", path, e);
                    break;
                }
            }
        }

        let duration = samples.len() as f64 / (sample_rate * channels.max(1) as u32) as f64;
        debug!("Decoded {:?}: {:.2}s, {} Hz, {} channels", path, duration, sample_rate, channels);

        Ok(AudioData {
            samples,
            sample_rate,
            channels,
            duration,
        })
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => (sample as f32 - 128.0) / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0, // Default to 16-bit
        }
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioLoader::detect_format("f0.wav"), Some("wav".to_string()));
        assert_eq!(AudioLoader::detect_format("f0.MP3"), Some("mp3".to_string()));
        assert_eq!(AudioLoader::detect_format("f0"), None);
    }

    #[test]
    fn test_int_to_float_conversion() {
        assert_eq!(AudioLoader::int_to_float(0, 16), 0.0);
        assert_eq!(AudioLoader::int_to_float(-32768, 16), -1.0);
        assert_eq!(AudioLoader::int_to_float(128, 8), 0.0);
        assert_eq!(AudioLoader::int_to_float(0, 8), -1.0);
    }

    #[tokio::test]
    async fn test_load_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("narration.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..22050 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let audio = AudioLoader::load(&path).await.unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.sample_rate, 22050);
        assert!((audio.duration - 1.0).abs() < 1e-9);
        assert!((audio.mono_samples()[0] - 0.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("narration.xyz");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"dummy content").unwrap();

        let result = AudioLoader::load(&file_path).await;
        if let Err(CompositorError::Audio(AudioError::UnsupportedFormat { format })) = result {
            assert_eq!(format, "xyz");
        } else {
            panic!("Expected UnsupportedFormat error");
        }
    }

    #[tokio::test]
    async fn test_unknown_extension_goes_to_symphonia() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("narration.m4a");
        std::fs::write(&file_path, b"not really an mp4 container").unwrap();

        match AudioLoader::load(&file_path).await {
            Err(CompositorError::Audio(AudioError::UnsupportedFormat { format })) => assert_eq!(format, "m4a"),
            other => panic!("Expected UnsupportedFormat from symphonia, got {:?}", other.map(|a| a.duration)),
        }
    }

    #[tokio::test]
    async fn test_empty_stream_is_load_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silent.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        hound::WavWriter::create(&path, spec).unwrap().finalize().unwrap();

        let err = AudioLoader::load(&path).await.err().unwrap();
        assert!(matches!(err, CompositorError::Audio(AudioError::LoadFailed { .. })));
        assert!(err.is_recoverable());
    }
}
