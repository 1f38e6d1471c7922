use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, info};

use crate::config::{CanvasConfig, EncoderConfig};
use crate::error::{Result, VideoError};
use crate::video::types::Frame;

/// Consumer of rendered frames, fed strictly in frame-index order
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;
}

/// Collects frames in memory
impl FrameSink for Vec<Frame> {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.push(frame.clone());
        Ok(())
    }
}

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
}

/// Encodes raw rgb24 frames plus the mixed audio with an external ffmpeg
pub struct FfmpegEncoder {
    config: EncoderConfig,
    canvas: CanvasConfig,
}

impl FfmpegEncoder {
    pub fn new(config: EncoderConfig, canvas: CanvasConfig) -> Self {
        Self { config, canvas }
    }

    pub fn check_ffmpeg_available(&self) -> bool {
        Command::new(&self.config.ffmpeg)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Full ffmpeg argument list for one encode
    pub fn arguments(&self, audio_path: &Path, output_path: &Path) -> Vec<String> {
        let size = format!("{}x{}", self.canvas.width, self.canvas.height);
        let fps = self.canvas.fps.to_string();
        let mut args: Vec<String> = [
            "-hide_banner", "-loglevel", "error", "-y",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s", size.as_str(),
            "-r", fps.as_str(),
            "-i", "-",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.push(audio_path.display().to_string());
        args.extend(
            [
                "-map", "0:v",
                "-map", "1:a",
                "-c:v", self.config.video_codec.as_str(),
                "-b:v", self.config.video_bitrate.as_str(),
                "-pix_fmt", "yuv420p",
                "-c:a", self.config.audio_codec.as_str(),
                "-shortest",
                "-movflags", "+faststart",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(output_path.display().to_string());
        args
    }

    /// Spawn ffmpeg and return a session that accepts frames on stdin
    pub fn start(&self, audio_path: &Path, output_path: &Path) -> Result<EncoderSession> {
        let args = self.arguments(audio_path, output_path);
        debug!("Spawning {} {}", self.config.ffmpeg, args.join(" "));

        let mut child = Command::new(&self.config.ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::EncodingFailed {
                reason: if e.kind() == std::io::ErrorKind::NotFound {
                    format!("{} not found on PATH", self.config.ffmpeg)
                } else {
                    format!("Failed to spawn FFmpeg process: {}", e)
                },
            })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "FFmpeg stdin unavailable".to_string(),
        })?;

        Ok(EncoderSession {
            child,
            stdin: Some(stdin),
            canvas: self.canvas,
            output_path: output_path.to_path_buf(),
            frames_written: 0,
        })
    }
}

/// A running ffmpeg process
pub struct EncoderSession {
    child: Child,
    stdin: Option<ChildStdin>,
    canvas: CanvasConfig,
    output_path: PathBuf,
    frames_written: usize,
}

impl EncoderSession {
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Close stdin, wait for ffmpeg to exit and describe how it ended
    fn reap(&mut self) -> String {
        drop(self.stdin.take());

        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            if let Err(e) = pipe.read_to_string(&mut stderr) {
                debug!("Could not read FFmpeg stderr: {}", e);
            }
        }

        match self.child.wait() {
            Ok(status) if stderr.trim().is_empty() => format!("ffmpeg exited with {}", status),
            Ok(status) => format!("ffmpeg exited with {}: {}", status, stderr.trim()),
            Err(e) => format!("ffmpeg could not be reaped: {}", e),
        }
    }

    /// Close stdin and wait for ffmpeg to finish the container
    pub fn finish(mut self) -> Result<EncodedVideo> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| VideoError::EncodingFailed {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::EncodingFailed {
                reason: format!("FFmpeg failed: {}", stderr.trim()),
            }
            .into());
        }

        let file_size = std::fs::metadata(&self.output_path).map(|m| m.len()).unwrap_or(0);
        let video = EncodedVideo {
            path: self.output_path.clone(),
            duration: self.frames_written as f64 / self.canvas.fps as f64,
            frame_count: self.frames_written,
            file_size,
        };

        info!(
            "Encoded {} frames to {:?} ({:.1}MB)",
            video.frame_count,
            video.path,
            video.file_size as f64 / 1024.0 / 1024.0
        );
        Ok(video)
    }
}

impl FrameSink for EncoderSession {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.width() != self.canvas.width || frame.height() != self.canvas.height {
            return Err(VideoError::FrameProcessingFailed {
                reason: format!(
                    "frame size mismatch: got {}x{}, expected {}x{}",
                    frame.width(),
                    frame.height(),
                    self.canvas.width,
                    self.canvas.height
                ),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| VideoError::EncodingFailed {
            reason: "encoder already finished".to_string(),
        })?;
        if let Err(e) = stdin.write_all(frame.as_raw()) {
            let cause = self.reap();
            return Err(VideoError::EncodingFailed {
                reason: format!("Failed to write frame {} to FFmpeg stdin: {}; {}", self.frames_written, e, cause),
            }
            .into());
        }

        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> FfmpegEncoder {
        FfmpegEncoder::new(EncoderConfig::default(), CanvasConfig::default())
    }

    #[test]
    fn test_arguments_describe_raw_input() {
        let args = encoder().arguments(Path::new("mix.wav"), Path::new("out.mp4"));
        let joined = args.join(" ");

        assert!(joined.contains("-f rawvideo -pix_fmt rgb24 -s 1080x1920 -r 30 -i -"));
        assert!(joined.contains("-i mix.wav"));
        assert!(joined.contains("-c:v libx264 -b:v 5000k"));
        assert!(joined.contains("-c:a aac"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_missing_binary_reports_not_found() {
        let config = EncoderConfig {
            ffmpeg: "definitely-not-an-ffmpeg-binary".to_string(),
            ..EncoderConfig::default()
        };
        let encoder = FfmpegEncoder::new(config, CanvasConfig::default());

        assert!(!encoder.check_ffmpeg_available());
        let err = encoder
            .start(Path::new("mix.wav"), Path::new("out.mp4"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Frame> = Vec::new();
        sink.write_frame(&Frame::new_filled(2, 2, [1, 1, 1])).unwrap();
        sink.write_frame(&Frame::new_filled(2, 2, [2, 2, 2])).unwrap();
        assert_eq!(sink[1].get_pixel(0, 0), [2, 2, 2]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_carries_ffmpeg_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\necho \"Unknown encoder 'libfake'\" >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = EncoderConfig {
            ffmpeg: script.display().to_string(),
            ..EncoderConfig::default()
        };
        let canvas = CanvasConfig::default();
        let mut session = FfmpegEncoder::new(config, canvas)
            .start(Path::new("mix.wav"), &dir.path().join("out.mp4"))
            .unwrap();

        let frame = Frame::new_filled(canvas.width, canvas.height, [0, 0, 0]);
        let err = (0..50)
            .find_map(|_| session.write_frame(&frame).err())
            .expect("writes to an exited encoder must fail");

        let message = err.to_string();
        assert!(message.contains("Unknown encoder 'libfake'"), "{}", message);
        assert!(message.contains("exited with"));
    }
}
