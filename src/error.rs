use thiserror::Error;

/// Main error type for the Shorts-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to write audio file: {path} - {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load image file: {path}")]
    LoadFailed { path: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Frame processing failed: {reason}")]
    FrameProcessingFailed { reason: String },
}

/// Composition-specific errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("No usable facts in job: {reason}")]
    NoFacts { reason: String },

    #[error("Invalid job manifest: {path} - {reason}")]
    InvalidJob { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (the offending input can be skipped or retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            // A narration clip or image may still be mid-download
            Self::Audio(AudioError::LoadFailed { .. }) => true,
            // Narration in a container nothing can decode only loses that fact
            Self::Audio(AudioError::UnsupportedFormat { .. }) => true,
            Self::Video(VideoError::LoadFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load narration '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Video(VideoError::EncodingFailed { reason }) if reason.contains("not found") => {
                "FFmpeg is required to encode the final video. Please install it and make sure it is on PATH.".to_string()
            }
            Self::Composition(CompositionError::NoFacts { .. }) => {
                "The job did not contain any fact with usable narration.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let err: CompositorError = AudioError::LoadFailed { path: "f0.mp3".to_string() }.into();
        assert!(err.is_recoverable());

        let err: CompositorError = AudioError::UnsupportedFormat { format: "m4a".to_string() }.into();
        assert!(err.is_recoverable());

        let err: CompositorError = CompositionError::NoFacts { reason: "empty".to_string() }.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_message_for_missing_ffmpeg() {
        let err: CompositorError = VideoError::EncodingFailed {
            reason: "ffmpeg not found on PATH".to_string(),
        }.into();
        assert!(err.user_message().contains("FFmpeg is required"));
    }
}
