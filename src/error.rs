use thiserror::Error;

/// Main error type for the story-strip library
#[derive(Error, Debug)]
pub enum StripError {
    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    #[error("Drawing surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Color sampling error: {0}")]
    Color(#[from] ColorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Video loading and seeking errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load video: {src} ({reason})")]
    LoadFailed { src: String, reason: String },

    #[error("Seek to {time:.3}s failed: {reason}")]
    SeekFailed { time: f64, reason: String },

    #[error("Video decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Drawing surface errors
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Image encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

/// Base color extraction errors
#[derive(Error, Debug)]
pub enum ColorError {
    #[error("No source to image")]
    NoSource,

    #[error("Color sampling failed for {src}: {reason}")]
    SampleFailed { src: String, reason: String },
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

/// Convenience type alias for Results using StripError
pub type Result<T> = std::result::Result<T, StripError>;

impl StripError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::LoadFailed { src, .. }) => {
                format!("Could not load video '{}'. Please check the source exists and is a supported format.", src)
            }
            Self::Video(VideoError::SeekFailed { time, .. }) => {
                format!("Could not read the video frame at {:.2}s.", time)
            }
            Self::Color(ColorError::NoSource) => "No image source was given.".to_string(),
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
    fn test_video_error_messages() {
        let err: StripError = VideoError::SeekFailed {
            time: 2.5,
            reason: "eof".to_string(),
        }
        .into();
        assert_eq!(err.user_message(), "Could not read the video frame at 2.50s.");

        let err: StripError = VideoError::InvalidParameters {
            details: "strip_width must be positive".to_string(),
        }
        .into();
        assert_eq!(
            err.user_message(),
            "Video error: Invalid video parameters: strip_width must be positive"
        );
    }

    #[test]
    fn test_no_source_message() {
        let err: StripError = ColorError::NoSource.into();
        assert_eq!(err.user_message(), "No image source was given.");
        assert_eq!(ColorError::NoSource.to_string(), "No source to image");
    }
}
