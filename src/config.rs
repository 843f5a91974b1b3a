use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result, StripError},
    strip::ImageFormat,
};

/// Main configuration for story-strip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Strip output settings
    pub strip: StripConfig,

    /// External decoder settings
    pub decoder: DecoderConfig,

    /// Base color sampling settings
    pub color: ColorConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ConfigError::FileNotFound { path: path.display().to_string() }.into()
            }
            _ => StripError::Io(e),
        })?;

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
        self.strip.validate()?;
        self.decoder.validate()?;
        self.color.validate()?;
        Ok(())
    }
}

/// Strip output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Default strip width in pixels
    pub width: u32,

    /// Default strip height in pixels
    pub height: u32,

    /// Encoded image format
    pub format: ImageFormat,

    /// JPEG quality (1-100), ignored for PNG
    pub jpeg_quality: u8,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 60,
            format: ImageFormat::Png,
            jpeg_quality: 85,
        }
    }
}

impl StripConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "strip.size".to_string(),
                value: format!("{}x{}", self.width, self.height)
            }.into());
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                key: "strip.jpeg_quality".to_string(),
                value: self.jpeg_quality.to_string()
            }.into());
        }

        Ok(())
    }
}

/// External decoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// ffmpeg executable used for frame extraction
    pub ffmpeg_path: String,

    /// ffprobe executable used for metadata
    pub ffprobe_path: String,

    /// Ask ffmpeg for hardware accelerated decoding
    pub hwaccel: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            hwaccel: false,
        }
    }
}

impl DecoderConfig {
    fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "decoder.ffmpeg_path".to_string(),
                value: self.ffmpeg_path.clone()
            }.into());
        }

        if self.ffprobe_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "decoder.ffprobe_path".to_string(),
                value: self.ffprobe_path.clone()
            }.into());
        }

        Ok(())
    }
}

/// Base color sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Width the image is shrunk to before sampling
    pub sample_width: u32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self { sample_width: 10 }
    }
}

impl ColorConfig {
    fn validate(&self) -> Result<()> {
        if self.sample_width == 0 {
            return Err(ConfigError::InvalidValue {
                key: "color.sample_width".to_string(),
                value: self.sample_width.to_string()
            }.into());
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
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.strip.format = ImageFormat::Jpeg;
        original_config.decoder.hwaccel = true;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.strip.width, 300);
        assert_eq!(loaded_config.strip.format, ImageFormat::Jpeg);
        assert!(loaded_config.decoder.hwaccel);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[strip]\nwidth = 640\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.strip.width, 640);
        assert_eq!(config.strip.height, 60);
        assert_eq!(config.decoder.ffmpeg_path, "ffmpeg");
        assert_eq!(config.color.sample_width, 10);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/definitely/not/here.toml");
        assert!(matches!(
            result,
            Err(crate::error::StripError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_unreadable_file_is_an_io_error() {
        // A directory exists but cannot be read as a file
        let dir = tempdir().unwrap();
        let result = Config::from_file(dir.path());
        assert!(matches!(result, Err(StripError::Io(_))));
    }

    #[test]
    fn test_invalid_strip_size() {
        let mut config = Config::default();
        config.strip.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_jpeg_quality() {
        let mut config = Config::default();
        config.strip.jpeg_quality = 0;
        assert!(config.validate().is_err());
    }
}
