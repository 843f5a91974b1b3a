use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::task;
use tracing::{debug, info};

use crate::config::DecoderConfig;
use crate::error::{Result, VideoError};
use crate::video::loader::{VideoHandle, VideoLoader};
use crate::video::types::Frame;

/// Stream metadata reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

/// Video loader backed by the external `ffmpeg`/`ffprobe` tools
///
/// Still images are accepted too and behave like a one-frame video of
/// zero length.
#[derive(Debug, Clone, Default)]
pub struct FfmpegLoader {
    config: DecoderConfig,
}

impl FfmpegLoader {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Check whether the configured ffmpeg binary runs
    pub async fn check_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn probe(&self, src: &str) -> Result<VideoMetadata> {
        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v", "error",
                "-print_format", "json",
                "-show_streams",
                "-show_format",
                "-select_streams", "v:0",
                src,
            ])
            .output()
            .await
            .map_err(|e| VideoError::LoadFailed {
                src: src.to_string(),
                reason: format!("ffprobe execution failed: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::LoadFailed {
                src: src.to_string(),
                reason: stderr.trim().to_string(),
            }.into());
        }

        parse_probe_output(src, &output.stdout)
    }

    async fn load_still(&self, src: &str) -> Result<FfmpegVideo> {
        let path = src.to_string();
        let image = task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| VideoError::LoadFailed {
                src: src.to_string(),
                reason: format!("image loader panicked: {}", e),
            })?
            .map_err(|e| VideoError::LoadFailed {
                src: src.to_string(),
                reason: e.to_string(),
            })?;

        let still = Frame::new(image.to_rgb8());
        let metadata = VideoMetadata {
            duration: 0.0,
            fps: 1.0,
            width: still.width(),
            height: still.height(),
            codec: "image".to_string(),
        };

        Ok(FfmpegVideo::new(src, metadata, self.config.clone(), Some(still)))
    }
}

#[async_trait]
impl VideoLoader for FfmpegLoader {
    type Handle = FfmpegVideo;

    async fn preload(&self, src: &str) -> Result<FfmpegVideo> {
        if is_image_source(src) {
            debug!("Loading still image as single-frame video: {}", src);
            return self.load_still(src).await;
        }

        let metadata = self.probe(src).await?;
        info!(
            "Video metadata: {}x{} @ {:.1}fps, {:.2}s ({})",
            metadata.width, metadata.height, metadata.fps, metadata.duration, metadata.codec
        );

        Ok(FfmpegVideo::new(src, metadata, self.config.clone(), None))
    }
}

/// A probed video, decoded one frame per seek
pub struct FfmpegVideo {
    src: String,
    metadata: VideoMetadata,
    config: DecoderConfig,
    display_size: Option<(u32, u32)>,
    still: Option<Frame>,
    current: Option<Frame>,
}

impl FfmpegVideo {
    fn new(src: &str, metadata: VideoMetadata, config: DecoderConfig, still: Option<Frame>) -> Self {
        Self {
            src: src.to_string(),
            metadata,
            config,
            display_size: None,
            still,
            current: None,
        }
    }

    /// Timestamp ffmpeg will actually decode for a requested `time`
    ///
    /// Seeking at or past the end yields no frame from ffmpeg, so the
    /// target is pulled back to the start of the last frame.
    fn clamp_seek_time(&self, time: f64) -> f64 {
        let last_frame = (self.metadata.duration - 1.0 / self.metadata.fps.max(1.0)).max(0.0);
        time.clamp(0.0, last_frame)
    }

    async fn decode_frame_at(&self, time: f64) -> Result<Frame> {
        let mut cmd = Command::new(&self.config.ffmpeg_path);
        if self.config.hwaccel {
            cmd.args(["-hwaccel", "auto"]);
        }
        cmd.args([
            "-v", "error",
            "-ss", &format!("{:.6}", time),
            "-i", &self.src,
            "-frames:v", "1",
            "-f", "image2pipe",
            "-vcodec", "png",
            "-",
        ]);

        let output = cmd.output().await.map_err(|e| VideoError::SeekFailed {
            time,
            reason: format!("ffmpeg execution failed: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::SeekFailed {
                time,
                reason: stderr.trim().to_string(),
            }.into());
        }

        if output.stdout.is_empty() {
            return Err(VideoError::SeekFailed {
                time,
                reason: "no frame decoded".to_string(),
            }.into());
        }

        let bytes = output.stdout;
        let image = task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| VideoError::DecodingFailed { reason: e.to_string() })?
            .map_err(|e| VideoError::DecodingFailed { reason: e.to_string() })?;

        Ok(Frame::new(image.to_rgb8()))
    }
}

#[async_trait]
impl VideoHandle for FfmpegVideo {
    fn duration(&self) -> f64 {
        self.metadata.duration
    }

    fn native_size(&self) -> (u32, u32) {
        (self.metadata.width, self.metadata.height)
    }

    fn set_display_size(&mut self, width: u32, height: u32) {
        self.display_size = Some((width.max(1), height.max(1)));
    }

    async fn seek(&mut self, time: f64) -> Result<()> {
        let frame = match &self.still {
            Some(still) => still.clone(),
            None => {
                let target = self.clamp_seek_time(time);
                debug!("Seeking {} to {:.3}s (requested {:.3}s)", self.src, target, time);
                self.decode_frame_at(target).await?
            }
        };

        let frame = match self.display_size {
            Some((width, height)) => task::spawn_blocking(move || frame.resized(width, height))
                .await
                .map_err(|e| VideoError::DecodingFailed { reason: e.to_string() })?,
            None => frame,
        };

        self.current = Some(frame);
        Ok(())
    }

    fn frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    avg_frame_rate: Option<String>,
    codec_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output
fn parse_probe_output(src: &str, stdout: &[u8]) -> Result<VideoMetadata> {
    let probe: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| VideoError::LoadFailed {
        src: src.to_string(),
        reason: format!("invalid ffprobe output: {}", e),
    })?;

    let stream = probe.streams.into_iter().next().ok_or_else(|| VideoError::LoadFailed {
        src: src.to_string(),
        reason: "no video stream".to_string(),
    })?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(VideoError::LoadFailed {
                src: src.to_string(),
                reason: "video stream has no dimensions".to_string(),
            }.into())
        }
    };

    // Stream duration is missing for some containers (webm), fall back to the format's
    let duration = stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(|d| d.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .unwrap_or(30.0);

    Ok(VideoMetadata {
        duration,
        fps,
        width,
        height,
        codec: stream.codec_name.unwrap_or_else(|| "unknown".to_string()),
    })
}

/// Parse an ffprobe rational such as `30000/1001`
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

/// Whether `src` names a still image rather than a video
pub fn is_image_source(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    matches!(
        Path::new(path).extension().and_then(|ext| ext.to_str()),
        Some(ext) if matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "bmp" | "gif" | "tiff" | "webp"
        )
    )
}
