//! # Base Color
//!
//! Picks the dominant color of an image or of a video's first frame. The
//! media is shrunk to a handful of pixels first, so the result reflects
//! broad areas of color rather than detail.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ColorError, Result};
use crate::video::loader::{VideoHandle, VideoLoader};
use crate::video::types::Frame;

/// Hex color reported for images with nothing but near-white pixels
pub const WHITE: &str = "#ffffff";

/// Channel value above which a pixel counts as white and is ignored
const WHITE_THRESHOLD: u8 = 250;

/// Bits dropped from each channel when grouping similar colors
const QUANTIZE_SHIFT: u8 = 3;

/// Dominant color of `src` as `#rrggbb`
///
/// `src` is loaded through `loader`, scaled to `sample_width` pixels wide
/// (aspect ratio kept) and its first frame is sampled.
pub async fn get_media_base_color<L: VideoLoader>(
    loader: &L,
    src: &str,
    sample_width: u32,
) -> Result<String> {
    if src.trim().is_empty() {
        return Err(ColorError::NoSource.into());
    }

    let mut media = loader.preload(src).await?;
    let (width, height) = media.native_size();
    let sample_width = sample_width.max(1);
    let sample_height = if width == 0 {
        1
    } else {
        ((sample_width as f64 * height as f64 / width as f64).round() as u32).max(1)
    };

    media.set_display_size(sample_width, sample_height);
    media.seek(0.0).await?;
    let frame = media.frame().ok_or_else(|| ColorError::SampleFailed {
        src: src.to_string(),
        reason: "no frame decoded at 0s".to_string(),
    })?;

    let color = match dominant_color(frame) {
        Some(rgb) => to_hex(rgb),
        None => {
            debug!("Only white pixels in {}, using {}", src, WHITE);
            WHITE.to_string()
        }
    };

    debug!("Base color of {}: {}", src, color);
    Ok(color)
}

#[derive(Default)]
struct Bucket {
    count: u32,
    sum: [u32; 3],
}

/// Mean color of the most populated quantized color bucket
///
/// Returns `None` when every pixel is near-white.
pub fn dominant_color(frame: &Frame) -> Option<[u8; 3]> {
    let mut buckets: HashMap<[u8; 3], Bucket> = HashMap::new();

    for pixel in frame.as_image().pixels() {
        let rgb = pixel.0;
        if rgb.iter().all(|&c| c > WHITE_THRESHOLD) {
            continue;
        }

        let key = rgb.map(|c| c >> QUANTIZE_SHIFT);
        let bucket = buckets.entry(key).or_default();
        bucket.count += 1;
        for (sum, &c) in bucket.sum.iter_mut().zip(rgb.iter()) {
            *sum += c as u32;
        }
    }

    // Ties go to the darker bucket so the answer does not depend on hash order
    let (_, bucket) = buckets
        .into_iter()
        .max_by(|(key_a, a), (key_b, b)| a.count.cmp(&b.count).then_with(|| key_b.cmp(key_a)))?;

    let mean = bucket.sum.map(|sum| ((sum as f64) / (bucket.count as f64)).round() as u8);
    Some(mean)
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::tempdir;

    use super::*;
    use crate::error::StripError;
    use crate::video::FfmpegLoader;

    /// Loader whose media never produces a frame
    struct BlankLoader;

    struct BlankMedia;

    #[async_trait]
    impl VideoLoader for BlankLoader {
        type Handle = BlankMedia;

        async fn preload(&self, _src: &str) -> Result<BlankMedia> {
            Ok(BlankMedia)
        }
    }

    #[async_trait]
    impl VideoHandle for BlankMedia {
        fn duration(&self) -> f64 {
            0.0
        }

        fn native_size(&self) -> (u32, u32) {
            (16, 9)
        }

        fn set_display_size(&mut self, _width: u32, _height: u32) {}

        async fn seek(&mut self, _time: f64) -> Result<()> {
            Ok(())
        }

        fn frame(&self) -> Option<&Frame> {
            None
        }
    }

    #[test]
    fn test_uniform_frame() {
        let frame = Frame::new_filled(10, 6, [255, 0, 0]);
        assert_eq!(dominant_color(&frame), Some([255, 0, 0]));
        assert_eq!(to_hex([255, 0, 0]), "#ff0000");
    }

    #[test]
    fn test_majority_color_wins_and_is_averaged() {
        let mut frame = Frame::new_filled(4, 4, [0, 0, 200]);
        // A near-identical shade lands in the same bucket
        frame.set_pixel(0, 0, [0, 0, 202]);
        for x in 0..4 {
            frame.set_pixel(x, 3, [240, 10, 10]);
        }

        let color = dominant_color(&frame).unwrap();
        assert_eq!(color[0], 0);
        assert_eq!(color[2], 200);
    }

    #[test]
    fn test_white_pixels_are_ignored() {
        let mut frame = Frame::new_filled(5, 5, [255, 255, 255]);
        frame.set_pixel(2, 2, [30, 60, 90]);
        assert_eq!(dominant_color(&frame), Some([30, 60, 90]));

        let white = Frame::new_filled(5, 5, [252, 253, 255]);
        assert_eq!(dominant_color(&white), None);
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected() {
        let loader = FfmpegLoader::default();
        let result = get_media_base_color(&loader, "", 10).await;
        assert!(matches!(
            result,
            Err(StripError::Color(ColorError::NoSource))
        ));
    }

    #[tokio::test]
    async fn test_missing_frame_is_a_sample_failure() {
        let result = get_media_base_color(&BlankLoader, "poster.png", 10).await;
        match result {
            Err(StripError::Color(ColorError::SampleFailed { src, .. })) => {
                assert_eq!(src, "poster.png");
            }
            other => panic!("expected SampleFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_base_color_of_image_file() {
        let dir = tempdir().unwrap();
        let green = dir.path().join("green.png");
        Frame::new_filled(40, 20, [20, 180, 40]).as_image().save(&green).unwrap();
        let white = dir.path().join("white.png");
        Frame::new_filled(40, 20, [255, 255, 255]).as_image().save(&white).unwrap();

        let loader = FfmpegLoader::default();
        let color = get_media_base_color(&loader, green.to_str().unwrap(), 10).await.unwrap();
        assert_eq!(color, "#14b428");

        let color = get_media_base_color(&loader, white.to_str().unwrap(), 10).await.unwrap();
        assert_eq!(color, WHITE);
    }
}
