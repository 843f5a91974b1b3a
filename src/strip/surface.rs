use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::{ImageBuffer, ImageOutputFormat, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};
use crate::video::types::Frame;

/// Encoded image formats a surface can be written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Axis-aligned rectangle in fractional pixel units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Off-screen RGB canvas the strip is assembled on
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSurface {
    buffer: RgbImage,
}

impl DrawingSurface {
    /// Create a black surface
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidDimensions { width, height }.into());
        }
        Ok(Self { buffer: ImageBuffer::new(width, height) })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Draw the `src` region of `source` scaled into the `dst` region
    ///
    /// A surface pixel is written when its centre lies inside `dst`, so
    /// destination rectangles that share an edge never overlap or leave a
    /// gap. Source samples are bilinear and clamped to the source edges.
    pub fn draw_scaled_region(&mut self, source: &Frame, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() || source.width() == 0 || source.height() == 0 {
            return;
        }

        let width = self.width() as usize;
        let (x_start, x_end) = pixel_span(dst.x, dst.width, self.width());
        let (y_start, y_end) = pixel_span(dst.y, dst.height, self.height());
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        let x_step = src.width / dst.width;
        let y_step = src.height / dst.height;
        let source = source.as_image();
        let rows: &mut [u8] = &mut self.buffer;

        rows.par_chunks_mut(width * 3)
            .enumerate()
            .skip(y_start)
            .take(y_end - y_start)
            .for_each(|(py, row)| {
                let v = src.y + (py as f64 + 0.5 - dst.y) * y_step;
                for px in x_start..x_end {
                    let u = src.x + (px as f64 + 0.5 - dst.x) * x_step;
                    let color = sample_bilinear(source, u - 0.5, v - 0.5);
                    row[px * 3..px * 3 + 3].copy_from_slice(&color);
                }
            });
    }

    /// Encode the surface as image bytes
    pub fn encode(&self, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
        let output_format = match format {
            ImageFormat::Png => ImageOutputFormat::Png,
            ImageFormat::Jpeg => ImageOutputFormat::Jpeg(jpeg_quality.clamp(1, 100)),
        };

        let mut bytes = Vec::new();
        self.buffer
            .write_to(&mut Cursor::new(&mut bytes), output_format)
            .map_err(|e| SurfaceError::EncodingFailed { reason: e.to_string() })?;
        Ok(bytes)
    }

    /// Encode the surface as a base64 `data:` URL
    pub fn to_data_url(&self, format: ImageFormat, jpeg_quality: u8) -> Result<String> {
        let bytes = self.encode(format, jpeg_quality)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(format!("data:{};base64,{}", format.mime_type(), encoded))
    }

    /// Write the surface to a file, format chosen from the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.buffer
            .save(path.as_ref())
            .map_err(|e| SurfaceError::EncodingFailed {
                reason: format!("{}: {}", path.as_ref().display(), e),
            })?;
        Ok(())
    }
}

/// Pixel indices whose centres fall inside `[start, start + length)`
fn pixel_span(start: f64, length: f64, limit: u32) -> (usize, usize) {
    let first = (start - 0.5).ceil().max(0.0);
    let last = (start + length - 0.5).ceil().min(limit as f64);
    if last <= first {
        return (0, 0);
    }
    (first as usize, last as usize)
}

fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> [u8; 3] {
    let max_x = image.width() - 1;
    let max_y = image.height() - 1;
    let x = x.clamp(0.0, max_x as f64);
    let y = y.clamp(0.0, max_y as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn two_tone_frame() -> Frame {
        // Left half red, right half blue
        let mut frame = Frame::new_filled(8, 4, [255, 0, 0]);
        for y in 0..4 {
            for x in 4..8 {
                frame.set_pixel(x, y, [0, 0, 255]);
            }
        }
        frame
    }

    #[test]
    fn test_new_rejects_empty_surface() {
        assert!(DrawingSurface::new(0, 10).is_err());
        assert!(DrawingSurface::new(10, 0).is_err());
        let surface = DrawingSurface::new(3, 2).unwrap();
        assert_eq!(surface.pixel(2, 1), [0, 0, 0]);
    }

    #[test]
    fn test_pixel_span_partitions_adjacent_slots() {
        assert_eq!(pixel_span(0.0, 100.0, 300), (0, 100));
        assert_eq!(pixel_span(100.0, 100.0, 300), (100, 200));
        assert_eq!(pixel_span(200.0, 100.0, 300), (200, 300));

        // Fractional slots of a 10px strip split in 3
        let third = 10.0 / 3.0;
        let spans: Vec<_> = (0..3).map(|i| pixel_span(i as f64 * third, third, 10)).collect();
        assert_eq!(spans, vec![(0, 3), (3, 7), (7, 10)]);
    }

    #[test]
    fn test_draw_scaled_region_fills_destination_only() {
        let mut surface = DrawingSurface::new(6, 2).unwrap();
        let frame = Frame::new_filled(4, 4, [10, 200, 30]);

        surface.draw_scaled_region(&frame, Rect::new(0.0, 0.0, 4.0, 4.0), Rect::new(2.0, 0.0, 2.0, 2.0));

        for y in 0..2 {
            assert_eq!(surface.pixel(1, y), [0, 0, 0]);
            assert_eq!(surface.pixel(2, y), [10, 200, 30]);
            assert_eq!(surface.pixel(3, y), [10, 200, 30]);
            assert_eq!(surface.pixel(4, y), [0, 0, 0]);
        }
    }

    #[test]
    fn test_draw_scaled_region_crops_source() {
        let mut surface = DrawingSurface::new(4, 2).unwrap();
        let frame = two_tone_frame();

        // Only the blue half, stretched over the whole surface
        surface.draw_scaled_region(&frame, Rect::new(4.0, 0.0, 4.0, 4.0), Rect::new(0.0, 0.0, 4.0, 2.0));

        for x in 0..4 {
            assert_eq!(surface.pixel(x, 0), [0, 0, 255]);
        }
    }

    #[test]
    fn test_draw_clips_to_surface_bounds() {
        let mut surface = DrawingSurface::new(4, 4).unwrap();
        let frame = Frame::new_filled(2, 2, [9, 9, 9]);

        surface.draw_scaled_region(&frame, Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(2.0, 2.0, 10.0, 10.0));
        assert_eq!(surface.pixel(3, 3), [9, 9, 9]);
        assert_eq!(surface.pixel(1, 1), [0, 0, 0]);

        // Entirely outside, nothing happens
        surface.draw_scaled_region(&frame, Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(10.0, 0.0, 2.0, 2.0));
        assert_eq!(surface.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_png_data_url_decodes_back() {
        let mut surface = DrawingSurface::new(5, 3).unwrap();
        let frame = Frame::new_filled(1, 1, [1, 2, 3]);
        surface.draw_scaled_region(&frame, Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(0.0, 0.0, 5.0, 3.0));

        let url = surface.to_data_url(ImageFormat::Png, 85).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();

        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.get_pixel(4, 2).0, [1, 2, 3]);
    }

    #[test]
    fn test_jpeg_data_url_prefix() {
        let surface = DrawingSurface::new(8, 8).unwrap();
        let url = surface.to_data_url(ImageFormat::Jpeg, 70).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strip.png");
        let surface = DrawingSurface::new(4, 2).unwrap();

        surface.save(&path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), (4, 2));
    }
}
