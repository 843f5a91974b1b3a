use image::{imageops::FilterType, ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// A single decoded video frame
///
/// Thin wrapper around an RGB image buffer with the few pixel accessors
/// the strip and color code need.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Resize to the given display size
    ///
    /// Uses Lanczos3, which keeps thumbnails sharp when shrinking large
    /// sources. Returns `self` unchanged when the size already matches.
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.width() == width && self.height() == height {
            return self;
        }
        let resized = image::imageops::resize(&self.buffer, width, height, FilterType::Lanczos3);
        Self::new(resized)
    }
}

/// Placement of a video element on the story canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Display width of the element
    pub width: f64,

    /// Display height of the element
    pub height: f64,

    /// Zoom factor, 1.0 shows the media at cover size
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Horizontal focal point (0-100)
    #[serde(default = "default_focal")]
    pub focal_x: f64,

    /// Vertical focal point (0-100)
    #[serde(default = "default_focal")]
    pub focal_y: f64,
}

fn default_scale() -> f64 {
    1.0
}

fn default_focal() -> f64 {
    50.0
}

impl Element {
    /// Element centred on the media at scale 1
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: default_scale(),
            focal_x: default_focal(),
            focal_y: default_focal(),
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_focal(mut self, focal_x: f64, focal_y: f64) -> Self {
        self.focal_x = focal_x;
        self.focal_y = focal_y;
        self
    }
}

/// A playable media resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Path or URL the decoder can open
    pub src: String,

    /// Duration in seconds
    pub length: f64,

    /// Native pixel width
    pub width: u32,

    /// Native pixel height
    pub height: u32,
}

impl Resource {
    pub fn new<S: Into<String>>(src: S, length: f64, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            length,
            width,
            height,
        }
    }

    /// Native aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_resize_keeps_same_size() {
        let frame = Frame::new_filled(4, 2, [10, 20, 30]);
        let resized = frame.clone().resized(4, 2);
        assert_eq!(resized, frame);

        let resized = frame.resized(8, 4);
        assert_eq!((resized.width(), resized.height()), (8, 4));
        assert_eq!(resized.get_pixel(3, 1), [10, 20, 30]);
    }

    #[test]
    fn test_element_defaults_from_json() {
        let element: Element = serde_json::from_str(r#"{"width": 100, "height": 50}"#).unwrap();
        assert_eq!(element, Element::new(100.0, 50.0));

        let element: Element = serde_json::from_str(
            r#"{"width": 100, "height": 50, "scale": 2, "focalX": 10, "focalY": 90}"#,
        )
        .unwrap();
        assert_eq!(element.scale, 2.0);
        assert_eq!(element.focal_x, 10.0);
        assert_eq!(element.focal_y, 90.0);
    }
}
