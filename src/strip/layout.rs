use crate::video::types::{Element, Resource};

/// How a strip is divided into frame slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    /// Height of every slot, equal to the strip height
    pub strip_frame_height: f64,

    /// Slot width that would keep the element aspect ratio exactly
    pub strip_frame_width: f64,

    /// Number of slots, always at least 1
    pub frame_count: u32,

    /// Slot width after spreading the strip evenly over `frame_count` slots
    pub actual_strip_frame_width: f64,

    /// Element-space width of the source region drawn into one slot
    pub actual_frame_width: f64,
}

impl FrameLayout {
    /// Lay out `element` frames across a `strip_width x strip_height` strip
    ///
    /// The frame count is rounded up so the strip is always covered, then
    /// every slot is narrowed to an equal share of the strip. The source
    /// region is narrowed by the same factor so frames are cropped rather
    /// than squished.
    pub fn compute(element: &Element, strip_width: u32, strip_height: u32) -> Self {
        let strip_width = strip_width as f64;
        let strip_frame_height = strip_height as f64;
        let strip_frame_width = strip_frame_height * (element.width / element.height);

        let frame_count = ((strip_width / strip_frame_width).ceil() as u32).max(1);

        let actual_strip_frame_width = strip_width / frame_count as f64;
        let actual_frame_width = actual_strip_frame_width * (element.width / strip_frame_width);

        Self {
            strip_frame_height,
            strip_frame_width,
            frame_count,
            actual_strip_frame_width,
            actual_frame_width,
        }
    }

    /// Destination x of slot `index`
    pub fn slot_x(&self, index: u32) -> f64 {
        index as f64 * self.actual_strip_frame_width
    }
}

/// Region of the scaled media that is visible inside an element box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    /// Scaled media width
    pub width: f64,

    /// Scaled media height
    pub height: f64,

    /// Left edge of the visible box inside the scaled media
    pub offset_x: f64,

    /// Top edge of the visible box inside the scaled media
    pub offset_y: f64,
}

/// Size and position `resource` so it covers a `box_width x box_height` box
///
/// The media keeps its own aspect ratio and is scaled to cover the box,
/// then zoomed by `scale`. Offsets put the focal point (0-100 on each
/// axis) as close to the box centre as the media edges allow.
pub fn compute_crop_window(
    resource: &Resource,
    box_width: f64,
    box_height: f64,
    scale: f64,
    focal_x: f64,
    focal_y: f64,
) -> CropWindow {
    let box_ratio = box_width / box_height;
    let media_ratio = resource.aspect_ratio();

    let (cover_width, cover_height) = if media_ratio <= box_ratio {
        (box_width, box_width / media_ratio)
    } else {
        (box_height * media_ratio, box_height)
    };

    let width = cover_width * scale;
    let height = cover_height * scale;

    CropWindow {
        width,
        height,
        offset_x: media_offset(width, box_width, focal_x),
        offset_y: media_offset(height, box_height, focal_y),
    }
}

fn media_offset(media_size: f64, box_size: f64, focal: f64) -> f64 {
    let max_offset = (media_size - box_size).max(0.0);
    (media_size * focal / 100.0 - box_size / 2.0).clamp(0.0, max_offset)
}

/// Timestamps of `frame_count` frames spread evenly over `length` seconds
///
/// The first sample is at 0 and the last at exactly `length`. A single
/// frame is sampled at 0.
pub fn sample_times(length: f64, frame_count: u32) -> Vec<f64> {
    if frame_count <= 1 {
        return vec![0.0; frame_count as usize];
    }

    let last = frame_count - 1;
    let frame_distance = length / last as f64;
    (0..frame_count)
        .map(|i| if i == last { length } else { i as f64 * frame_distance })
        .collect()
}
