use tracing::{debug, info, instrument};

use crate::config::StripConfig;
use crate::error::{Result, VideoError};
use crate::strip::layout::{compute_crop_window, sample_times, FrameLayout};
use crate::strip::surface::{DrawingSurface, ImageFormat, Rect};
use crate::video::loader::{VideoHandle, VideoLoader};
use crate::video::types::{Element, Resource};

/// Everything needed to build one strip
#[derive(Debug, Clone, PartialEq)]
pub struct StripRequest {
    pub element: Element,
    pub resource: Resource,
    pub strip_width: u32,
    pub strip_height: u32,
}

impl StripRequest {
    pub fn new(element: Element, resource: Resource, strip_width: u32, strip_height: u32) -> Self {
        Self {
            element,
            resource,
            strip_width,
            strip_height,
        }
    }

    /// Reject geometry that would make the layout divide by zero or
    /// squeeze frames into slots narrower than one pixel
    pub fn validate(&self) -> Result<()> {
        let element = &self.element;
        if !(element.width > 0.0 && element.height > 0.0) {
            return Err(invalid(format!(
                "element size must be positive, got {}x{}",
                element.width, element.height
            )));
        }

        if !(element.scale.is_finite() && element.scale > 0.0) {
            return Err(invalid(format!("element scale must be positive, got {}", element.scale)));
        }

        if self.strip_width == 0 || self.strip_height == 0 {
            return Err(invalid(format!(
                "strip size must be positive, got {}x{}",
                self.strip_width, self.strip_height
            )));
        }

        // Saturates to u32::MAX for degenerate elements, which fails the bound too
        let layout = FrameLayout::compute(element, self.strip_width, self.strip_height);
        if layout.frame_count > self.strip_width {
            return Err(invalid(format!(
                "{}x{} element needs {} frames, more than the {}px strip has pixels",
                element.width, element.height, layout.frame_count, self.strip_width
            )));
        }

        if !(self.resource.length.is_finite() && self.resource.length >= 0.0) {
            return Err(invalid(format!(
                "resource length must be a non-negative number, got {}",
                self.resource.length
            )));
        }

        Ok(())
    }
}

fn invalid(details: String) -> crate::error::StripError {
    VideoError::InvalidParameters { details }.into()
}

/// Builds filmstrip thumbnails by sampling frames evenly across a video
///
/// Each frame is cropped exactly like the element displays it (scale and
/// focal point included) and the frames are laid left to right in equal
/// slots that cover the whole strip.
pub struct VideoStripGenerator<L> {
    loader: L,
    format: ImageFormat,
    jpeg_quality: u8,
}

impl<L: VideoLoader> VideoStripGenerator<L> {
    /// Generator producing PNG data URLs
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            format: ImageFormat::Png,
            jpeg_quality: 85,
        }
    }

    pub fn with_config(loader: L, config: &StripConfig) -> Self {
        Self {
            loader,
            format: config.format,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Generate the strip and return it as an image data URL
    pub async fn generate(
        &self,
        element: &Element,
        resource: &Resource,
        strip_width: u32,
        strip_height: u32,
    ) -> Result<String> {
        let request = StripRequest::new(element.clone(), resource.clone(), strip_width, strip_height);
        let surface = self.render(&request).await?;
        surface.to_data_url(self.format, self.jpeg_quality)
    }

    /// Draw the strip for `request` and return the raw surface
    ///
    /// Seeks run one after another on a single handle. The first preload or
    /// seek failure is returned unchanged and nothing is encoded.
    #[instrument(skip_all, fields(src = %request.resource.src))]
    pub async fn render(&self, request: &StripRequest) -> Result<DrawingSurface> {
        request.validate()?;

        let element = &request.element;
        let layout = FrameLayout::compute(element, request.strip_width, request.strip_height);
        let timestamps = sample_times(request.resource.length, layout.frame_count);

        info!(
            "Generating {}x{} strip with {} frames from {:.2}s of video",
            request.strip_width, request.strip_height, layout.frame_count, request.resource.length
        );

        let mut video = self.loader.preload(&request.resource.src).await?;

        // Unknown native size falls back to what the decoder reports
        let mut resource = request.resource.clone();
        if resource.width == 0 || resource.height == 0 {
            let (width, height) = video.native_size();
            resource.width = width;
            resource.height = height;
        }

        let crop = compute_crop_window(
            &resource,
            layout.actual_frame_width,
            element.height,
            element.scale,
            element.focal_x,
            element.focal_y,
        );
        debug!(
            "Crop window {:.1}x{:.1} at ({:.1}, {:.1})",
            crop.width, crop.height, crop.offset_x, crop.offset_y
        );

        video.set_display_size(
            crop.width.round().max(1.0) as u32,
            crop.height.round().max(1.0) as u32,
        );

        let mut surface = DrawingSurface::new(request.strip_width, request.strip_height)?;
        let source = Rect::new(crop.offset_x, crop.offset_y, layout.actual_frame_width, element.height);

        for (index, &time) in (0u32..).zip(timestamps.iter()) {
            video.seek(time).await?;

            let frame = video.frame().ok_or_else(|| VideoError::DecodingFailed {
                reason: format!("no frame available after seeking to {:.3}s", time),
            })?;

            let slot = Rect::new(
                layout.slot_x(index),
                0.0,
                layout.actual_strip_frame_width,
                layout.strip_frame_height,
            );
            surface.draw_scaled_region(frame, source, slot);
            debug!("Drew frame {}/{} at {:.3}s", index + 1, layout.frame_count, time);
        }

        Ok(surface)
    }
}
