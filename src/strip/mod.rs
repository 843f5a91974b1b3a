//! # Strip Module
//!
//! Turns a video element into a filmstrip image: slot layout and crop
//! geometry, the drawing surface the frames are blitted onto, and the
//! generator that drives seeking and drawing.

pub mod layout;
pub mod surface;
pub mod generator;

pub use layout::{compute_crop_window, sample_times, CropWindow, FrameLayout};
pub use surface::{DrawingSurface, ImageFormat, Rect};
pub use generator::{StripRequest, VideoStripGenerator};
