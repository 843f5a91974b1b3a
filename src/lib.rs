//! # story-strip
//!
//! Generate filmstrip thumbnails for video elements: evenly spaced frames
//! sampled across a video, each cropped the way the element shows it, laid
//! out left to right in a single image.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use story_strip::{
//!     strip::VideoStripGenerator,
//!     video::{Element, FfmpegLoader, Resource},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let generator = VideoStripGenerator::new(FfmpegLoader::default());
//!
//! let element = Element::new(100.0, 50.0).with_focal(40.0, 50.0);
//! let resource = Resource::new("clip.mp4", 12.5, 1280, 720);
//!
//! let data_url = generator.generate(&element, &resource, 300, 60).await?;
//! assert!(data_url.starts_with("data:image/png;base64,"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`strip`] - layout math, drawing surface and the strip generator
//! - [`video`] - media descriptors, frames and the loader traits
//! - [`color`] - dominant color sampling
//! - [`config`] - configuration management
//!
//! ## Custom Loaders
//!
//! Anything that can seek and hand back frames can feed the generator by
//! implementing [`VideoLoader`](video::VideoLoader) and
//! [`VideoHandle`](video::VideoHandle).

pub mod color;
pub mod config;
pub mod error;
pub mod strip;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{Result, StripError},
    strip::{StripRequest, VideoStripGenerator},
    video::{Element, FfmpegLoader, Resource},
};
