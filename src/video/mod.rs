//! # Video Module
//!
//! Media descriptors, decoded frames and the loaders that turn a source
//! into seekable frames.

pub mod types;
pub mod loader;
pub mod ffmpeg;

pub use types::{Element, Frame, Resource};
pub use loader::{VideoHandle, VideoLoader};
pub use ffmpeg::{FfmpegLoader, FfmpegVideo, VideoMetadata};
