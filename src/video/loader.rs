//! Seams between the strip generator and whatever decodes video.
//!
//! The generator only needs three things from a video: load it, seek it,
//! and read the frame that is currently showing. Keeping those behind
//! traits lets tests drive the generator with deterministic frames.

use async_trait::async_trait;

use crate::error::Result;
use crate::video::types::Frame;

/// Opens media sources and hands back ready-to-draw handles
#[async_trait]
pub trait VideoLoader: Send + Sync {
    type Handle: VideoHandle;

    /// Load `src` and resolve once its metadata is known
    ///
    /// Failures (unreachable source, unreadable container) are returned
    /// as-is; no retries are attempted.
    async fn preload(&self, src: &str) -> Result<Self::Handle>;
}

/// A loaded video that can be positioned and read one frame at a time
///
/// Seeking takes `&mut self`, so a handle can never have two seeks in
/// flight.
#[async_trait]
pub trait VideoHandle: Send {
    /// Duration in seconds
    fn duration(&self) -> f64;

    /// Native pixel size of the decoded stream
    fn native_size(&self) -> (u32, u32);

    /// Size frames are scaled to before they are returned by [`frame`](Self::frame)
    fn set_display_size(&mut self, width: u32, height: u32);

    /// Position the video at `time` seconds and wait until that frame is readable
    async fn seek(&mut self, time: f64) -> Result<()>;

    /// Frame at the last successful seek, `None` before the first seek
    fn frame(&self) -> Option<&Frame>;
}
