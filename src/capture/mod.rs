mod webcam;

pub use webcam::WebcamCapture;

use image::RgbImage;
use thiserror::Error;

/// A single frame read failed. Non-fatal: the caller may retry on the next
/// loop tick.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("frame acquisition failed")]
    Acquisition(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("captured frame could not be decoded")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Trait for camera capture sources.
///
/// Implementations must return frames of constant dimensions for the
/// lifetime of a session.
pub trait FrameSource {
    /// Capture a single frame
    fn next_frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);
}
