mod background;
mod color;
mod compositor;
mod mask;

pub use background::{BackgroundEstimator, NoFramesCaptured};
pub use color::{ColorRange, DEFAULT_TOLERANCE};
pub use compositor::composite;
pub use mask::{mask_to_rgb, MaskBuilder};

use image::GrayImage;

/// Opacity mask: 0 keeps the live pixel, 255 substitutes the background.
/// Dimensions match the frame it was built from.
pub type Mask = GrayImage;
