use super::Mask;
use image::{Rgb, RgbImage};

/// Blend `frame` against `background`, weighting each pixel by the mask.
///
/// A mask value of 0 keeps the live pixel, 255 substitutes the background
/// pixel, and intermediate values mix the two. Channels are accumulated in
/// f32, rounded, and clamped back to [0, 255], so the identity cases are
/// exact. All three inputs must share dimensions; the pipeline guarantees
/// this by capturing the background from the same source as live frames.
pub fn composite(frame: &RgbImage, mask: &Mask, background: &RgbImage) -> RgbImage {
    assert_eq!(
        frame.dimensions(),
        background.dimensions(),
        "frame and background dimensions differ"
    );
    assert_eq!(
        frame.dimensions(),
        mask.dimensions(),
        "frame and mask dimensions differ"
    );

    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let alpha = mask.get_pixel(x, y)[0] as f32 / 255.0;
        let live = frame.get_pixel(x, y);
        let still = background.get_pixel(x, y);

        Rgb([
            blend(live[0], still[0], alpha),
            blend(live[1], still[1], alpha),
            blend(live[2], still[2], alpha),
        ])
    })
}

fn blend(live: u8, still: u8, alpha: f32) -> u8 {
    let mixed = live as f32 * (1.0 - alpha) + still as f32 * alpha;
    mixed.round().clamp(0.0, 255.0) as u8
}
