use super::color::{rgb_to_hsv, ColorRange};
use super::Mask;
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};

/// Structuring element radius per morphology pass (2 -> 5x5 square).
pub const DEFAULT_MORPH_RADIUS: u8 = 2;

/// Number of closing/opening passes.
pub const DEFAULT_MORPH_PASSES: u8 = 2;

/// Blur sigma matching a 15x15 Gaussian kernel with auto sigma.
pub const DEFAULT_BLUR_SIGMA: f32 = 2.6;

/// Builds a smoothed opacity mask of pixels matching a [`ColorRange`].
///
/// The raw threshold result is closed (fills pinholes inside the selected
/// region), opened (drops isolated specks outside it), then blurred so the
/// compositor gets soft edges instead of a hard cutout. Output values stay
/// at 0 or 255 except within roughly half the blur kernel of a mask edge.
#[derive(Clone, Copy, Debug)]
pub struct MaskBuilder {
    morph_radius: u8,
    morph_passes: u8,
    blur_sigma: f32,
}

impl Default for MaskBuilder {
    fn default() -> Self {
        Self {
            morph_radius: DEFAULT_MORPH_RADIUS,
            morph_passes: DEFAULT_MORPH_PASSES,
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }
}

impl MaskBuilder {
    pub fn new(morph_radius: u8, morph_passes: u8, blur_sigma: f32) -> Self {
        Self {
            morph_radius,
            morph_passes,
            blur_sigma,
        }
    }

    /// Produce the opacity mask for `frame`. Output dimensions equal the
    /// frame's, and identical inputs always yield identical masks.
    pub fn build(&self, frame: &RgbImage, range: &ColorRange) -> Mask {
        let mut mask = self.threshold(frame, range);

        // N passes of a (2r+1)-square on a binary mask collapse into a
        // single pass with radius N*r.
        let k = self.morph_radius * self.morph_passes;
        if k > 0 {
            mask = close(&mask, Norm::LInf, k);
            mask = open(&mask, Norm::LInf, k);
        }

        if self.blur_sigma > 0.0 {
            mask = gaussian_blur_f32(&mask, self.blur_sigma);
        }

        mask
    }

    fn threshold(&self, frame: &RgbImage, range: &ColorRange) -> GrayImage {
        GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
            let px = frame.get_pixel(x, y);
            let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
            Luma([if range.contains(h, s, v) { 255 } else { 0 }])
        })
    }
}

/// Render a mask as a grayscale RGB frame for the debug view.
pub fn mask_to_rgb(mask: &Mask) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let value = mask.get_pixel(x, y)[0];
        image::Rgb([value, value, value])
    })
}
