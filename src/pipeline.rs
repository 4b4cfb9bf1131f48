use crate::cloak::{composite, mask_to_rgb, ColorRange, MaskBuilder};
use image::RgbImage;

/// Owns the mutable pipeline state: the currently selected color range and
/// the captured background. Both are only ever replaced between frame
/// iterations, so mask building and compositing always see a consistent
/// pair.
pub struct PipelineController {
    range: Option<ColorRange>,
    background: RgbImage,
    masker: MaskBuilder,
    tolerance: u8,
}

impl PipelineController {
    pub fn new(background: RgbImage, masker: MaskBuilder, tolerance: u8) -> Self {
        Self {
            range: None,
            background,
            masker,
            tolerance,
        }
    }

    /// Replace the selection with a range around the clicked pixel of
    /// `frame`. The last click always wins.
    ///
    /// The color is sampled from the frame being processed in the iteration
    /// that observes the click, which can be one tick newer than the frame
    /// that was on screen when the click happened.
    pub fn select_color(&mut self, frame: &RgbImage, x: u32, y: u32) {
        let range = ColorRange::from_click(frame, x, y, self.tolerance);
        tracing::info!(
            "Selected HSV range {:?} to {:?}",
            range.lower,
            range.upper
        );
        self.range = Some(range);
    }

    /// Wholesale replacement of the reference background.
    pub fn set_background(&mut self, background: RgbImage) {
        self.background = background;
    }

    /// Run one frame through the effect: mask, then composite against the
    /// background. Before any color is selected the frame passes through
    /// untouched.
    pub fn process(&self, frame: &RgbImage) -> RgbImage {
        match &self.range {
            Some(range) => {
                let mask = self.masker.build(frame, range);
                composite(frame, &mask, &self.background)
            }
            None => frame.clone(),
        }
    }

    /// Grayscale rendering of the current mask for the debug view. All
    /// black until a color is selected.
    pub fn mask_preview(&self, frame: &RgbImage) -> RgbImage {
        match &self.range {
            Some(range) => mask_to_rgb(&self.masker.build(frame, range)),
            None => RgbImage::new(frame.width(), frame.height()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    fn controller(background: RgbImage) -> PipelineController {
        PipelineController::new(background, MaskBuilder::default(), 20)
    }

    #[test]
    fn frames_pass_through_before_any_selection() {
        let background = RgbImage::from_pixel(8, 8, BLUE);
        let frame = RgbImage::from_pixel(8, 8, RED);

        let ctl = controller(background);
        assert_eq!(ctl.process(&frame).as_raw(), frame.as_raw());
    }

    #[test]
    fn matching_frame_is_cloaked_by_the_background() {
        let background = RgbImage::from_pixel(4, 4, BLUE);
        let frame = RgbImage::from_pixel(4, 4, RED);

        let mut ctl = controller(background.clone());
        ctl.select_color(&frame, 0, 0);

        let out = ctl.process(&frame);
        for (out_px, bg_px) in out.pixels().zip(background.pixels()) {
            for c in 0..3 {
                assert!((out_px[c] as i16 - bg_px[c] as i16).abs() <= 2);
            }
        }
    }

    #[test]
    fn non_matching_frame_is_untouched() {
        let background = RgbImage::from_pixel(8, 8, BLUE);
        let frame = RgbImage::from_pixel(8, 8, GREEN);
        let red_probe = RgbImage::from_pixel(8, 8, RED);

        let mut ctl = controller(background);
        ctl.select_color(&red_probe, 0, 0);

        assert_eq!(ctl.process(&frame).as_raw(), frame.as_raw());
    }

    #[test]
    fn last_click_wins() {
        let background = RgbImage::from_pixel(8, 8, BLUE);
        let mut frame = RgbImage::from_pixel(8, 8, RED);
        frame.put_pixel(0, 0, GREEN);

        let mut ctl = controller(background);
        ctl.select_color(&frame, 0, 0); // green
        ctl.select_color(&frame, 4, 4); // red replaces it

        let out = ctl.process(&RgbImage::from_pixel(8, 8, GREEN));
        assert_eq!(out.as_raw(), RgbImage::from_pixel(8, 8, GREEN).as_raw());
    }

    #[test]
    fn background_is_replaced_wholesale() {
        let first = RgbImage::from_pixel(4, 4, BLUE);
        let second = RgbImage::from_pixel(4, 4, GREEN);
        let frame = RgbImage::from_pixel(4, 4, RED);

        let mut ctl = controller(first);
        ctl.select_color(&frame, 0, 0);
        ctl.set_background(second.clone());

        let out = ctl.process(&frame);
        for (out_px, bg_px) in out.pixels().zip(second.pixels()) {
            for c in 0..3 {
                assert!((out_px[c] as i16 - bg_px[c] as i16).abs() <= 2);
            }
        }
    }

    #[test]
    fn mask_preview_is_black_without_a_selection() {
        let background = RgbImage::from_pixel(4, 4, BLUE);
        let frame = RgbImage::from_pixel(4, 4, RED);

        let ctl = controller(background);
        let preview = ctl.mask_preview(&frame);
        assert!(preview.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn mask_preview_saturates_on_a_matching_frame() {
        let background = RgbImage::from_pixel(16, 16, BLUE);
        let frame = RgbImage::from_pixel(16, 16, RED);

        let mut ctl = controller(background);
        ctl.select_color(&frame, 0, 0);

        let preview = ctl.mask_preview(&frame);
        assert!(preview.pixels().all(|p| p[0] >= 254));
    }
}
