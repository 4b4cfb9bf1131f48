use image::RgbImage;

/// Largest valid hue. Hue is cyclic: 0 and `HUE_MAX` are neighbors.
pub const HUE_MAX: u8 = 179;

/// Default half-width of the hue interval around a picked color.
pub const DEFAULT_TOLERANCE: u8 = 20;

/// Lower bound applied to saturation and value so that near-grey and
/// near-black pixels never match, keeping selection hue-driven.
pub const SAT_VAL_FLOOR: u8 = 50;

/// An inclusive HSV selection range.
///
/// `lower[0] > upper[0]` marks a range that crosses the hue boundary; its
/// hue membership is the union of `[0, upper[0]]` and `[lower[0], HUE_MAX]`.
/// Saturation and value bounds are linear and shared by both sub-intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    /// Build a range centered on `hue` with `tolerance` on either side.
    ///
    /// A tolerance of 90 or more covers the whole hue circle.
    pub fn around(hue: u8, tolerance: u8) -> Self {
        if tolerance >= 90 {
            return Self {
                lower: [0, SAT_VAL_FLOOR, SAT_VAL_FLOOR],
                upper: [HUE_MAX, 255, 255],
            };
        }

        let span = HUE_MAX as i16 + 1;
        let lower_hue = (hue as i16 - tolerance as i16).rem_euclid(span) as u8;
        let upper_hue = ((hue as i16 + tolerance as i16) % span) as u8;

        Self {
            lower: [lower_hue, SAT_VAL_FLOOR, SAT_VAL_FLOOR],
            upper: [upper_hue, 255, 255],
        }
    }

    /// Sample the pixel at (`x`, `y`) and build a range around its hue.
    /// Coordinates are clamped to the frame.
    pub fn from_click(frame: &RgbImage, x: u32, y: u32, tolerance: u8) -> Self {
        let (width, height) = frame.dimensions();
        let px = frame.get_pixel(x.min(width - 1), y.min(height - 1));
        let (h, _, _) = rgb_to_hsv(px[0], px[1], px[2]);
        Self::around(h, tolerance)
    }

    /// Whether the hue interval crosses the cyclic boundary.
    pub fn wraps(&self) -> bool {
        self.lower[0] > self.upper[0]
    }

    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        let hue_ok = if self.wraps() {
            h <= self.upper[0] || h >= self.lower[0]
        } else {
            h >= self.lower[0] && h <= self.upper[0]
        };

        hue_ok
            && s >= self.lower[1]
            && s <= self.upper[1]
            && v >= self.lower[2]
            && v <= self.upper[2]
    }
}

/// Converts an RGB triple to HSV with hue in [0, 180) and saturation/value
/// scaled to [0, 255].
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };
    let h_byte = ((h / 2.0).round() as u16 % 180) as u8;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let s_byte = (s * 255.0).round() as u8;
    let v_byte = (max * 255.0).round() as u8;

    (h_byte, s_byte, v_byte)
}
