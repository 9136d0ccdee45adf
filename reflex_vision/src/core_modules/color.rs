// THEORY:
// The `color` module defines the color space the detector works in. The two
// markers are identified purely by color class, and hue-saturation-value is
// the representation that makes those classes cheap to express: the boundary
// marker is "green-ish at any brightness", the target marker is "bright and
// desaturated", and neither of those is a box in RGB space.
//
// Key architectural principles:
// 1.  **OpenCV-Compatible Scale**: Hue lives in `0..=179` and saturation/value
//     in `0..=255`. The marker ranges were tuned against the game on that
//     scale, and keeping it means the tuned constants carry over verbatim.
// 2.  **Inclusive Box Ranges**: A `ColorRange` is an axis-aligned box with
//     inclusive bounds on every channel, matching the threshold semantics the
//     ranges were tuned for.

pub mod color {
    /// A pixel in hue-saturation-value space, on the OpenCV scale
    /// (`h` in `0..=179`, `s` and `v` in `0..=255`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Hsv {
        pub h: u8,
        pub s: u8,
        pub v: u8,
    }

    /// An inclusive lower/upper bound pair identifying one marker's color class.
    #[derive(Debug, Clone, Copy)]
    pub struct ColorRange {
        pub lower: Hsv,
        pub upper: Hsv,
    }

    /// The fixed, ring-shaped marker: green at any reasonable brightness.
    pub const BOUNDARY_MARKER: ColorRange = ColorRange {
        lower: Hsv { h: 40, s: 50, v: 50 },
        upper: Hsv {
            h: 80,
            s: 255,
            v: 255,
        },
    };

    /// The moving marker: bright, nearly desaturated white.
    pub const TARGET_MARKER: ColorRange = ColorRange {
        lower: Hsv { h: 0, s: 0, v: 200 },
        upper: Hsv {
            h: 180,
            s: 30,
            v: 255,
        },
    };

    impl ColorRange {
        pub fn contains(&self, hsv: Hsv) -> bool {
            self.lower.h <= hsv.h
                && hsv.h <= self.upper.h
                && self.lower.s <= hsv.s
                && hsv.s <= self.upper.s
                && self.lower.v <= hsv.v
                && hsv.v <= self.upper.v
        }
    }

    /// Converts an RGB triple to HSV on the OpenCV scale.
    pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
        let rf = r as f32 / 255.0;
        let gf = g as f32 / 255.0;
        let bf = b as f32 / 255.0;

        let max = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let delta = max - min;

        let v = (max * 255.0).round() as u8;
        let s = if max == 0.0 {
            0
        } else {
            ((delta / max) * 255.0).round() as u8
        };

        let mut h_degrees = if delta == 0.0 {
            0.0
        } else if max == rf {
            60.0 * ((gf - bf) / delta)
        } else if max == gf {
            60.0 * ((bf - rf) / delta) + 120.0
        } else {
            60.0 * ((rf - gf) / delta) + 240.0
        };
        if h_degrees < 0.0 {
            h_degrees += 360.0;
        }

        // Halved hue keeps the full circle inside a u8, like OpenCV does.
        let mut h = (h_degrees / 2.0).round() as u8;
        if h >= 180 {
            h -= 180;
        }

        Hsv { h, s, v }
    }
}

#[cfg(test)]
mod tests {
    use super::color::*;

    #[test]
    fn pure_green_is_hue_60() {
        let hsv = rgb_to_hsv(0, 255, 0);
        assert_eq!(hsv, Hsv { h: 60, s: 255, v: 255 });
    }

    #[test]
    fn pure_red_is_hue_0() {
        let hsv = rgb_to_hsv(255, 0, 0);
        assert_eq!(hsv, Hsv { h: 0, s: 255, v: 255 });
    }

    #[test]
    fn pure_blue_is_hue_120() {
        let hsv = rgb_to_hsv(0, 0, 255);
        assert_eq!(hsv, Hsv { h: 120, s: 255, v: 255 });
    }

    #[test]
    fn white_is_desaturated_and_bright() {
        let hsv = rgb_to_hsv(255, 255, 255);
        assert_eq!(hsv.s, 0);
        assert_eq!(hsv.v, 255);
    }

    #[test]
    fn black_has_zero_value() {
        let hsv = rgb_to_hsv(0, 0, 0);
        assert_eq!(hsv.v, 0);
    }

    #[test]
    fn boundary_range_matches_game_greens() {
        assert!(BOUNDARY_MARKER.contains(rgb_to_hsv(0, 255, 0)));
        assert!(BOUNDARY_MARKER.contains(rgb_to_hsv(40, 200, 60)));
        assert!(!BOUNDARY_MARKER.contains(rgb_to_hsv(255, 255, 255)));
        assert!(!BOUNDARY_MARKER.contains(rgb_to_hsv(0, 40, 0)));
    }

    #[test]
    fn target_range_matches_whites_but_not_greens() {
        assert!(TARGET_MARKER.contains(rgb_to_hsv(255, 255, 255)));
        assert!(TARGET_MARKER.contains(rgb_to_hsv(230, 235, 240)));
        assert!(!TARGET_MARKER.contains(rgb_to_hsv(0, 255, 0)));
        assert!(!TARGET_MARKER.contains(rgb_to_hsv(60, 60, 60)));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = ColorRange {
            lower: Hsv { h: 10, s: 20, v: 30 },
            upper: Hsv { h: 20, s: 40, v: 60 },
        };
        assert!(range.contains(Hsv { h: 10, s: 20, v: 30 }));
        assert!(range.contains(Hsv { h: 20, s: 40, v: 60 }));
        assert!(!range.contains(Hsv { h: 21, s: 40, v: 60 }));
    }
}
