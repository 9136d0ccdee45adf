// THEORY:
// The `region` module pins down *where* on the screen the engine looks. The
// reflex mini-game always renders its two markers inside the same small
// rectangle, so instead of scanning the whole display we capture and analyze
// only that rectangle. The coordinates depend on the display resolution; the
// game ships two known layouts, so two presets are enough.
//
// Key architectural principles:
// 1.  **Immutable Geometry**: A `ScreenRegion` is chosen once at startup and
//     never changes for the lifetime of the loop. Everything downstream
//     (capture, blob coordinates, overlay) is expressed in this region's
//     local pixel space.
// 2.  **Conservative Fallback**: Any display that does not match the large
//     preset gets the small one. A wrong-but-valid region degrades into
//     "no markers detected", which the loop treats as a normal outcome.

/// An immutable screen rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// Displays strictly larger than this in both dimensions use the large preset.
const LARGE_DISPLAY_MIN_WIDTH: u32 = 2000;
const LARGE_DISPLAY_MIN_HEIGHT: u32 = 1100;

const LARGE_PRESET: ScreenRegion = ScreenRegion {
    x1: 1100,
    y1: 950,
    x2: 1450,
    y2: 1300,
};

const SMALL_PRESET: ScreenRegion = ScreenRegion {
    x1: 775,
    y1: 567,
    x2: 1128,
    y2: 949,
};

impl ScreenRegion {
    /// Selects the capture rectangle for the detected display resolution.
    pub fn for_display(display_width: u32, display_height: u32) -> Self {
        if display_width > LARGE_DISPLAY_MIN_WIDTH && display_height > LARGE_DISPLAY_MIN_HEIGHT {
            LARGE_PRESET
        } else {
            SMALL_PRESET
        }
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_display_gets_large_preset() {
        let region = ScreenRegion::for_display(2560, 1440);
        assert_eq!(region, LARGE_PRESET);
    }

    #[test]
    fn small_display_falls_back_to_small_preset() {
        let region = ScreenRegion::for_display(1920, 1080);
        assert_eq!(region, SMALL_PRESET);
    }

    #[test]
    fn wide_but_short_display_falls_back() {
        // Both dimensions must exceed the cutoff, not just one.
        let region = ScreenRegion::for_display(3440, 1080);
        assert_eq!(region, SMALL_PRESET);
    }

    #[test]
    fn dimensions_are_consistent() {
        let region = ScreenRegion::for_display(2560, 1440);
        assert_eq!(region.width(), 350);
        assert_eq!(region.height(), 350);
    }
}
