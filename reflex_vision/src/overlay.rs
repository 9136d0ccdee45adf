//! Debug overlay: draws what the detector saw, and nothing else.
//!
//! The overlay is a pure side-effect sink. `annotate` paints the detected
//! geometry onto a copy of the frame (also used by the offline tuner), and
//! `OverlayWindow` puts it on screen with the numeric gap in the title bar.
//! The only control signal that ever flows back out is the Escape key, which
//! asks the loop to stop; detection and trigger decisions never read
//! anything from here.

use crate::core_modules::proximity::RADIUS_OFFSET;
use crate::pipeline::FrameReport;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use minifb::{Key, Window, WindowOptions};
use thiserror::Error;

const BOUNDARY_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const TARGET_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LINK_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("overlay window failed: {0}")]
    Window(#[from] minifb::Error),
}

/// Paints the detected blobs and their connecting line onto the frame. The
/// boundary circle is drawn at its *effective* radius (fitted radius plus
/// `radius_offset`), since that is the edge the trigger actually compares
/// against.
pub fn annotate(frame: &mut RgbaImage, report: &FrameReport, radius_offset: i32) {
    if let Some(boundary) = &report.boundary {
        draw_hollow_circle_mut(
            frame,
            (boundary.center_x, boundary.center_y),
            (boundary.radius + radius_offset).max(1),
            BOUNDARY_COLOR,
        );
    }
    if let Some(target) = &report.target {
        draw_hollow_circle_mut(
            frame,
            (target.center_x, target.center_y),
            target.radius.max(1),
            TARGET_COLOR,
        );
    }
    if let (Some(boundary), Some(target)) = (&report.boundary, &report.target) {
        draw_line_segment_mut(
            frame,
            (boundary.center_x as f32, boundary.center_y as f32),
            (target.center_x as f32, target.center_y as f32),
            LINK_COLOR,
        );
    }
}

/// Live debug window over the analysis region.
pub struct OverlayWindow {
    window: Window,
    buffer: Vec<u32>,
}

impl OverlayWindow {
    pub fn open(width: u32, height: u32) -> Result<Self, OverlayError> {
        let window = Window::new(
            "reflex_vision debug",
            width as usize,
            height as usize,
            WindowOptions::default(),
        )?;
        Ok(Self {
            window,
            buffer: Vec::with_capacity((width * height) as usize),
        })
    }

    /// Displays an annotated frame; the current gap goes into the title bar.
    pub fn present(&mut self, frame: &RgbaImage, gap: Option<f64>) -> Result<(), OverlayError> {
        match gap {
            Some(gap) => self
                .window
                .set_title(&format!("reflex_vision debug - gap {gap:.1}")),
            None => self.window.set_title("reflex_vision debug - no markers"),
        }

        self.buffer.clear();
        self.buffer.extend(frame.pixels().map(|px| {
            let [r, g, b, _] = px.0;
            ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
        }));
        self.window.update_with_buffer(
            &self.buffer,
            frame.width() as usize,
            frame.height() as usize,
        )?;
        Ok(())
    }

    /// True once the operator pressed Escape (or closed the window); the
    /// loop's sole overlay-driven control signal.
    pub fn interrupt_requested(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Escape)
    }
}

/// Convenience wrapper for callers that already use the default offset.
pub fn annotate_with_defaults(frame: &mut RgbaImage, report: &FrameReport) {
    annotate(frame, report, RADIUS_OFFSET);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::locator::Blob;
    use crate::core_modules::proximity::Proximity;
    use crate::core_modules::trigger::TriggerDecision;

    fn report(boundary: Option<Blob>, target: Option<Blob>) -> FrameReport {
        FrameReport {
            boundary,
            target,
            proximity: boundary.and(target).map(|_| Proximity {
                gap: 0.0,
                is_close: true,
            }),
            decision: TriggerDecision::Idle,
        }
    }

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn draws_the_boundary_at_its_effective_radius() {
        let mut frame = blank(100, 100);
        let boundary = Blob {
            center_x: 50,
            center_y: 50,
            radius: 10,
        };
        annotate(&mut frame, &report(Some(boundary), None), 6);

        // Rightmost point of the effective circle (radius 16).
        assert_eq!(*frame.get_pixel(66, 50), BOUNDARY_COLOR);
        // The fitted radius itself is not outlined.
        assert_ne!(*frame.get_pixel(60, 50), BOUNDARY_COLOR);
    }

    #[test]
    fn draws_a_connecting_line_when_both_blobs_exist() {
        let mut frame = blank(100, 100);
        let boundary = Blob {
            center_x: 20,
            center_y: 50,
            radius: 5,
        };
        let target = Blob {
            center_x: 80,
            center_y: 50,
            radius: 5,
        };
        annotate(&mut frame, &report(Some(boundary), Some(target)), 0);

        assert_eq!(*frame.get_pixel(50, 50), LINK_COLOR);
        assert_eq!(*frame.get_pixel(85, 50), TARGET_COLOR);
    }

    #[test]
    fn missing_blobs_draw_nothing() {
        let mut frame = blank(50, 50);
        let before = frame.clone();
        annotate(&mut frame, &report(None, None), 6);
        assert_eq!(frame, before);
    }
}
