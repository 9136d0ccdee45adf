//! Screen capture for the fixed analysis region.
//!
//! Wraps `xcap` so the rest of the engine only ever sees RGBA8 buffers in a
//! fixed channel order, whatever the platform capture API returns. Captures
//! are never cached; every call reflects the screen at that instant.

use crate::core_modules::region::ScreenRegion;
use image::RgbaImage;
use thiserror::Error;
use xcap::Monitor;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no monitor available")]
    NoMonitor,
    #[error("screen capture failed: {0}")]
    Backend(#[from] xcap::XCapError),
}

/// Captures the fixed analysis rectangle from the primary monitor.
///
/// The region is selected once, from the monitor resolution detected at
/// construction, and stays fixed for the capturer's lifetime. Capture
/// failures are recoverable: the loop logs them and retries next iteration.
pub struct RegionCapturer {
    monitor: Monitor,
    region: ScreenRegion,
}

impl RegionCapturer {
    pub fn new() -> Result<Self, CaptureError> {
        let monitor = Monitor::all()?
            .into_iter()
            .next()
            .ok_or(CaptureError::NoMonitor)?;
        let region = ScreenRegion::for_display(monitor.width()?, monitor.height()?);
        Ok(Self { monitor, region })
    }

    pub fn region(&self) -> ScreenRegion {
        self.region
    }

    /// Captures the analysis region as a fresh RGBA8 frame.
    pub fn capture(&self) -> Result<RgbaImage, CaptureError> {
        let full = self.monitor.capture_image()?;
        let cropped = image::imageops::crop_imm(
            &full,
            self.region.x1,
            self.region.y1,
            self.region.width(),
            self.region.height(),
        );
        Ok(cropped.to_image())
    }

    /// Captures the whole monitor; used by the resource check, which searches
    /// for template icons outside the analysis region.
    pub fn capture_full(&self) -> Result<RgbaImage, CaptureError> {
        Ok(self.monitor.capture_image()?)
    }
}
