// THEORY:
// The `pipeline` module is the per-frame brain of the engine: everything that
// can be decided by looking at pixels, with no I/O attached. One call to
// `assess` runs the full detection stack on a captured frame and reports what
// the loop should do about it:
//
//   Stage 1: locate the boundary marker (green) and the target marker (white).
//   Stage 2: if both are present, evaluate the edge-to-edge gap.
//   Stage 3: feed the classification through the trigger gate.
//
// Keeping the pipeline free of capture, input, and windowing makes the whole
// decision path testable on synthetic frames; the loop in `bot` is reduced to
// plumbing between this module and the outside world.

use crate::core_modules::color::color::{BOUNDARY_MARKER, ColorRange, TARGET_MARKER};
use crate::core_modules::locator::{Blob, MIN_BLOB_AREA, locate};
use crate::core_modules::proximity::{PROXIMITY_THRESHOLD, Proximity, RADIUS_OFFSET, evaluate};
use crate::core_modules::trigger::{TriggerDecision, TriggerGate};
use image::RgbaImage;

/// Detection constants, fixed at construction. There is no config file; these
/// are tuned once against the game and baked in.
#[derive(Debug, Clone)]
pub struct ReflexConfig {
    pub boundary_range: ColorRange,
    pub target_range: ColorRange,
    pub min_blob_area: u32,
    pub radius_offset: i32,
    pub proximity_threshold: f64,
}

impl Default for ReflexConfig {
    fn default() -> Self {
        Self {
            boundary_range: BOUNDARY_MARKER,
            target_range: TARGET_MARKER,
            min_blob_area: MIN_BLOB_AREA,
            radius_offset: RADIUS_OFFSET,
            proximity_threshold: PROXIMITY_THRESHOLD,
        }
    }
}

/// The full outcome of one frame's analysis.
#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    pub boundary: Option<Blob>,
    pub target: Option<Blob>,
    /// Present only when both markers were found this frame.
    pub proximity: Option<Proximity>,
    pub decision: TriggerDecision,
}

/// Runs the detection stack over successive frames and carries the one piece
/// of cross-frame state: the trigger gate.
pub struct ReflexPipeline {
    config: ReflexConfig,
    gate: TriggerGate,
}

impl ReflexPipeline {
    pub fn new(config: ReflexConfig) -> Self {
        Self {
            config,
            gate: TriggerGate::new(),
        }
    }

    /// Analyzes one frame. When either marker is undetected the trigger gate
    /// is left untouched and the decision is `Idle`: a dropped detection can
    /// neither fire the action nor re-arm the gate.
    pub fn assess(&mut self, frame: &RgbaImage) -> FrameReport {
        let boundary = locate(frame, &self.config.boundary_range, self.config.min_blob_area);
        let target = locate(frame, &self.config.target_range, self.config.min_blob_area);

        let (proximity, decision) = match (&boundary, &target) {
            (Some(boundary), Some(target)) => {
                let proximity = evaluate(
                    boundary,
                    target,
                    self.config.radius_offset,
                    self.config.proximity_threshold,
                );
                (Some(proximity), self.gate.decide(proximity.is_close))
            }
            _ => (None, TriggerDecision::Idle),
        };

        FrameReport {
            boundary,
            target,
            proximity,
            decision,
        }
    }

    /// Commits a successful trigger send; see `TriggerGate::confirm_fire`.
    pub fn confirm_fire(&mut self) {
        self.gate.confirm_fire();
    }

    pub fn is_inside(&self) -> bool {
        self.gate.is_inside()
    }

    pub fn config(&self) -> &ReflexConfig {
        &self.config
    }
}
