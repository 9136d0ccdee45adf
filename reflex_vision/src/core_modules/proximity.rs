// THEORY:
// The `proximity` module reduces two detected blobs to the single scalar the
// whole system pivots on: the signed gap between the target marker's edge and
// the boundary marker's effective edge. A negative gap means the target is
// already overlapping the boundary ring; the action should land just as the
// gap closes.
//
// The boundary marker's painted ring extends a little past its fitted
// geometric circle, so a fixed positive `radius_offset` widens the boundary
// radius before the comparison. Entry and exit use the same comparison (no
// separate hysteresis band); debouncing is the trigger gate's job, not this
// module's.

use crate::core_modules::locator::Blob;

/// Widens the boundary marker's fitted radius to its visual hit margin.
pub const RADIUS_OFFSET: i32 = 6;

/// Gaps below this many pixels classify as "close".
pub const PROXIMITY_THRESHOLD: f64 = 5.0;

/// One frame's classification of the two markers' geometric relationship.
#[derive(Debug, Clone, Copy)]
pub struct Proximity {
    /// Signed edge-to-edge distance in pixels; negative means overlapping.
    pub gap: f64,
    pub is_close: bool,
}

/// Computes the signed gap between the target's edge and the boundary's
/// effective edge and classifies it against `threshold`.
pub fn evaluate(boundary: &Blob, target: &Blob, radius_offset: i32, threshold: f64) -> Proximity {
    let effective_boundary_radius = (boundary.radius + radius_offset).max(1);

    let dx = (boundary.center_x - target.center_x) as f64;
    let dy = (boundary.center_y - target.center_y) as f64;
    let distance = (dx * dx + dy * dy).sqrt();

    let gap = distance - (effective_boundary_radius - target.radius) as f64;

    Proximity {
        gap,
        is_close: gap < threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(x: i32, y: i32, r: i32) -> Blob {
        Blob {
            center_x: x,
            center_y: y,
            radius: r,
        }
    }

    #[test]
    fn target_inside_the_boundary_is_close() {
        // distance 30, effective boundary radius 56, target radius 10:
        // gap = 30 - (56 - 10) = -16.
        let result = evaluate(&blob(100, 100, 50), &blob(130, 100, 10), 6, 5.0);
        assert!((result.gap - (-16.0)).abs() < 1e-9);
        assert!(result.is_close);
    }

    #[test]
    fn target_far_outside_is_not_close() {
        // distance 100: gap = 100 - 46 = 54.
        let result = evaluate(&blob(100, 100, 50), &blob(200, 100, 10), 6, 5.0);
        assert!((result.gap - 54.0).abs() < 1e-9);
        assert!(!result.is_close);
    }

    #[test]
    fn gap_exactly_at_threshold_is_not_close() {
        // distance 51, effective radius 56, target radius 10: gap = 5.0.
        let result = evaluate(&blob(100, 100, 50), &blob(151, 100, 10), 6, 5.0);
        assert!((result.gap - 5.0).abs() < 1e-9);
        assert!(!result.is_close);
    }

    #[test]
    fn diagonal_distance_is_euclidean() {
        let result = evaluate(&blob(0, 0, 50), &blob(30, 40, 10), 6, 5.0);
        // distance = 50, gap = 50 - 46 = 4.
        assert!((result.gap - 4.0).abs() < 1e-9);
        assert!(result.is_close);
    }

    #[test]
    fn degenerate_boundary_radius_is_clamped_positive() {
        let result = evaluate(&blob(0, 0, 0), &blob(10, 0, 0), -5, 5.0);
        // Effective radius clamps to 1 rather than going negative.
        assert!((result.gap - 9.0).abs() < 1e-9);
    }
}
