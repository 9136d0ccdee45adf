// THEORY:
// The `locator` is the engine of the detection layer. Given one captured
// frame and one marker color class, it answers a single question: where is
// the largest circular thing of that color, and how big is it?
//
// The algorithm is a classic color-segmentation pipeline:
// 1.  **Masking**: every pixel is converted to HSV and tested against the
//     marker's `ColorRange`, producing a binary mask.
// 2.  **Component Extraction**: the mask is partitioned into 8-connected
//     components via a breadth-first flood fill. Components are discovered in
//     raster order, which makes candidate ordering reproducible.
// 3.  **Noise Floor**: components smaller than `min_area` pixels are dropped.
//     A marker is tens of pixels across; anything below the floor is specular
//     glint or compression noise.
// 4.  **Selection**: among the survivors the largest area wins. Ties keep the
//     first-found component, so synthetic test input behaves deterministically.
// 5.  **Circle Fit**: the minimal enclosing circle of the winner's boundary
//     pixels gives the marker's center and radius, rounded to whole pixels.
//
// The locator is stateless: it sees one frame at a time and has no memory of
// previous detections. Absence of a marker is a normal outcome (`None`), not
// an error.

use crate::core_modules::color::color::{ColorRange, rgb_to_hsv};
use image::RgbaImage;
use std::collections::VecDeque;

/// Components with fewer pixels than this are treated as noise.
pub const MIN_BLOB_AREA: u32 = 100;

/// A detected marker instance: center and radius in frame-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
}

/// Finds the largest blob of the given color class in the frame.
///
/// Returns `None` when no connected component of in-range pixels reaches
/// `min_area`.
pub fn locate(frame: &RgbaImage, range: &ColorRange, min_area: u32) -> Option<Blob> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let mask = build_mask(frame, range);
    let component = largest_component(&mask, width, height, min_area)?;
    let rim = boundary_points(&component, &mask, width, height);
    let circle = min_enclosing_circle(&rim);

    Some(Blob {
        center_x: circle.x.round() as i32,
        center_y: circle.y.round() as i32,
        radius: circle.r.round() as i32,
    })
}

fn build_mask(frame: &RgbaImage, range: &ColorRange) -> Vec<bool> {
    frame
        .pixels()
        .map(|px| range.contains(rgb_to_hsv(px.0[0], px.0[1], px.0[2])))
        .collect()
}

/// Flood-fills the mask in raster order and keeps the largest component that
/// clears the area floor. Strictly-greater comparison keeps the first-found
/// component on ties.
fn largest_component(
    mask: &[bool],
    width: u32,
    height: u32,
    min_area: u32,
) -> Option<Vec<(u32, u32)>> {
    let mut visited = vec![false; mask.len()];
    let mut best: Option<Vec<(u32, u32)>> = None;

    for start_y in 0..height {
        for start_x in 0..width {
            let start = (start_y * width + start_x) as usize;
            if !mask[start] || visited[start] {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            visited[start] = true;
            queue.push_back((start_x, start_y));

            while let Some((x, y)) = queue.pop_front() {
                component.push((x, y));
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                            continue;
                        }
                        let index = (ny as u32 * width + nx as u32) as usize;
                        if mask[index] && !visited[index] {
                            visited[index] = true;
                            queue.push_back((nx as u32, ny as u32));
                        }
                    }
                }
            }

            if component.len() >= min_area as usize
                && best.as_ref().is_none_or(|b| component.len() > b.len())
            {
                best = Some(component);
            }
        }
    }

    best
}

/// Collects the component's rim: pixels with at least one 4-neighbor outside
/// the mask (or outside the frame). The enclosing circle only depends on
/// these, so fitting on the rim instead of the full component keeps the fit
/// cheap.
fn boundary_points(
    component: &[(u32, u32)],
    mask: &[bool],
    width: u32,
    height: u32,
) -> Vec<(f64, f64)> {
    let is_filled = |x: i32, y: i32| -> bool {
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            return false;
        }
        mask[(y as u32 * width + x as u32) as usize]
    };

    component
        .iter()
        .filter(|&&(x, y)| {
            let (x, y) = (x as i32, y as i32);
            !is_filled(x - 1, y) || !is_filled(x + 1, y) || !is_filled(x, y - 1) || !is_filled(x, y + 1)
        })
        .map(|&(x, y)| (x as f64, y as f64))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Circle {
    x: f64,
    y: f64,
    r: f64,
}

const CONTAINS_EPSILON: f64 = 1e-9;

fn contains(circle: &Circle, p: (f64, f64)) -> bool {
    let dx = p.0 - circle.x;
    let dy = p.1 - circle.y;
    (dx * dx + dy * dy).sqrt() <= circle.r * (1.0 + 1e-12) + CONTAINS_EPSILON
}

fn circle_from_two(a: (f64, f64), b: (f64, f64)) -> Circle {
    let x = (a.0 + b.0) / 2.0;
    let y = (a.1 + b.1) / 2.0;
    let r = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 2.0;
    Circle { x, y, r }
}

fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<Circle> {
    // Work relative to the bounding-box center for numerical stability.
    let ox = (a.0.min(b.0).min(c.0) + a.0.max(b.0).max(c.0)) / 2.0;
    let oy = (a.1.min(b.1).min(c.1) + a.1.max(b.1).max(c.1)) / 2.0;
    let (ax, ay) = (a.0 - ox, a.1 - oy);
    let (bx, by) = (b.0 - ox, b.1 - oy);
    let (cx, cy) = (c.0 - ox, c.1 - oy);

    let d = (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by)) * 2.0;
    if d == 0.0 {
        return None;
    }
    let x = ox
        + ((ax * ax + ay * ay) * (by - cy)
            + (bx * bx + by * by) * (cy - ay)
            + (cx * cx + cy * cy) * (ay - by))
            / d;
    let y = oy
        + ((ax * ax + ay * ay) * (cx - bx)
            + (bx * bx + by * by) * (ax - cx)
            + (cx * cx + cy * cy) * (bx - ax))
            / d;
    let r = ((a.0 - x).powi(2) + (a.1 - y).powi(2)).sqrt();
    Some(Circle { x, y, r })
}

/// Welzl-style incremental minimal enclosing circle. The input order is the
/// deterministic rim order from `boundary_points`, so repeated runs over the
/// same frame produce identical fits.
fn min_enclosing_circle(points: &[(f64, f64)]) -> Circle {
    let mut circle: Option<Circle> = None;

    for (i, &p) in points.iter().enumerate() {
        if circle.map_or(true, |c| !contains(&c, p)) {
            circle = Some(circle_with_one_point(&points[..=i], p));
        }
    }

    circle.unwrap_or(Circle { x: 0.0, y: 0.0, r: 0.0 })
}

fn circle_with_one_point(points: &[(f64, f64)], p: (f64, f64)) -> Circle {
    let mut circle = Circle { x: p.0, y: p.1, r: 0.0 };

    for (i, &q) in points.iter().enumerate() {
        if contains(&circle, q) {
            continue;
        }
        if circle.r == 0.0 {
            circle = circle_from_two(p, q);
        } else {
            circle = circle_with_two_points(&points[..=i], p, q);
        }
    }

    circle
}

fn circle_with_two_points(points: &[(f64, f64)], p: (f64, f64), q: (f64, f64)) -> Circle {
    let base = circle_from_two(p, q);
    let mut left: Option<Circle> = None;
    let mut right: Option<Circle> = None;

    for &probe in points {
        if contains(&base, probe) {
            continue;
        }
        let side = cross(p, q, probe);
        let Some(candidate) = circumcircle(p, q, probe) else {
            continue;
        };
        let candidate_side = cross(p, q, (candidate.x, candidate.y));

        if side > 0.0 {
            if left.map_or(true, |l| candidate_side > cross(p, q, (l.x, l.y))) {
                left = Some(candidate);
            }
        } else if side < 0.0 && right.map_or(true, |rc| candidate_side < cross(p, q, (rc.x, rc.y))) {
            right = Some(candidate);
        }
    }

    match (left, right) {
        (None, None) => base,
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (Some(l), Some(r)) => {
            if l.r <= r.r {
                l
            } else {
                r
            }
        }
    }
}
