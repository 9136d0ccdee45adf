// THEORY:
// The `templates` module is the shared "find this reference image on screen"
// capability. Several automation flows in the original tool re-derived this
// logic independently; here it exists exactly once, as a registry of named
// grayscale templates and a matcher over captured frames. The in-tree
// consumer is the maintenance resource check (consumable icons), and the
// same surface serves any collaborator that needs "locate icon, click its
// center".
//
// Matching is normalized mean-absolute-difference over grayscale, in two
// passes: a strided coarse scan over candidate positions, then an exact
// rescan of the neighborhood around the best coarse hit. Scores land in
// `0.0..=1.0`, where 1.0 is a pixel-perfect match; a hit counts only at or
// above the caller's confidence threshold.

use image::{GrayImage, RgbaImage, imageops};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Confidence floor used for the consumable-resource icons.
pub const RESOURCE_CONFIDENCE: f64 = 0.85;

/// Registry names of the consumable-resource icons, probed in order.
pub const RESOURCE_TEMPLATES: &[&str] = &["food", "food_1"];

/// Grid step of the coarse scan; refinement covers everything it skips.
const COARSE_POSITION_STEP: u32 = 4;
/// Pixel subsampling inside a coarse score.
const COARSE_PIXEL_STEP: u32 = 2;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode template image: {0}")]
    Decode(#[from] image::ImageError),
}

/// An axis-aligned match location in screen pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }
}

/// Named reference images, loaded once at construction.
pub struct TemplateRegistry {
    entries: Vec<(String, GrayImage)>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Loads every PNG in `dir`, keyed by file stem, in sorted name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        paths.sort();

        let mut registry = Self::empty();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let template = image::open(&path)?.to_luma8();
            registry.insert(stem, template);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: &str, template: GrayImage) {
        self.entries.push((name.to_string(), template));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Searches the screen for one named template.
    pub fn locate(&self, screen: &RgbaImage, name: &str, confidence: f64) -> Option<Region> {
        let gray = imageops::grayscale(screen);
        self.locate_in_gray(&gray, name, confidence)
    }

    /// Probes several templates in the given order against one screen grab
    /// and returns the first that clears the confidence threshold.
    pub fn locate_any(&self, screen: &RgbaImage, names: &[&str], confidence: f64) -> Option<Region> {
        let gray = imageops::grayscale(screen);
        names
            .iter()
            .find_map(|name| self.locate_in_gray(&gray, name, confidence))
    }

    fn locate_in_gray(&self, gray: &GrayImage, name: &str, confidence: f64) -> Option<Region> {
        let template = &self
            .entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)?
            .1;

        let (x, y, score) = best_match(gray, template)?;
        if score >= confidence {
            Some(Region {
                x,
                y,
                width: template.width(),
                height: template.height(),
            })
        } else {
            None
        }
    }
}

/// Similarity of the template laid over the screen at `(x, y)`, sampling
/// every `step`-th pixel in both directions.
fn score_at(screen: &GrayImage, template: &GrayImage, x: u32, y: u32, step: u32) -> f64 {
    let mut total_diff: u64 = 0;
    let mut samples: u64 = 0;

    let mut ty = 0;
    while ty < template.height() {
        let mut tx = 0;
        while tx < template.width() {
            let s = screen.get_pixel(x + tx, y + ty).0[0] as i64;
            let t = template.get_pixel(tx, ty).0[0] as i64;
            total_diff += (s - t).unsigned_abs();
            samples += 1;
            tx += step;
        }
        ty += step;
    }

    1.0 - (total_diff as f64) / (samples as f64 * 255.0)
}

/// Best template position on the screen: coarse strided scan, then an exact
/// rescan of the neighborhood around the coarse winner.
fn best_match(screen: &GrayImage, template: &GrayImage) -> Option<(u32, u32, f64)> {
    if template.width() == 0
        || template.height() == 0
        || template.width() > screen.width()
        || template.height() > screen.height()
    {
        return None;
    }
    let max_x = screen.width() - template.width();
    let max_y = screen.height() - template.height();

    let mut coarse_best = (0u32, 0u32, f64::MIN);
    let mut y = 0;
    while y <= max_y {
        let mut x = 0;
        while x <= max_x {
            let score = score_at(screen, template, x, y, COARSE_PIXEL_STEP);
            if score > coarse_best.2 {
                coarse_best = (x, y, score);
            }
            x += COARSE_POSITION_STEP;
        }
        y += COARSE_POSITION_STEP;
    }

    let x_lo = coarse_best.0.saturating_sub(COARSE_POSITION_STEP);
    let y_lo = coarse_best.1.saturating_sub(COARSE_POSITION_STEP);
    let x_hi = (coarse_best.0 + COARSE_POSITION_STEP).min(max_x);
    let y_hi = (coarse_best.1 + COARSE_POSITION_STEP).min(max_y);

    let mut best = (0u32, 0u32, f64::MIN);
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let score = score_at(screen, template, x, y, 1);
            if score > best.2 {
                best = (x, y, score);
            }
        }
    }

    Some(best)
}
