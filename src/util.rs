use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::Vec2;

/// Deterministic pseudo-random pair in `[-1, 1]` derived from a node id.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Hue in `[0, 1)` keyed by a string, used to color entity types.
pub fn stable_hue(key: &str) -> f32 {
    let (x, _) = stable_pair(key);
    ((x + 1.0) * 0.5).fract()
}

pub fn finite_or_zero(value: Vec2) -> Vec2 {
    if value.is_finite() { value } else { Vec2::ZERO }
}

pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
