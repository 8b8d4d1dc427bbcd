use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

/// Force and cooling parameters. Every field can be overridden on its own;
/// missing fields in a config file fall back to the defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Negative values repel.
    pub charge_strength: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub center_strength: f32,
    /// Fraction of velocity kept after each integration step.
    pub velocity_decay: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub center_x: f32,
    pub center_y: f32,
    /// Barnes-Hut opening angle.
    pub theta: f32,
    /// Above this node count repulsion is approximated with a quadtree.
    pub barnes_hut_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            charge_strength: -300.0,
            link_distance: 100.0,
            link_strength: 1.0,
            center_strength: 0.1,
            velocity_decay: 0.4,
            // Cools from 1 to `alpha_min` in 300 ticks.
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            alpha_min: 0.001,
            center_x: 0.0,
            center_y: 0.0,
            theta: 0.9,
            barnes_hut_threshold: 400,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid simulation config {}", path.display()))?;
        Ok(config.validated())
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.center_x, self.center_y)
    }

    /// Replaces non-finite values with defaults and clamps the rest into
    /// ranges the integrator can work with.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        let alpha_min = finite_or(self.alpha_min, defaults.alpha_min);
        Self {
            charge_strength: finite_or(self.charge_strength, defaults.charge_strength),
            link_distance: finite_or(self.link_distance, defaults.link_distance).max(0.0),
            link_strength: finite_or(self.link_strength, defaults.link_strength).max(0.0),
            center_strength: finite_or(self.center_strength, defaults.center_strength).max(0.0),
            velocity_decay: finite_or(self.velocity_decay, defaults.velocity_decay).clamp(0.0, 1.0),
            alpha_decay: finite_or(self.alpha_decay, defaults.alpha_decay).clamp(0.0, 1.0),
            alpha_min: if alpha_min > 0.0 {
                alpha_min
            } else {
                defaults.alpha_min
            },
            center_x: finite_or(self.center_x, defaults.center_x),
            center_y: finite_or(self.center_y, defaults.center_y),
            theta: finite_or(self.theta, defaults.theta).clamp(0.0, 2.0),
            barnes_hut_threshold: self.barnes_hut_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.charge_strength, -300.0);
        assert_eq!(config.link_distance, 100.0);
        assert_eq!(config.link_strength, 1.0);
        assert_eq!(config.center_strength, 0.1);
        assert_eq!(config.velocity_decay, 0.4);
        assert!((config.alpha_decay - 0.0228).abs() < 0.0001);
        assert_eq!(config.alpha_min, 0.001);
    }

    #[test]
    fn partial_json_overrides_single_fields() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"chargeStrength": -120, "alphaMin": 0.01}"#)
                .expect("valid config");

        assert_eq!(config.charge_strength, -120.0);
        assert_eq!(config.alpha_min, 0.01);
        assert_eq!(config.link_distance, 100.0);
    }

    #[test]
    fn validation_repairs_unusable_values() {
        let config = SimulationConfig {
            link_distance: -5.0,
            velocity_decay: 3.0,
            alpha_min: 0.0,
            charge_strength: f32::NAN,
            ..Default::default()
        }
        .validated();

        assert_eq!(config.link_distance, 0.0);
        assert_eq!(config.velocity_decay, 1.0);
        assert_eq!(config.alpha_min, 0.001);
        assert_eq!(config.charge_strength, -300.0);
    }
}
