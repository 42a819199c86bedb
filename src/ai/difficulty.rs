//! Adaptive difficulty dial
//!
//! A single clamped scalar drives the multipliers that spawning and
//! scaling code outside the core reads. Every setter clamps into
//! `[min, max]`, so the stored level is always in bounds.

use crate::core::config::DifficultyConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyController {
    level: f32,
    min: f32,
    max: f32,
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::from_config(&DifficultyConfig::default())
    }
}

impl DifficultyController {
    /// Create a controller with bounds `[min, max]`
    ///
    /// Swapped bounds are reordered; the initial level is clamped.
    /// Non-finite bounds fall back to `[0, 1]`; inverted bounds are swapped.
    pub fn new(min: f32, max: f32, initial: f32) -> Self {
        let (min, max) = if min.is_finite() && max.is_finite() {
            ordered(min, max)
        } else {
            tracing::warn!("Non-finite difficulty bounds ({}, {}), using [0, 1]", min, max);
            (0.0, 1.0)
        };
        let mut controller = Self {
            level: min,
            min,
            max,
        };
        controller.set_level(initial);
        controller
    }

    pub fn from_config(config: &DifficultyConfig) -> Self {
        Self::new(config.min, config.max, config.initial)
    }

    /// Set the level, clamped into bounds. NaN is ignored.
    pub fn set_level(&mut self, level: f32) {
        if level.is_nan() {
            return;
        }
        let clamped = level.clamp(self.min, self.max);
        if clamped != self.level {
            tracing::debug!("Difficulty adjusted to {:.2}", clamped);
        }
        self.level = clamped;
    }

    /// Shift the level by `delta`, clamped into bounds
    pub fn adjust(&mut self, delta: f32) {
        self.set_level(self.level + delta);
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Move the bounds and re-clamp the current level
    pub fn set_bounds(&mut self, min: f32, max: f32) {
        if !(min.is_finite() && max.is_finite()) {
            tracing::warn!("Ignoring non-finite difficulty bounds ({}, {})", min, max);
            return;
        }
        let (min, max) = ordered(min, max);
        self.min = min;
        self.max = max;
        self.level = self.level.clamp(min, max);
    }

    /// Spawn rate multiplier: 0.5x at level 0, 2.0x at level 1
    pub fn spawn_rate_multiplier(&self) -> f32 {
        0.5 + 1.5 * self.level
    }

    /// Enemy health multiplier: 0.7x at level 0, 1.5x at level 1
    pub fn enemy_health_multiplier(&self) -> f32 {
        0.7 + 0.8 * self.level
    }

    /// Enemy damage multiplier: 0.8x at level 0, 1.3x at level 1
    pub fn enemy_damage_multiplier(&self) -> f32 {
        0.8 + 0.5 * self.level
    }

    /// Health for a freshly spawned enemy with the given base health
    pub fn scaled_health(&self, base_health: f32) -> f32 {
        base_health * self.enemy_health_multiplier()
    }

    /// Seconds between spawns for a base interval at the current level
    pub fn spawn_interval(&self, base_interval: f32) -> f32 {
        base_interval / self.spawn_rate_multiplier()
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_level_in_range() {
        let mut d = DifficultyController::default();
        d.set_level(0.7);
        assert_eq!(d.level(), 0.7);
    }

    #[test]
    fn test_set_level_below_min_clamps() {
        let mut d = DifficultyController::new(0.2, 1.0, 0.5);
        d.set_level(-5.0);
        assert!(d.level() >= 0.2);
        assert_eq!(d.level(), 0.2);
    }

    #[test]
    fn test_set_level_above_max_clamps() {
        let mut d = DifficultyController::new(0.2, 1.0, 0.5);
        d.set_level(5.0);
        assert!(d.level() <= 1.0);
    }

    #[test]
    fn test_nan_level_ignored() {
        let mut d = DifficultyController::default();
        d.set_level(0.3);
        d.set_level(f32::NAN);
        assert_eq!(d.level(), 0.3);
    }

    #[test]
    fn test_non_finite_bounds_fall_back() {
        let d = DifficultyController::new(f32::NAN, 1.0, 0.5);
        assert_eq!(d.bounds(), (0.0, 1.0));
        assert_eq!(d.level(), 0.5);

        let d = DifficultyController::new(0.0, f32::INFINITY, f32::NAN);
        let (min, max) = d.bounds();
        assert!((min..=max).contains(&d.level()));
    }

    #[test]
    fn test_set_bounds_ignores_non_finite() {
        let mut d = DifficultyController::new(0.2, 0.8, 0.5);
        d.set_bounds(f32::NAN, 1.0);
        d.set_bounds(0.0, f32::NEG_INFINITY);
        assert_eq!(d.bounds(), (0.2, 0.8));
        assert_eq!(d.level(), 0.5);

        d.set_bounds(0.9, 0.6);
        assert_eq!(d.bounds(), (0.6, 0.9));
        assert_eq!(d.level(), 0.6);
    }

    #[test]
    fn test_spawn_rate_multiplier_endpoints() {
        let mut d = DifficultyController::default();
        d.set_level(0.0);
        let low = d.spawn_rate_multiplier();
        assert!(low > 0.4 && low < 0.6);

        d.set_level(1.0);
        assert!(d.spawn_rate_multiplier() > 1.9);
    }

    #[test]
    fn test_health_multiplier_endpoints() {
        let mut d = DifficultyController::default();
        d.set_level(0.0);
        let low = d.enemy_health_multiplier();
        assert!(low > 0.6 && low < 0.8);

        d.set_level(1.0);
        assert!(d.enemy_health_multiplier() > 1.4);
    }

    #[test]
    fn test_damage_multiplier_endpoints() {
        let mut d = DifficultyController::default();
        d.set_level(0.0);
        assert!((d.enemy_damage_multiplier() - 0.8).abs() < 1e-6);
        d.set_level(1.0);
        assert!((d.enemy_damage_multiplier() - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_swapped_bounds_reordered() {
        let d = DifficultyController::new(1.0, 0.0, 0.5);
        assert_eq!(d.bounds(), (0.0, 1.0));
    }

    #[test]
    fn test_adjust_clamps() {
        let mut d = DifficultyController::new(0.0, 1.0, 0.9);
        d.adjust(0.5);
        assert_eq!(d.level(), 1.0);
        d.adjust(-3.0);
        assert_eq!(d.level(), 0.0);
    }

    #[test]
    fn test_set_bounds_reclamps() {
        let mut d = DifficultyController::new(0.0, 1.0, 0.9);
        d.set_bounds(0.0, 0.5);
        assert_eq!(d.level(), 0.5);
    }

    #[test]
    fn test_spawn_interval_shrinks_with_level() {
        let mut d = DifficultyController::default();
        d.set_level(0.0);
        let slow = d.spawn_interval(10.0);
        d.set_level(1.0);
        let fast = d.spawn_interval(10.0);
        assert!(fast < slow);
        assert!((d.scaled_health(100.0) - 150.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_level_always_in_bounds(
            min in -2.0f32..2.0,
            span in 0.0f32..3.0,
            values in proptest::collection::vec(-10.0f32..10.0, 1..20),
        ) {
            let max = min + span;
            let mut d = DifficultyController::new(min, max, 0.0);
            for v in values {
                d.set_level(v);
                prop_assert!(d.level() >= min && d.level() <= max);
            }
        }

        #[test]
        fn prop_multipliers_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = DifficultyController::new(0.0, 1.0, lo);
            let high = DifficultyController::new(0.0, 1.0, hi);
            prop_assert!(low.spawn_rate_multiplier() <= high.spawn_rate_multiplier());
            prop_assert!(low.enemy_health_multiplier() <= high.enemy_health_multiplier());
        }
    }
}
