//! Tuning configuration with documented defaults
//!
//! All tuning constants the core reads at construction time are collected
//! here. Nothing in this module is global: a `CoreConfig` is loaded (or
//! defaulted) by the owner of the simulation and handed to the components
//! that need it.

use crate::abilities::ability::MIN_FLOOR_FRACTION;
use crate::ai::formation::FormationShape;
use crate::ai::personality::PersonalityProfile;
use crate::core::error::{CoreError, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Squad formation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Shape used by newly created squads
    pub shape: FormationShape,
    /// Distance between neighbouring slots (world units)
    ///
    /// Circle formations use twice this value as their radius.
    pub spacing: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            shape: FormationShape::Line,
            spacing: 2.0,
        }
    }
}

/// Difficulty dial bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Lowest level the dial can be set to
    pub min: f32,
    /// Highest level the dial can be set to
    pub max: f32,
    /// Level at session start (clamped into `[min, max]`)
    pub initial: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            initial: 0.5,
        }
    }
}

/// Ability upgrade curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    /// Fraction of base cooldown/cost removed per upgrade level
    pub upgrade_step: f32,
    /// Lowest fraction of base cooldown/cost an upgraded ability can reach
    pub floor_fraction: f32,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            upgrade_step: 0.05,
            floor_fraction: 0.5,
        }
    }
}

/// Adaptive director tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// When false the director never touches the difficulty dial
    pub enabled: bool,
    /// Seconds between game-state evaluations
    pub update_interval: f32,
    /// Tension change applied per evaluation
    pub tension_step: f32,
    pub min_tension: f32,
    pub max_tension: f32,
    pub initial_tension: f32,
    /// Tension removed immediately when the player dies
    pub death_penalty: f32,
    /// Sliding window for kill/death history (seconds)
    pub performance_window: f32,
    /// Kills per minute above which the player counts as dominating
    pub dominating_kill_rate: f32,
    /// Health fraction above which a high kill rate counts as dominating
    pub dominating_health: f32,
    /// Health fraction below which recent deaths count as struggling
    pub struggling_health: f32,
    /// Deaths in the window above which a low-health player counts as struggling
    pub struggling_deaths: u32,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_interval: 2.0,
            tension_step: 0.1,
            min_tension: 0.2,
            max_tension: 1.0,
            initial_tension: 0.5,
            death_penalty: 0.3,
            performance_window: 300.0,
            dominating_kill_rate: 10.0,
            dominating_health: 0.8,
            struggling_health: 0.3,
            struggling_deaths: 2,
        }
    }
}

/// Per-tick update scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Minimum squad size before agent updates fan out across threads
    ///
    /// Below this, thread overhead exceeds the benefit.
    pub parallel_threshold: usize,
    /// Enemy health at difficulty multiplier 1.0
    pub enemy_base_health: f32,
    /// Enemy movement speed (units per second)
    pub enemy_move_speed: f32,
    /// Fraction of player health removed by one strike at multiplier 1.0
    pub strike_damage: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 256,
            enemy_base_health: 100.0,
            enemy_move_speed: 5.0,
            strike_damage: 0.02,
        }
    }
}

/// Complete core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub formation: FormationConfig,
    pub difficulty: DifficultyConfig,
    pub abilities: AbilityConfig,
    pub director: DirectorConfig,
    pub simulation: SimulationConfig,
    /// Named personality presets
    pub personalities: AHashMap<String, PersonalityProfile>,
}

impl CoreConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CoreConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a named personality preset
    pub fn personality(&self, name: &str) -> Result<PersonalityProfile> {
        self.personalities
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::UnknownPersonality(name.to_string()))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let d = &self.difficulty;
        if !(d.min.is_finite() && d.max.is_finite() && d.initial.is_finite()) {
            return Err(CoreError::InvalidConfig(
                "difficulty bounds and initial level must be finite".into(),
            ));
        }
        if d.min > d.max {
            return Err(CoreError::InvalidConfig(format!(
                "difficulty.min ({}) must be <= difficulty.max ({})",
                d.min, d.max
            )));
        }

        if !(self.formation.spacing > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "formation.spacing ({}) must be positive",
                self.formation.spacing
            )));
        }

        let a = &self.abilities;
        if !(a.upgrade_step >= 0.0) {
            return Err(CoreError::InvalidConfig(
                "abilities.upgrade_step must not be negative".into(),
            ));
        }
        if !(a.floor_fraction >= MIN_FLOOR_FRACTION && a.floor_fraction <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "abilities.floor_fraction ({}) must be in [{}, 1]",
                a.floor_fraction, MIN_FLOOR_FRACTION
            )));
        }

        let dir = &self.director;
        if !(dir.min_tension.is_finite()
            && dir.max_tension.is_finite()
            && dir.initial_tension.is_finite())
        {
            return Err(CoreError::InvalidConfig(
                "director tension bounds must be finite".into(),
            ));
        }
        if dir.min_tension > dir.max_tension {
            return Err(CoreError::InvalidConfig(format!(
                "director.min_tension ({}) must be <= director.max_tension ({})",
                dir.min_tension, dir.max_tension
            )));
        }
        if !(dir.update_interval > 0.0) || !(dir.performance_window > 0.0) {
            return Err(CoreError::InvalidConfig(
                "director intervals must be positive".into(),
            ));
        }

        let sim = &self.simulation;
        if !(sim.enemy_base_health > 0.0) || sim.enemy_move_speed < 0.0 || sim.strike_damage < 0.0 {
            return Err(CoreError::InvalidConfig(
                "simulation health must be positive, speed and damage non-negative".into(),
            ));
        }

        for (name, profile) in &self.personalities {
            if !profile.is_normalized() {
                return Err(CoreError::InvalidConfig(format!(
                    "personality '{}' has traits outside [0, 1]",
                    name
                )));
            }
        }

        Ok(())
    }
}
