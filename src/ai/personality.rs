//! Agent personality profiles
//!
//! A profile is four trait scalars in `[0, 1]` plus the pure decision
//! functions derived from them. Profiles are plain values: tuning a
//! personality means building a new one. Presets can be loaded from TOML.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Closest engagement distance (Range = 0)
pub const MIN_IDEAL_DISTANCE: f32 = 3.0;
/// Farthest engagement distance (Range = 1)
pub const MAX_IDEAL_DISTANCE: f32 = 20.0;

/// Delay between attacks for a fully passive agent (seconds)
pub const MAX_ATTACK_DELAY: f32 = 2.0;
/// Delay removed at full aggression (2.0 - 1.5 = 0.5s)
pub const ATTACK_DELAY_AGGRESSION_SCALE: f32 = 1.5;

/// Teamwork above which an agent falls back to allies when hurt
pub const TEAMWORK_RETREAT_THRESHOLD: f32 = 0.7;
/// Health below which a team player falls back to allies
pub const TEAMWORK_RETREAT_HEALTH: f32 = 0.5;

/// Behavioral traits of a single agent (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityProfile {
    /// 0.0 = holds back, 1.0 = reckless
    pub aggression: f32,
    /// 0.0 = fights to the death, 1.0 = retreats early
    pub caution: f32,
    /// 0.0 = lone wolf, 1.0 = sticks with the squad
    pub teamwork: f32,
    /// 0.0 = melee, 1.0 = long range
    pub range: f32,
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            caution: 0.5,
            teamwork: 0.5,
            range: 0.5,
        }
    }
}

impl PersonalityProfile {
    pub fn new(aggression: f32, caution: f32, teamwork: f32, range: f32) -> Self {
        Self {
            aggression,
            caution,
            teamwork,
            range,
        }
    }

    /// Build a profile with every trait clamped into `[0, 1]`
    pub fn normalized(aggression: f32, caution: f32, teamwork: f32, range: f32) -> Self {
        Self::new(
            aggression.clamp(0.0, 1.0),
            caution.clamp(0.0, 1.0),
            teamwork.clamp(0.0, 1.0),
            range.clamp(0.0, 1.0),
        )
    }

    /// True if every trait lies in `[0, 1]`
    pub fn is_normalized(&self) -> bool {
        [self.aggression, self.caution, self.teamwork, self.range]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }

    /// Distance this agent tries to keep from its target
    ///
    /// Linear in `range`; out-of-range traits extrapolate.
    pub fn ideal_distance(&self) -> f32 {
        MIN_IDEAL_DISTANCE + self.range * (MAX_IDEAL_DISTANCE - MIN_IDEAL_DISTANCE)
    }

    /// Seconds between attacks. Aggressive agents attack faster.
    pub fn attack_delay(&self) -> f32 {
        MAX_ATTACK_DELAY - ATTACK_DELAY_AGGRESSION_SCALE * self.aggression
    }

    /// Health fraction below which the agent retreats on its own
    ///
    /// Caution raises it, aggression lowers it.
    pub fn retreat_threshold(&self) -> f32 {
        self.caution * 0.5 - self.aggression * 0.1
    }

    /// Decide whether to break off given current health and nearby allies
    pub fn should_retreat(&self, health_percent: f32, ally_count: u32) -> bool {
        if health_percent < self.retreat_threshold() {
            return true;
        }

        // Team players fall back to their allies once badly hurt
        self.teamwork > TEAMWORK_RETREAT_THRESHOLD
            && health_percent < TEAMWORK_RETREAT_HEALTH
            && ally_count > 0
    }
}

/// Load a personality preset from TOML
///
/// Loads from `data/personalities/{name}.toml`
pub fn load_personality(name: &str) -> Result<PersonalityProfile> {
    let contents = fs::read_to_string(personality_path(name))?;
    let profile: PersonalityProfile = toml::from_str(&contents)?;
    Ok(profile)
}

/// Get path to personality file
fn personality_path(name: &str) -> PathBuf {
    PathBuf::from("data/personalities").join(format!("{}.toml", name))
}
