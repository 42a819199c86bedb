//! Ability descriptors
//!
//! The catalog is fixed: Dash, Shield, EMP and TimeSlow. Each descriptor
//! carries inert display metadata, base cooldown and energy cost, an
//! upgrade level, and a usability check over caller-supplied physical facts.

use crate::core::config::AbilityConfig;
use serde::{Deserialize, Serialize};

/// Upgrades never take cooldown or cost below this fraction of the base
pub const MIN_FLOOR_FRACTION: f32 = 0.5;

/// Which ability a descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    Dash,
    Shield,
    Emp,
    TimeSlow,
}

impl AbilityKind {
    /// Catalog order, which is also the slot order
    pub fn all() -> [AbilityKind; 4] {
        [
            AbilityKind::Dash,
            AbilityKind::Shield,
            AbilityKind::Emp,
            AbilityKind::TimeSlow,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            AbilityKind::Dash => "dash",
            AbilityKind::Shield => "shield",
            AbilityKind::Emp => "emp",
            AbilityKind::TimeSlow => "time_slow",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AbilityKind::Dash => "Tactical Dash",
            AbilityKind::Shield => "Energy Shield",
            AbilityKind::Emp => "EMP Blast",
            AbilityKind::TimeSlow => "Temporal Field",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AbilityKind::Dash => "Rapidly dash in the movement direction with a burst of speed",
            AbilityKind::Shield => "Deploy an energy shield that absorbs incoming damage",
            AbilityKind::Emp => {
                "Release an electromagnetic pulse that stuns and damages nearby enemies"
            }
            AbilityKind::TimeSlow => {
                "Create a field that slows time for enemies, giving you a tactical advantage"
            }
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AbilityKind::Dash => "icons/ability_dash.png",
            AbilityKind::Shield => "icons/ability_shield.png",
            AbilityKind::Emp => "icons/ability_emp.png",
            AbilityKind::TimeSlow => "icons/ability_time.png",
        }
    }

    /// Base cooldown in seconds
    pub fn base_cooldown(&self) -> f32 {
        match self {
            AbilityKind::Dash => 5.0,
            AbilityKind::Shield => 12.0,
            AbilityKind::Emp => 15.0,
            AbilityKind::TimeSlow => 20.0,
        }
    }

    /// Base energy cost
    pub fn base_energy_cost(&self) -> f32 {
        match self {
            AbilityKind::Dash => 15.0,
            AbilityKind::Shield => 25.0,
            AbilityKind::Emp => 30.0,
            AbilityKind::TimeSlow => 40.0,
        }
    }

    pub fn from_id(id: &str) -> Option<AbilityKind> {
        Self::all().into_iter().find(|k| k.id() == id)
    }
}

/// Physical facts about the invoking agent, resolved by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalState {
    /// Standing on the ground (not airborne)
    pub grounded: bool,
    /// Energy currently available to spend
    pub energy: f32,
}

impl Default for PhysicalState {
    fn default() -> Self {
        Self {
            grounded: true,
            energy: 100.0,
        }
    }
}

impl PhysicalState {
    pub fn new(grounded: bool, energy: f32) -> Self {
        Self { grounded, energy }
    }
}

/// One ability slot in a loadout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub kind: AbilityKind,
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Cooldown at upgrade level 0 (seconds)
    pub base_cooldown: f32,
    /// Energy cost at upgrade level 0
    pub base_energy_cost: f32,
    pub upgrade_level: u32,
    upgrade_step: f32,
    floor_fraction: f32,
}

impl Ability {
    pub fn new(kind: AbilityKind) -> Self {
        Self::with_config(kind, &AbilityConfig::default())
    }

    pub fn with_config(kind: AbilityKind, config: &AbilityConfig) -> Self {
        Self {
            kind,
            id: kind.id().to_string(),
            name: kind.display_name().to_string(),
            description: kind.description().to_string(),
            icon: kind.icon().to_string(),
            base_cooldown: kind.base_cooldown(),
            base_energy_cost: kind.base_energy_cost(),
            upgrade_level: 0,
            upgrade_step: config.upgrade_step,
            floor_fraction: config.floor_fraction,
        }
    }

    /// Multiplier applied to base cooldown and cost at the current level
    ///
    /// Each level removes `upgrade_step` of the base, never going below
    /// `floor_fraction` or [`MIN_FLOOR_FRACTION`], whichever is higher.
    pub fn upgrade_factor(&self) -> f32 {
        let reduction = self.upgrade_step * self.upgrade_level as f32;
        let floor = self.floor_fraction.max(MIN_FLOOR_FRACTION);
        (1.0 - reduction).max(floor)
    }

    /// Cooldown after upgrades (seconds)
    pub fn modified_cooldown(&self) -> f32 {
        self.base_cooldown * self.upgrade_factor()
    }

    /// Energy cost after upgrades
    pub fn modified_energy_cost(&self) -> f32 {
        self.base_energy_cost * self.upgrade_factor()
    }

    /// Ability-specific usability check
    pub fn can_use(&self, state: &PhysicalState) -> bool {
        match self.kind {
            // Dashing needs footing
            AbilityKind::Dash => state.grounded,
            AbilityKind::Shield | AbilityKind::Emp | AbilityKind::TimeSlow => true,
        }
    }

    /// Raise the upgrade level by one, returning the new level
    pub(crate) fn upgrade(&mut self) -> u32 {
        self.upgrade_level = self.upgrade_level.saturating_add(1);
        self.upgrade_level
    }
}
