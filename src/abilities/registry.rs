//! Ability loadout with per-ability cooldowns
//!
//! Holds the four catalog abilities in slot order and one cooldown entry
//! per ability id. Lookups by out-of-range slot or unknown id return
//! `None` / `false` rather than failing.

use crate::abilities::ability::{Ability, AbilityKind, PhysicalState};
use crate::abilities::cooldown::CooldownRegistry;
use crate::core::config::AbilityConfig;
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an ability could not be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbilityUseError {
    #[error("Unknown ability: {0}")]
    UnknownAbility(String),

    #[error("{name} on cooldown, {remaining:.1}s remaining")]
    OnCooldown { name: String, remaining: f32 },

    #[error("{0} cannot be used right now")]
    Unusable(String),

    #[error("Not enough energy: need {required}, have {available}")]
    InsufficientEnergy { required: f32, available: f32 },
}

/// Result of a successful ability use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityUse {
    pub kind: AbilityKind,
    /// Energy the caller must deduct from the user
    pub energy_spent: f32,
    /// Cooldown that was started (seconds)
    pub cooldown: f32,
}

/// Upgrade levels keyed by ability id, for an external save collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilitySnapshot {
    pub upgrade_levels: Vec<(String, u32)>,
}

#[derive(Debug, Clone)]
pub struct AbilityRegistry {
    abilities: Vec<Ability>,
    cooldowns: CooldownRegistry,
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AbilityRegistry {
    /// Register the four catalog abilities with the default upgrade curve
    pub fn new() -> Self {
        Self::with_config(&AbilityConfig::default())
    }

    pub fn with_config(config: &AbilityConfig) -> Self {
        let abilities: Vec<Ability> = AbilityKind::all()
            .into_iter()
            .map(|kind| Ability::with_config(kind, config))
            .collect();

        tracing::debug!(
            "Registered abilities: {}",
            abilities
                .iter()
                .map(|a| a.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            abilities,
            cooldowns: CooldownRegistry::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// All abilities in slot order
    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn ability(&self, index: usize) -> Option<&Ability> {
        self.abilities.get(index)
    }

    pub fn ability_by_id(&self, id: &str) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.abilities.iter().position(|a| a.id == id)
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    /// Ready if the slot exists and is not cooling down
    pub fn is_ready(&self, index: usize) -> bool {
        self.ability(index)
            .is_some_and(|a| !self.cooldowns.is_active(&a.id))
    }

    /// Cooldown progress of a slot (1.0 when ready or unknown)
    pub fn cooldown_progress(&self, index: usize) -> f32 {
        self.ability(index)
            .map(|a| self.cooldowns.progress(&a.id))
            .unwrap_or(1.0)
    }

    /// Seconds until a slot is ready (0.0 when ready or unknown)
    pub fn remaining_cooldown(&self, index: usize) -> f32 {
        self.ability(index)
            .map(|a| self.cooldowns.remaining(&a.id))
            .unwrap_or(0.0)
    }

    /// Raise a slot's upgrade level by one
    pub fn upgrade(&mut self, index: usize) -> bool {
        match self.abilities.get_mut(index) {
            Some(ability) => {
                let level = ability.upgrade();
                tracing::debug!("Upgraded {} to level {}", ability.name, level);
                true
            }
            None => false,
        }
    }

    pub fn upgrade_by_id(&mut self, id: &str) -> bool {
        match self.index_of(id) {
            Some(index) => self.upgrade(index),
            None => {
                tracing::warn!("Cannot upgrade unknown ability {}", id);
                false
            }
        }
    }

    /// Try to use the ability in `index`
    ///
    /// Checks cooldown, then the ability's own usability rule, then energy.
    /// On success the cooldown is started and the caller deducts
    /// `energy_spent` from the user.
    pub fn use_ability(
        &mut self,
        index: usize,
        state: &PhysicalState,
    ) -> std::result::Result<AbilityUse, AbilityUseError> {
        let ability = self
            .abilities
            .get(index)
            .ok_or_else(|| AbilityUseError::UnknownAbility(format!("slot {}", index)))?;

        if self.cooldowns.is_active(&ability.id) {
            return Err(AbilityUseError::OnCooldown {
                name: ability.name.clone(),
                remaining: self.cooldowns.remaining(&ability.id),
            });
        }

        if !ability.can_use(state) {
            return Err(AbilityUseError::Unusable(ability.name.clone()));
        }

        let required = ability.modified_energy_cost();
        if state.energy < required {
            return Err(AbilityUseError::InsufficientEnergy {
                required,
                available: state.energy,
            });
        }

        let cooldown = ability.modified_cooldown();
        let used = AbilityUse {
            kind: ability.kind,
            energy_spent: required,
            cooldown,
        };
        tracing::debug!(
            "Used {}: energy -{}, cooldown {}s",
            ability.name,
            required,
            cooldown
        );
        self.cooldowns.start(ability.id.clone(), cooldown);

        Ok(used)
    }

    pub fn use_ability_by_id(
        &mut self,
        id: &str,
        state: &PhysicalState,
    ) -> std::result::Result<AbilityUse, AbilityUseError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| AbilityUseError::UnknownAbility(id.to_string()))?;
        self.use_ability(index, state)
    }

    /// Advance all ability cooldowns by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.cooldowns.update(dt);
    }

    /// Make every ability ready immediately
    pub fn reset_cooldowns(&mut self) {
        self.cooldowns.reset_all();
    }

    /// Export upgrade levels
    pub fn snapshot(&self) -> AbilitySnapshot {
        AbilitySnapshot {
            upgrade_levels: self
                .abilities
                .iter()
                .map(|a| (a.id.clone(), a.upgrade_level))
                .collect(),
        }
    }

    /// Restore upgrade levels; unknown ids are skipped
    pub fn apply_snapshot(&mut self, snapshot: &AbilitySnapshot) {
        for (id, level) in &snapshot.upgrade_levels {
            match self.abilities.iter_mut().find(|a| &a.id == id) {
                Some(ability) => ability.upgrade_level = *level,
                None => tracing::warn!("Skipping upgrade level for unknown ability {}", id),
            }
        }
    }

    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn apply_snapshot_json(&mut self, json: &str) -> Result<()> {
        let snapshot: AbilitySnapshot = serde_json::from_str(json)?;
        self.apply_snapshot(&snapshot);
        Ok(())
    }
}
