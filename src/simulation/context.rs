//! Simulation context
//!
//! Owns every piece of shared combat state for one session: the difficulty
//! dial, the director and its performance tracker, the enemy squads and the
//! player's ability loadout. Anything that needs one of these is handed the
//! context (or a borrow of the part it needs); there are no globals.

use crate::abilities::{AbilityRegistry, AbilityUse, AbilityUseError, PhysicalState};
use crate::ai::difficulty::DifficultyController;
use crate::ai::director::{AiDirector, DirectorVerdict, PerformanceSample, PerformanceTracker};
use crate::ai::formation::FormationAllocator;
use crate::ai::personality::PersonalityProfile;
use crate::core::config::CoreConfig;
use crate::core::error::Result;
use crate::core::types::{sanitize_dt, AgentId, SquadId, Tick, Vec3};
use crate::simulation::squad::Squad;
use serde::{Deserialize, Serialize};

/// Energy pool ceiling for the player
pub const MAX_PLAYER_ENERGY: f32 = 100.0;
/// Energy regained per second
pub const PLAYER_ENERGY_REGEN: f32 = 5.0;

/// The player as the enemy AI sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    /// Health fraction in `[0, 1]`
    pub health_percent: f32,
    pub physical: PhysicalState,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            health_percent: 1.0,
            physical: PhysicalState::new(true, MAX_PLAYER_ENERGY),
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    /// Enemy strikes that landed on the player
    pub strikes: u32,
    /// Health fraction the player lost
    pub damage_taken: f32,
    pub player_died: bool,
    /// Set on ticks where the director evaluated
    pub verdict: Option<DirectorVerdict>,
}

pub struct SimulationContext {
    config: CoreConfig,
    tick: Tick,
    clock: f32,
    difficulty: DifficultyController,
    director: AiDirector,
    tracker: PerformanceTracker,
    squads: Vec<Squad>,
    next_squad_id: u32,
    abilities: AbilityRegistry,
    pub player: PlayerState,
    kills: u32,
    player_deaths: u32,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::build(CoreConfig::default())
    }
}

impl SimulationContext {
    /// Validate `config` and build a fresh session from it
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CoreConfig) -> Self {
        Self {
            tick: 0,
            clock: 0.0,
            difficulty: DifficultyController::from_config(&config.difficulty),
            director: AiDirector::new(config.director.clone()),
            tracker: PerformanceTracker::new(config.director.performance_window),
            squads: Vec::new(),
            next_squad_id: 0,
            abilities: AbilityRegistry::with_config(&config.abilities),
            player: PlayerState::default(),
            kills: 0,
            player_deaths: 0,
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Seconds of simulated time
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn difficulty_mut(&mut self) -> &mut DifficultyController {
        &mut self.difficulty
    }

    pub fn director(&self) -> &AiDirector {
        &self.director
    }

    pub fn abilities(&self) -> &AbilityRegistry {
        &self.abilities
    }

    pub fn abilities_mut(&mut self) -> &mut AbilityRegistry {
        &mut self.abilities
    }

    pub fn squads(&self) -> &[Squad] {
        &self.squads
    }

    pub fn squad(&self, id: SquadId) -> Option<&Squad> {
        self.squads.iter().find(|s| s.id() == id)
    }

    pub fn squad_mut(&mut self, id: SquadId) -> Option<&mut Squad> {
        self.squads.iter_mut().find(|s| s.id() == id)
    }

    pub fn enemy_count(&self) -> usize {
        self.squads.iter().map(Squad::len).sum()
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn player_deaths(&self) -> u32 {
        self.player_deaths
    }

    /// Current read on player performance
    pub fn performance(&mut self) -> PerformanceSample {
        self.tracker.sample(self.clock, self.player.health_percent)
    }

    /// Personality the director picks for a new enemy with `ally_count` allies
    pub fn situational_personality(&mut self, ally_count: u32) -> PersonalityProfile {
        let sample = self.performance();
        self.director.personality_for(&sample, ally_count)
    }

    /// Enemy health for a fresh spawn at the current difficulty
    pub fn scaled_enemy_health(&self) -> f32 {
        self.difficulty
            .scaled_health(self.config.simulation.enemy_base_health)
    }

    /// Seconds between spawns for `base_interval` at the current difficulty
    pub fn spawn_interval(&self, base_interval: f32) -> f32 {
        self.difficulty.spawn_interval(base_interval)
    }

    /// Spawn a squad around `anchor` with one agent per personality
    pub fn spawn_squad(
        &mut self,
        anchor: Vec3,
        personalities: impl IntoIterator<Item = PersonalityProfile>,
    ) -> SquadId {
        let id = SquadId::new(self.next_squad_id);
        self.next_squad_id += 1;

        let formation = FormationAllocator::from_config(&self.config.formation);
        let mut squad = Squad::new(id, formation, anchor, &self.config.simulation);
        let health = self.scaled_enemy_health();
        for personality in personalities {
            squad.spawn(personality, health);
        }

        tracing::debug!(
            "Spawned squad {} with {} agents at difficulty {:.2}",
            id.0,
            squad.len(),
            self.difficulty.level()
        );
        self.squads.push(squad);
        id
    }

    /// Damage an enemy; returns true if it died
    pub fn damage_agent(&mut self, squad: SquadId, agent: &AgentId, amount: f32) -> bool {
        let killed = self
            .squad_mut(squad)
            .and_then(|s| s.damage(agent, amount))
            .unwrap_or(false);
        if killed {
            self.kills += 1;
            self.tracker.record_kill(self.clock);
        }
        killed
    }

    /// Use a player ability and spend its energy
    pub fn use_ability(&mut self, id: &str) -> std::result::Result<AbilityUse, AbilityUseError> {
        let used = self.abilities.use_ability_by_id(id, &self.player.physical)?;
        self.player.physical.energy -= used.energy_spent;
        Ok(used)
    }

    /// Record a player death and respawn at full health
    pub fn player_died(&mut self) {
        self.player_deaths += 1;
        self.tracker.record_death(self.clock);
        self.director.on_player_died();
        self.player.health_percent = 1.0;
        self.player.physical.energy = MAX_PLAYER_ENERGY;
    }

    /// Advance the whole session by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = sanitize_dt(dt);
        self.tick += 1;
        self.clock += dt;

        self.abilities.update(dt);
        self.player.physical.energy =
            (self.player.physical.energy + PLAYER_ENERGY_REGEN * dt).min(MAX_PLAYER_ENERGY);

        let target = Some(self.player.position);
        let strikes: u32 = self
            .squads
            .iter_mut()
            .map(|squad| squad.tick(dt, target).strikes)
            .sum();
        self.squads.retain(|s| !s.is_empty());

        let damage_taken = strikes as f32
            * self.config.simulation.strike_damage
            * self.difficulty.enemy_damage_multiplier();
        self.player.health_percent -= damage_taken;

        let player_died = self.player.health_percent <= 0.0;
        if player_died {
            tracing::debug!("Player died at tick {}", self.tick);
            self.player_died();
        }

        let sample = self.performance();
        let verdict = self.director.update(dt, &sample, &mut self.difficulty);

        TickReport {
            tick: self.tick,
            strikes,
            damage_taken,
            player_died,
            verdict,
        }
    }
}
