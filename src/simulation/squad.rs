//! Squads of combat agents
//!
//! A squad keeps its agents and its formation membership in the same order,
//! so slot `i` of the formation always belongs to agent `i`. Each tick
//! refreshes every agent's context with the shared target, its slot and its
//! ally count, then runs its state machine and applies the resulting intent.

use crate::ai::formation::{FormationAllocator, FormationShape};
use crate::ai::personality::PersonalityProfile;
use crate::ai::state_machine::AgentStateMachine;
use crate::ai::states::{combat_state_machine, AgentIntent, CombatContext};
use crate::core::config::SimulationConfig;
use crate::core::types::{sanitize_dt, AgentId, SquadId, Vec3};
use rayon::prelude::*;

/// One agent and its decision state
#[derive(Debug)]
pub struct SquadAgent {
    pub id: AgentId,
    pub health: f32,
    pub max_health: f32,
    pub context: CombatContext,
    machine: AgentStateMachine<CombatContext>,
}

impl SquadAgent {
    pub fn new(personality: PersonalityProfile, position: Vec3, max_health: f32) -> Self {
        let mut context = CombatContext::new(personality, position);
        let machine = combat_state_machine(&mut context);
        Self {
            id: AgentId::new(),
            health: max_health,
            max_health,
            context,
            machine,
        }
    }

    /// Name of the current state
    pub fn state(&self) -> Option<&str> {
        self.machine.current_state()
    }

    pub fn position(&self) -> Vec3 {
        self.context.position
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_percent(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Refresh facts, run the machine and act on the intent
    ///
    /// Returns true if the agent struck its target this step.
    fn step(
        &mut self,
        dt: f32,
        target: Option<Vec3>,
        slot: Vec3,
        ally_count: u32,
        move_speed: f32,
    ) -> bool {
        self.context.target = target;
        self.context.formation_slot = Some(slot);
        self.context.ally_count = ally_count;
        self.context.health_percent = self.health_percent();

        self.machine.update(&mut self.context, dt);

        let stride = move_speed * dt;
        match self.context.intent {
            AgentIntent::Hold => false,
            AgentIntent::Strike(_) => true,
            AgentIntent::MoveTo(point) => {
                self.context.position = move_toward(self.context.position, point, stride);
                false
            }
            AgentIntent::FleeFrom(point) => {
                let away = (self.context.position - point).normalize_or_zero();
                self.context.position += away * stride;
                false
            }
        }
    }
}

fn move_toward(from: Vec3, to: Vec3, stride: f32) -> Vec3 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= stride || distance == 0.0 {
        to
    } else {
        from + delta / distance * stride
    }
}

/// Result of one squad tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquadTickReport {
    /// Strikes launched this tick
    pub strikes: u32,
    /// Agents in the Attack state after the tick
    pub attacking: usize,
}

#[derive(Debug)]
pub struct Squad {
    id: SquadId,
    agents: Vec<SquadAgent>,
    formation: FormationAllocator,
    anchor: Vec3,
    parallel_threshold: usize,
    move_speed: f32,
}

impl Squad {
    pub fn new(id: SquadId, formation: FormationAllocator, anchor: Vec3, config: &SimulationConfig) -> Self {
        Self {
            id,
            agents: Vec::new(),
            formation,
            anchor,
            parallel_threshold: config.parallel_threshold.max(1),
            move_speed: config.enemy_move_speed,
        }
    }

    pub fn id(&self) -> SquadId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[SquadAgent] {
        &self.agents
    }

    pub fn agent(&self, id: &AgentId) -> Option<&SquadAgent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn formation(&self) -> &FormationAllocator {
        &self.formation
    }

    pub fn set_shape(&mut self, shape: FormationShape) {
        self.formation.set_shape(shape);
    }

    /// Point the formation is laid out around
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = anchor;
    }

    /// Add an agent at its formation slot
    pub fn spawn(&mut self, personality: PersonalityProfile, max_health: f32) -> AgentId {
        let mut agent = SquadAgent::new(personality, self.anchor, max_health);
        let id = agent.id;
        self.formation.add_member(id);
        agent.context.position = self.formation.position(&id, self.anchor);
        self.agents.push(agent);
        tracing::debug!("Squad {} spawned {} ({} members)", self.id.0, id, self.agents.len());
        id
    }

    /// Remove an agent, closing the gap in the formation
    pub fn despawn(&mut self, id: &AgentId) -> Option<SquadAgent> {
        let index = self.agents.iter().position(|a| &a.id == id)?;
        self.formation.remove_member(id);
        Some(self.agents.remove(index))
    }

    /// Apply damage; returns `Some(true)` if the agent died and was removed
    pub fn damage(&mut self, id: &AgentId, amount: f32) -> Option<bool> {
        let agent = self.agents.iter_mut().find(|a| &a.id == id)?;
        agent.health -= amount.max(0.0);
        if agent.is_alive() {
            return Some(false);
        }
        self.despawn(id);
        Some(true)
    }

    /// Agent closest to `point`
    pub fn nearest_to(&self, point: Vec3) -> Option<&SquadAgent> {
        self.agents.iter().min_by(|a, b| {
            a.position()
                .distance_squared(point)
                .total_cmp(&b.position().distance_squared(point))
        })
    }

    /// Advance every agent one step toward `target`
    ///
    /// The anchor drifts toward the target at agent speed so the formation
    /// closes in with the squad.
    pub fn tick(&mut self, dt: f32, target: Option<Vec3>) -> SquadTickReport {
        let dt = sanitize_dt(dt);
        if let Some(target) = target {
            self.anchor = move_toward(self.anchor, target, self.move_speed * dt);
        }

        let slots = self.formation.positions(self.anchor);
        debug_assert_eq!(slots.len(), self.agents.len());

        let ally_count = self.agents.len().saturating_sub(1) as u32;
        let move_speed = self.move_speed;

        let strikes: u32 = if self.agents.len() >= self.parallel_threshold {
            self.agents
                .par_iter_mut()
                .zip(slots.par_iter())
                .map(|(agent, (_, slot))| agent.step(dt, target, *slot, ally_count, move_speed) as u32)
                .sum()
        } else {
            self.agents
                .iter_mut()
                .zip(slots.iter())
                .map(|(agent, (_, slot))| agent.step(dt, target, *slot, ally_count, move_speed) as u32)
                .sum()
        };

        let attacking = self
            .agents
            .iter()
            .filter(|a| a.state() == Some(crate::ai::states::ATTACK))
            .count();

        SquadTickReport { strikes, attacking }
    }
}
