//! Built-in combat states
//!
//! Idle, Patrol, Chase, Attack, Retreat and Dead operate over a `CombatContext` that the
//! owner refreshes with resolved facts before each update. States never
//! move anything themselves: they leave an `AgentIntent` in the context for
//! the movement and weapon code outside the core to carry out.

use crate::ai::personality::PersonalityProfile;
use crate::ai::state_machine::{AgentState, AgentStateMachine, Transition};
use crate::core::types::Vec3;
use serde::{Deserialize, Serialize};

pub const IDLE: &str = "Idle";
pub const CHASE: &str = "Chase";
pub const ATTACK: &str = "Attack";
pub const RETREAT: &str = "Retreat";
pub const PATROL: &str = "Patrol";
pub const DEAD: &str = "Dead";

/// Default distance at which agents notice a target
pub const DEFAULT_DETECTION_RANGE: f32 = 30.0;
/// Distance at which a patrol waypoint counts as reached
pub const PATROL_ARRIVAL_DISTANCE: f32 = 2.0;
/// Health above which a retreating agent rejoins the fight
pub const RECOVERED_HEALTH: f32 = 0.5;

/// What the agent wants its body to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AgentIntent {
    /// Stand still
    #[default]
    Hold,
    /// Move toward a point
    MoveTo(Vec3),
    /// Attack the target at this position
    Strike(Vec3),
    /// Move away from this position
    FleeFrom(Vec3),
}

/// Per-agent facts in, intents out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatContext {
    pub personality: PersonalityProfile,
    pub position: Vec3,
    /// Position of the current target, if one is known
    pub target: Option<Vec3>,
    /// Health fraction in `[0, 1]`
    pub health_percent: f32,
    /// Allies close enough to fall back to
    pub ally_count: u32,
    pub attack_range: f32,
    pub detection_range: f32,
    /// Formation slot to approach instead of the target itself
    pub formation_slot: Option<Vec3>,
    /// Point to wander to while no target is known; cleared on arrival
    pub patrol_waypoint: Option<Vec3>,
    pub intent: AgentIntent,
    /// Attacks launched since spawn
    pub attacks_made: u32,
}

impl CombatContext {
    /// Fresh context; attack range follows the personality's ideal distance
    pub fn new(personality: PersonalityProfile, position: Vec3) -> Self {
        Self {
            personality,
            position,
            target: None,
            health_percent: 1.0,
            ally_count: 0,
            attack_range: personality.ideal_distance(),
            detection_range: DEFAULT_DETECTION_RANGE,
            formation_slot: None,
            patrol_waypoint: None,
            intent: AgentIntent::Hold,
            attacks_made: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health_percent <= 0.0
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Distance to the target, or `f32::MAX` without one
    pub fn distance_to_target(&self) -> f32 {
        self.target
            .map(|t| self.position.distance(t))
            .unwrap_or(f32::MAX)
    }

    pub fn in_attack_range(&self) -> bool {
        self.distance_to_target() <= self.attack_range
    }

    pub fn should_retreat(&self) -> bool {
        self.personality
            .should_retreat(self.health_percent, self.ally_count)
    }
}

/// Waits for a target
#[derive(Debug, Default)]
pub struct IdleState;

impl AgentState<CombatContext> for IdleState {
    fn enter(&mut self, ctx: &mut CombatContext) {
        ctx.intent = AgentIntent::Hold;
    }

    fn update(&mut self, ctx: &mut CombatContext, _dt: f32) -> Transition {
        if ctx.is_dead() {
            return Transition::to(DEAD);
        }
        if ctx.has_target() {
            return Transition::to(CHASE);
        }
        if ctx.patrol_waypoint.is_some() {
            return Transition::to(PATROL);
        }
        ctx.intent = AgentIntent::Hold;
        Transition::Stay
    }
}

/// Closes on the target, via the formation slot while still far away
#[derive(Debug, Default)]
pub struct ChaseState;

impl AgentState<CombatContext> for ChaseState {
    fn update(&mut self, ctx: &mut CombatContext, _dt: f32) -> Transition {
        if ctx.is_dead() {
            return Transition::to(DEAD);
        }
        let Some(target) = ctx.target else {
            return Transition::to(IDLE);
        };

        if ctx.in_attack_range() {
            return Transition::to(ATTACK);
        }

        if ctx.should_retreat() {
            return Transition::to(RETREAT);
        }

        // Hold formation on approach, break ranks once the target is close
        let destination = match ctx.formation_slot {
            Some(slot) if ctx.distance_to_target() > ctx.detection_range => slot,
            _ => target,
        };
        ctx.intent = AgentIntent::MoveTo(destination);
        Transition::Stay
    }
}

/// Holds position and attacks at the personality's cadence
#[derive(Debug, Default)]
pub struct AttackState {
    cooldown: f32,
}

impl AgentState<CombatContext> for AttackState {
    fn enter(&mut self, _ctx: &mut CombatContext) {
        // First strike lands on the first update
        self.cooldown = 0.0;
    }

    fn update(&mut self, ctx: &mut CombatContext, dt: f32) -> Transition {
        if ctx.is_dead() {
            return Transition::to(DEAD);
        }
        let Some(target) = ctx.target else {
            return Transition::to(IDLE);
        };

        if !ctx.in_attack_range() {
            return Transition::to(CHASE);
        }

        if ctx.should_retreat() {
            return Transition::to(RETREAT);
        }

        self.cooldown -= dt;
        if self.cooldown <= 0.0 {
            ctx.attacks_made += 1;
            ctx.intent = AgentIntent::Strike(target);
            self.cooldown = ctx.personality.attack_delay();
        } else {
            ctx.intent = AgentIntent::Hold;
        }
        Transition::Stay
    }
}

/// Breaks off until healed or out of the fight
#[derive(Debug, Default)]
pub struct RetreatState;

impl AgentState<CombatContext> for RetreatState {
    fn update(&mut self, ctx: &mut CombatContext, _dt: f32) -> Transition {
        if ctx.is_dead() {
            return Transition::to(DEAD);
        }
        let Some(target) = ctx.target else {
            return Transition::to(IDLE);
        };

        if ctx.health_percent > RECOVERED_HEALTH {
            return Transition::to(CHASE);
        }

        if ctx.distance_to_target() > ctx.detection_range * 2.0 {
            return Transition::to(IDLE);
        }

        ctx.intent = AgentIntent::FleeFrom(target);
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut CombatContext) {
        ctx.intent = AgentIntent::Hold;
    }
}

/// Walks to the caller-supplied waypoint until a target shows up
#[derive(Debug, Default)]
pub struct PatrolState;

impl AgentState<CombatContext> for PatrolState {
    fn update(&mut self, ctx: &mut CombatContext, _dt: f32) -> Transition {
        if ctx.is_dead() {
            return Transition::to(DEAD);
        }
        if ctx.has_target() {
            return Transition::to(CHASE);
        }
        let Some(waypoint) = ctx.patrol_waypoint else {
            return Transition::to(IDLE);
        };

        if ctx.position.distance(waypoint) < PATROL_ARRIVAL_DISTANCE {
            ctx.patrol_waypoint = None;
            return Transition::to(IDLE);
        }

        ctx.intent = AgentIntent::MoveTo(waypoint);
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut CombatContext) {
        ctx.intent = AgentIntent::Hold;
    }
}

/// Terminal state; nothing leaves it
#[derive(Debug, Default)]
pub struct DeadState;

impl AgentState<CombatContext> for DeadState {
    fn enter(&mut self, ctx: &mut CombatContext) {
        ctx.intent = AgentIntent::Hold;
        tracing::debug!("Agent died after {} attacks", ctx.attacks_made);
    }

    fn update(&mut self, ctx: &mut CombatContext, _dt: f32) -> Transition {
        ctx.intent = AgentIntent::Hold;
        Transition::Stay
    }
}

/// Machine with the built-in combat states registered and Idle entered
pub fn combat_state_machine(ctx: &mut CombatContext) -> AgentStateMachine<CombatContext> {
    let mut fsm = AgentStateMachine::new();
    fsm.add_state(IDLE, IdleState);
    fsm.add_state(PATROL, PatrolState);
    fsm.add_state(DEAD, DeadState);
    fsm.add_state(CHASE, ChaseState);
    fsm.add_state(ATTACK, AttackState::default());
    fsm.add_state(RETREAT, RetreatState);
    fsm.change_state(IDLE, ctx);
    fsm
}
