//! Agent decision-making
//!
//! Architecture: Trait + Data hybrid
//! - AgentState trait defines swappable per-state behavior
//! - AgentStateMachine owns named states and drives enter/update/exit
//! - PersonalityProfile holds TOML-loaded trait weights
//! - FormationAllocator assigns squad slots around a reference point
//! - DifficultyController and AiDirector adapt pressure to the player

pub mod difficulty;
pub mod director;
pub mod formation;
pub mod personality;
pub mod state_machine;
pub mod states;

pub use difficulty::DifficultyController;
pub use director::{AiDirector, DirectorVerdict, PerformanceSample, PerformanceTracker};
pub use formation::{compute_formation_positions, slot_position, FormationAllocator, FormationShape};
pub use personality::{load_personality, PersonalityProfile};
pub use state_machine::{AgentState, AgentStateMachine, Transition};
pub use states::{combat_state_machine, AgentIntent, CombatContext};
