//! Session-level simulation
//!
//! Ties the AI and ability modules together for one combat session:
//! `Squad` runs a group of agents in formation, `SimulationContext` owns the
//! squads plus the difficulty, director and player loadout, and advances
//! them all once per tick.

pub mod context;
pub mod squad;

pub use context::{PlayerState, SimulationContext, TickReport};
pub use squad::{Squad, SquadAgent, SquadTickReport};
