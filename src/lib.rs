//! Combat AI and ability coordination core
//!
//! Agent state machines, squad formations, personality-driven behavior,
//! adaptive difficulty and cooldown-gated abilities.

pub mod abilities;
pub mod ai;
pub mod core;
pub mod simulation;
