//! Time-gated special abilities
//!
//! - `CooldownRegistry` is the generic keyed timer store
//! - `Ability` describes one catalog entry and its upgrade curve
//! - `AbilityRegistry` is a loadout of the four catalog abilities backed by
//!   one cooldown entry each

pub mod ability;
pub mod cooldown;
pub mod registry;

pub use ability::{Ability, AbilityKind, PhysicalState};
pub use cooldown::{CooldownRegistry, CooldownTimer};
pub use registry::{AbilityRegistry, AbilitySnapshot, AbilityUse, AbilityUseError};
