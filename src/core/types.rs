//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// World-space position. X and Z are the ground plane, Y is vertical.
pub use glam::Vec3;

/// Unique identifier for AI agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is enough to tell agents apart in logs
        let s = self.0.simple().to_string();
        write!(f, "agent-{}", &s[..8])
    }
}

/// Unique identifier for squads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SquadId(pub u32);

impl SquadId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Clamp a frame delta to the valid range (negative deltas are ignored)
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}
