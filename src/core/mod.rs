pub mod config;
pub mod error;
pub mod types;

pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use types::{AgentId, SquadId, Tick, Vec3};
