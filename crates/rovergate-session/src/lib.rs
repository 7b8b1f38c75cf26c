//! Game session lifecycle for Rovergate.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns its
//! lifecycle state, its player list, and its [`Simulation`] instance. Every
//! state-changing call on a session is a message to that task, so calls on
//! the same session are applied one at a time and calls on different
//! sessions never wait for each other.
//!
//! # Key types
//!
//! - [`Simulation`]: the trait a game's physics implements
//! - [`SessionRegistry`]: provisions sessions and looks them up by id
//! - [`SessionHandle`]: send commands to a running session actor
//! - [`SessionConfig`]: per-session settings (player capacity)
//! - [`SessionInfo`]: a consistent snapshot for read-only queries

mod config;
mod error;
mod registry;
mod session;
mod simulation;

pub use config::{SessionConfig, SessionInfo};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{AgentCommand, AgentReport, JoinTicket, SessionHandle};
pub use simulation::{
    AerialReport, Arrival, GroundReport, Simulation, SimulationError,
};
