//! The `Simulation` trait: the seam between session bookkeeping and game
//! physics.
//!
//! Rovergate doesn't know what a valid path is, how fast batteries drain,
//! or which tiles a scout can see. A game supplies that by implementing
//! [`Simulation`]; each provisioned session owns one instance and calls it
//! from inside its actor, so an implementation never sees two calls at once
//! and needs no locking of its own.

use rovergate_protocol::{
    Direction, Grid, Orientation, PlayerId, Position, StartOptions,
};

/// Where a newly admitted player starts and what they can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub start: Position,
    /// Tiles immediately around the start position.
    pub neighbors: Grid,
    /// Coarse overview of the whole map.
    pub map: Grid,
    /// The mission target.
    pub target: Position,
    pub orientation: Orientation,
}

/// Outcome of a ground-agent move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundReport {
    pub position: Position,
    pub power: u32,
    pub neighbors: Grid,
    pub message: String,
    pub orientation: Orientation,
}

/// Outcome of an aerial-agent move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AerialReport {
    pub position: Position,
    pub power: u32,
    pub neighbors: Grid,
    pub message: String,
}

/// A move the simulation refused, with a message fit for the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SimulationError(pub String);

impl SimulationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Game physics for one session.
///
/// `Send + 'static` because the instance moves into the session's Tokio
/// task. It does not need `Sync`: only that task ever touches it.
///
/// The session has already checked lifecycle state and token ownership
/// before any `move_*` method is called.
///
/// Calls are synchronous and run on a Tokio worker thread inside the
/// session's actor. Keep them short: a call that computes for a long time
/// holds that worker, and every other task scheduled on it waits. Move heavy
/// work (path planning over a large map, say) off the call path and hand the
/// result in through the simulation's own state.
///
/// A panic inside any call is caught by the session and reported to the
/// player as a rejected move. The session keeps running, but the simulation
/// keeps whatever state it had at the point of the panic.
pub trait Simulation: Send + 'static {
    /// Places a new player on the map.
    ///
    /// Returns `None` if the simulation has nowhere to put them; the session
    /// reports that as a full session.
    fn join(&mut self, player: PlayerId, name: &str) -> Option<Arrival>;

    /// Drives `player`'s ground agent one step.
    fn move_ground(
        &mut self,
        player: PlayerId,
        direction: Direction,
    ) -> Result<GroundReport, SimulationError>;

    /// Flies `player`'s aerial agent to `destination`.
    fn move_aerial(
        &mut self,
        player: PlayerId,
        destination: Position,
    ) -> Result<AerialReport, SimulationError>;

    /// Called once when the session moves to Playing. Default: no-op.
    fn start(&mut self, _options: &StartOptions) {}

    /// Returns `true` once the mission is over.
    ///
    /// Checked after every successful move; when it turns `true` the session
    /// becomes Completed and stops accepting moves and joins. Default: never.
    fn is_complete(&self) -> bool {
        false
    }
}
