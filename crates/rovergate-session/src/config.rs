//! Session configuration and read-only snapshots.

use rovergate_protocol::{LifecycleState, SessionId, StartOptions};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings fixed when a session is provisioned.
///
/// Start-time settings (recharge rate) are not here; they arrive with the
/// admin start as [`StartOptions`](rovergate_protocol::StartOptions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of players the session admits.
    pub max_players: usize,

    /// Capacity of the actor's command queue. When full, callers wait.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_players: 8,
            command_buffer: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionInfo
// ---------------------------------------------------------------------------

/// A point-in-time view of a session's metadata.
///
/// Published by the actor after every change, so readers get a consistent
/// view without queueing behind moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub state: LifecycleState,
    pub player_count: usize,
    pub max_players: usize,
    /// Frozen by the admin start; `None` while Joining.
    pub options: Option<StartOptions>,
}
