//! Error types for the session layer.

use rovergate_protocol::{LifecycleState, SessionId};

/// Errors that can occur during session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No session with this id was ever provisioned.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A session with this id is already provisioned. Sessions are never
    /// replaced once created.
    #[error("session {0} already exists")]
    AlreadyExists(SessionId),

    /// The session has no room for another player.
    #[error("session {0} is full")]
    CapacityExceeded(SessionId),

    /// The session's lifecycle state does not allow this operation,
    /// e.g. moving an agent before the session is Playing.
    #[error("session {session_id} is {state}")]
    WrongState {
        session_id: SessionId,
        state: LifecycleState,
    },

    /// The requested lifecycle transition is not legal from the current
    /// state, e.g. starting a session that is already Playing.
    #[error("cannot move session {session_id} from {from} to {to}")]
    InvalidTransition {
        session_id: SessionId,
        from: LifecycleState,
        to: LifecycleState,
    },

    /// The token is not held by any player of this session.
    #[error("token does not belong to a player of session {0}")]
    UnknownPlayer(SessionId),

    /// The simulation refused the move. Carries the simulation's message.
    #[error("move rejected: {0}")]
    MoveRejected(String),

    /// The session actor has stopped and can't take commands.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}
