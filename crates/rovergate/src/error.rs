//! The client-facing error type for the Rovergate gateway.

use rovergate_auth::AuthError;
use rovergate_protocol::{ErrorKind, LifecycleState, ProtocolError, SessionId};
use rovergate_session::SessionError;

use crate::transport::TransportError;

/// Top-level error for every gateway operation.
///
/// Sub-crate errors are flattened into the client taxonomy rather than
/// wrapped, so callers match on what went wrong for the player
/// (`UnknownToken`, `WrongState`, ...) instead of on which layer noticed.
/// [`GateError::kind`] gives the stable wire kind for each variant.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No session with this id exists.
    #[error("session {0} not found")]
    UnknownSession(SessionId),

    /// The token was never issued, or no longer leads to a live player.
    #[error("unknown token")]
    UnknownToken,

    /// The session is full.
    #[error("session {0} is full")]
    CapacityExceeded(SessionId),

    /// The session's lifecycle state does not allow this request.
    #[error("session {session_id} is {state}")]
    WrongState {
        session_id: SessionId,
        state: LifecycleState,
    },

    /// The requested lifecycle transition is not legal.
    #[error("session {session_id} cannot move from {from} to {to}")]
    InvalidTransition {
        session_id: SessionId,
        from: LifecycleState,
        to: LifecycleState,
    },

    /// The admin secret did not match.
    #[error("invalid admin secret")]
    InvalidSecret,

    /// The simulation refused the move.
    #[error("move rejected: {0}")]
    MoveRejected(String),

    /// The session's actor has stopped.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),

    /// Operator tried to provision an id that is already taken.
    #[error("session {0} already provisioned")]
    AlreadyProvisioned(SessionId),

    /// A broken internal invariant. Never caused by the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Encoding or decoding a wire envelope failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GateError {
    /// The stable, machine-readable kind reported to clients.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSession(_) => ErrorKind::UnknownSession,
            Self::UnknownToken => ErrorKind::UnknownToken,
            Self::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            Self::WrongState { .. } => ErrorKind::WrongState,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::InvalidSecret => ErrorKind::InvalidSecret,
            Self::MoveRejected(_) => ErrorKind::MoveRejected,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Protocol(_) => ErrorKind::BadRequest,
            Self::AlreadyProvisioned(_) | Self::Internal(_) | Self::Transport(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// The human-readable title for this error's kind.
    pub fn title(&self) -> &'static str {
        self.kind().title()
    }
}

impl From<AuthError> for GateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownToken => Self::UnknownToken,
        }
    }
}

impl From<SessionError> for GateError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => Self::UnknownSession(id),
            SessionError::AlreadyExists(id) => Self::AlreadyProvisioned(id),
            SessionError::CapacityExceeded(id) => Self::CapacityExceeded(id),
            SessionError::WrongState { session_id, state } => {
                Self::WrongState { session_id, state }
            }
            SessionError::InvalidTransition {
                session_id,
                from,
                to,
            } => Self::InvalidTransition {
                session_id,
                from,
                to,
            },
            // A token that resolves to this session but isn't held by one of
            // its players looks the same to the client as a made-up one.
            SessionError::UnknownPlayer(_) => Self::UnknownToken,
            SessionError::MoveRejected(reason) => Self::MoveRejected(reason),
            SessionError::Unavailable(id) => Self::Unavailable(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> SessionId {
        SessionId::new("mars-1")
    }

    #[test]
    fn test_from_auth_error_unknown_token() {
        let err: GateError = AuthError::UnknownToken.into();
        assert!(matches!(err, GateError::UnknownToken));
        assert_eq!(err.kind(), ErrorKind::UnknownToken);
    }

    #[test]
    fn test_from_session_not_found_is_unknown_session() {
        let err: GateError = SessionError::NotFound(sid()).into();
        assert!(matches!(err, GateError::UnknownSession(_)));
        assert_eq!(err.kind().as_str(), "unknown_session");
    }

    #[test]
    fn test_from_session_unknown_player_is_unknown_token() {
        let err: GateError = SessionError::UnknownPlayer(sid()).into();
        assert!(matches!(err, GateError::UnknownToken));
    }

    #[test]
    fn test_from_session_move_rejected_keeps_message() {
        let err: GateError = SessionError::MoveRejected("cliff ahead".into()).into();
        assert_eq!(err.kind(), ErrorKind::MoveRejected);
        assert!(err.to_string().contains("cliff ahead"));
    }

    #[test]
    fn test_from_session_wrong_state_keeps_state() {
        let err: GateError = SessionError::WrongState {
            session_id: sid(),
            state: LifecycleState::Joining,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::WrongState);
        assert_eq!(err.to_string(), "session mars-1 is Joining");
    }

    #[test]
    fn test_protocol_error_is_bad_request() {
        let err: GateError = ProtocolError::InvalidMessage("nope".into()).into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_title_follows_kind() {
        assert_eq!(GateError::InvalidSecret.title(), "Invalid admin secret");
        assert_eq!(GateError::UnknownToken.title(), "Unknown token");
    }
}
