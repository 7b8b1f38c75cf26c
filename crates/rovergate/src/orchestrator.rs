//! Token-authorized agent moves.
//!
//! Ground and aerial moves share one pipeline: resolve the token, find its
//! session, hand the command to the session actor. Only the command and the
//! shape of the report differ.

use std::sync::Arc;

use rovergate_auth::TokenAuthority;
use rovergate_protocol::{Direction, Position, Token};
use rovergate_session::{
    AerialReport, AgentCommand, AgentReport, GroundReport, SessionError,
    SessionHandle, SessionRegistry,
};

use crate::GateError;

/// Routes agent moves to the session that issued the caller's token.
pub struct MoveOrchestrator {
    authority: Arc<TokenAuthority>,
    registry: Arc<SessionRegistry>,
}

impl MoveOrchestrator {
    /// Uses the registry's own token authority.
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            authority: Arc::clone(registry.authority()),
            registry,
        }
    }

    /// Finds the session behind `token`.
    ///
    /// A token whose session can't be found is reported exactly like a
    /// token that was never issued.
    pub async fn authorize(
        &self,
        token: &Token,
    ) -> Result<SessionHandle, GateError> {
        let session_id = self.authority.resolve(token).await?;
        match self.registry.get(&session_id).await {
            Ok(handle) => Ok(handle),
            Err(SessionError::NotFound(_)) => {
                tracing::warn!(%session_id, "token resolves to a missing session");
                Err(GateError::UnknownToken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drives the caller's ground rover one step.
    ///
    /// # Errors
    /// `UnknownToken`, `WrongState` unless the session is Playing, or
    /// `MoveRejected` with the simulation's reason.
    pub async fn move_ground(
        &self,
        token: &Token,
        direction: Direction,
    ) -> Result<GroundReport, GateError> {
        match self.dispatch(token, AgentCommand::Ground(direction)).await? {
            AgentReport::Ground(report) => Ok(report),
            AgentReport::Aerial(_) => Err(mismatched("ground")),
        }
    }

    /// Flies the caller's aerial scout to `destination`.
    ///
    /// # Errors
    /// Same as [`move_ground`](Self::move_ground).
    pub async fn move_aerial(
        &self,
        token: &Token,
        destination: Position,
    ) -> Result<AerialReport, GateError> {
        match self.dispatch(token, AgentCommand::Aerial(destination)).await? {
            AgentReport::Aerial(report) => Ok(report),
            AgentReport::Ground(_) => Err(mismatched("aerial")),
        }
    }

    async fn dispatch(
        &self,
        token: &Token,
        command: AgentCommand,
    ) -> Result<AgentReport, GateError> {
        let session = self.authorize(token).await?;
        let report = session.submit_move(token.clone(), command).await?;
        Ok(report)
    }
}

fn mismatched(agent: &str) -> GateError {
    GateError::Internal(format!("{agent} move produced the wrong report kind"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rovergate_protocol::SessionId;

    #[tokio::test]
    async fn test_authorize_unknown_token_fails() {
        let orchestrator = MoveOrchestrator::new(Arc::new(SessionRegistry::default()));
        let result = orchestrator.authorize(&Token::new("bogus")).await;
        assert!(matches!(result, Err(GateError::UnknownToken)));
    }

    #[tokio::test]
    async fn test_authorize_dangling_token_is_unknown_token() {
        let registry = Arc::new(SessionRegistry::default());
        // Issued for a session that was never provisioned.
        let token = registry
            .authority()
            .issue(&SessionId::new("ghost"))
            .await;
        let orchestrator = MoveOrchestrator::new(Arc::clone(&registry));

        let result = orchestrator.move_ground(&token, Direction::Forward).await;

        assert!(matches!(result, Err(GateError::UnknownToken)));
    }
}
