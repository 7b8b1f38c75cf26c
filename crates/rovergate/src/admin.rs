//! Operator-only lifecycle control.

use std::fmt;
use std::sync::Arc;

use rovergate_protocol::{SessionId, StartOptions};
use rovergate_session::SessionRegistry;

use crate::GateError;

/// Starts sessions on behalf of an operator holding the shared secret.
pub struct AdminGate {
    secret: String,
    registry: Arc<SessionRegistry>,
}

impl AdminGate {
    pub fn new(registry: Arc<SessionRegistry>, secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            registry,
        }
    }

    /// Moves `session_id` from Joining to Playing with `options`.
    ///
    /// The secret is checked before anything else, so a caller without it
    /// learns nothing about which sessions exist.
    ///
    /// # Errors
    /// - [`GateError::InvalidSecret`]
    /// - [`GateError::UnknownSession`]
    /// - [`GateError::InvalidTransition`] if the session already started
    pub async fn start_session(
        &self,
        session_id: &SessionId,
        secret: &str,
        options: StartOptions,
    ) -> Result<(), GateError> {
        if secret != self.secret {
            tracing::warn!(%session_id, "admin start with invalid secret");
            return Err(GateError::InvalidSecret);
        }

        let session = self.registry.get(session_id).await?;
        session.start(options).await?;
        Ok(())
    }
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate")
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_session_wrong_secret_checked_first() {
        // No session exists, yet the secret error wins.
        let gate = AdminGate::new(Arc::new(SessionRegistry::default()), "s3cret");
        let result = gate
            .start_session(&SessionId::new("nope"), "guess", StartOptions::default())
            .await;
        assert!(matches!(result, Err(GateError::InvalidSecret)));
    }

    #[tokio::test]
    async fn test_start_session_unknown_session_fails() {
        let gate = AdminGate::new(Arc::new(SessionRegistry::default()), "s3cret");
        let result = gate
            .start_session(&SessionId::new("nope"), "s3cret", StartOptions::default())
            .await;
        assert!(matches!(result, Err(GateError::UnknownSession(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let gate = AdminGate::new(Arc::new(SessionRegistry::default()), "s3cret");
        assert!(!format!("{gate:?}").contains("s3cret"));
    }
}
