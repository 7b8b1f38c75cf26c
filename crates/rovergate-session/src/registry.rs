//! Session registry: provisions session actors and finds them by id.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use rovergate_auth::TokenAuthority;
use rovergate_protocol::SessionId;
use tokio::sync::RwLock;

use crate::session::spawn_session;
use crate::{SessionConfig, SessionError, SessionHandle, SessionInfo, Simulation};

/// Tracks every provisioned session.
///
/// The map holds [`SessionHandle`]s, not sessions: the state itself lives in
/// each session's actor task. A lookup clones the handle and releases the
/// map lock straight away, so a slow move in one session never holds up a
/// lookup for another.
///
/// Sessions are never removed or replaced. Once an id is provisioned it
/// names the same session for the registry's lifetime.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,

    /// Handed to every session actor so it can mint player tokens.
    authority: Arc<TokenAuthority>,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions mint tokens through
    /// `authority`.
    pub fn new(authority: Arc<TokenAuthority>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            authority,
        }
    }

    /// The token authority shared with this registry's sessions.
    pub fn authority(&self) -> &Arc<TokenAuthority> {
        &self.authority
    }

    /// Spawns a session actor in the Joining state and registers it.
    ///
    /// This is an operator action and is not reachable from player
    /// requests.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyExists`] if `session_id` is taken.
    /// The existing session is left untouched and `simulation` is dropped.
    pub async fn provision<S: Simulation>(
        &self,
        session_id: SessionId,
        config: SessionConfig,
        simulation: S,
    ) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        match sessions.entry(session_id) {
            Entry::Occupied(slot) => {
                Err(SessionError::AlreadyExists(slot.key().clone()))
            }
            Entry::Vacant(slot) => {
                let session_id = slot.key().clone();
                let max_players = config.max_players;
                let handle = spawn_session(
                    session_id.clone(),
                    config,
                    simulation,
                    Arc::clone(&self.authority),
                );
                slot.insert(handle.clone());
                tracing::info!(%session_id, max_players, "session provisioned");
                Ok(handle)
            }
        }
    }

    /// Looks up a session by id.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the id was never provisioned.
    pub async fn get(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))
    }

    /// Snapshots of every session, sorted by id.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self
            .sessions
            .read()
            .await
            .values()
            .map(SessionHandle::snapshot)
            .collect();
        infos.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        infos
    }

    /// Ids of every provisioned session, in no particular order.
    pub async fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Number of provisioned sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if nothing has been provisioned.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Arc::new(TokenAuthority::new()))
    }
}
