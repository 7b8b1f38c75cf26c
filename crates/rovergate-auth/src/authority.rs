//! The token authority: mints player tokens and maps them to sessions.
//!
//! # Concurrency note
//!
//! Unlike most of the per-session state, this map is shared by every
//! session in the process, so it lives behind a `tokio::sync::RwLock`.
//! The lock is only ever held for a single `HashMap` lookup or insert and
//! never across another `.await`, so sessions don't queue behind each
//! other for longer than one map operation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rand::Rng;
use rovergate_protocol::{SessionId, Token};
use tokio::sync::RwLock;

use crate::AuthError;

/// Issues and resolves opaque player tokens.
///
/// ## Invariants
///
/// - Every token maps to exactly one session for the whole process
///   lifetime. Entries are never removed or overwritten.
/// - `issue` finishes its insert before it returns, so a `resolve` that
///   starts after `issue` returned always finds the token.
///
/// Shared between the registry's session actors and the gateway through an
/// `Arc<TokenAuthority>`.
#[derive(Debug, Default)]
pub struct TokenAuthority {
    tokens: RwLock<HashMap<Token, SessionId>>,
}

impl TokenAuthority {
    /// Creates an authority with no tokens issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a token for a player of `session_id` and records it.
    ///
    /// The token is 128 random bits rendered as 32 lowercase hex chars. A
    /// collision with an existing token is practically impossible, but if
    /// one happens we simply draw again, so uniqueness never depends on luck.
    pub async fn issue(&self, session_id: &SessionId) -> Token {
        let mut tokens = self.tokens.write().await;
        loop {
            match tokens.entry(generate_token()) {
                Entry::Occupied(_) => {
                    tracing::warn!(%session_id, "token collision, drawing again");
                }
                Entry::Vacant(slot) => {
                    let token = slot.key().clone();
                    slot.insert(session_id.clone());
                    tracing::debug!(%session_id, issued = tokens.len(), "token issued");
                    return token;
                }
            }
        }
    }

    /// Looks up which session a token belongs to.
    ///
    /// This is a pure lookup: it does not check that the session still
    /// exists or accepts requests. Callers decide what a dangling token
    /// means for them.
    ///
    /// # Errors
    /// Returns [`AuthError::UnknownToken`] if this authority never issued
    /// the token.
    pub async fn resolve(&self, token: &Token) -> Result<SessionId, AuthError> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::UnknownToken)
    }

    /// Number of tokens issued so far.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Returns `true` if no token has been issued yet.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> Token {
    let bytes: [u8; 16] = rand::rng().random();
    Token::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

// =========================================================================
// Tests
// =========================================================================
