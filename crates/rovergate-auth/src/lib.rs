//! Player token issuance for Rovergate.
//!
//! A player proves who they are on every move by presenting the opaque
//! token they were handed at join time. This crate owns the only map from
//! tokens to sessions:
//!
//! 1. **Issuing**: [`TokenAuthority::issue`] mints a fresh random token and
//!    records which session it belongs to.
//! 2. **Resolving**: [`TokenAuthority::resolve`] answers "which session is
//!    this token for?" without caring whether that session is still alive.
//!
//! # How it fits in the stack
//!
//! ```text
//! Gateway (above)   ← resolves tokens before routing moves and status calls
//!     ↕
//! Session actors    ← mint a token for every admitted player
//!     ↕
//! Auth (this crate) ← append-only token → session map
//! ```

mod authority;
mod error;

pub use authority::TokenAuthority;
pub use error::AuthError;
