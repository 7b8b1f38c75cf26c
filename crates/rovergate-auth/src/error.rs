//! Error types for the auth layer.

/// Errors raised while resolving tokens.
///
/// Issuing never fails, so resolution is the only source of errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// The token was never issued by this process.
    /// Could be a typo, a token from a previous run, or a guess.
    #[error("unknown token")]
    UnknownToken,
}
