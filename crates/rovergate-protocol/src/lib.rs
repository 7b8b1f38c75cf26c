//! Shared vocabulary and wire contract for Rovergate.
//!
//! - **Types** ([`SessionId`], [`Token`], [`Position`], [`LifecycleState`],
//!   ...): the values every layer passes around.
//! - **Messages** ([`Request`], [`Response`], [`ErrorKind`], envelopes):
//!   the transport-agnostic request/response contract.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how envelopes become bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (envelopes) → Gateway (sessions, tokens)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{
    AerialMoveResponse, ErrorKind, GroundMoveResponse, JoinResponse, Request,
    RequestEnvelope, Response, ResponseEnvelope,
};
pub use types::{
    Direction, Grid, LifecycleState, Orientation, PlayerId, Position, SessionId,
    StartOptions, Token,
};
