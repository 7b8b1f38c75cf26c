//! Request and response envelopes exchanged with clients.
//!
//! The gateway is transport agnostic, but every transport needs the same
//! contract: a tagged request in, a tagged response out, and a stable error
//! shape. This module is that contract.
//!
//! ```text
//! → { "id": 3, "request":  { "type": "MoveGround", "token": "…", "direction": "Forward" } }
//! ← { "id": 3, "response": { "type": "GroundMoved", "x": 4, "y": 2, … } }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Direction, Grid, LifecycleState, Orientation, SessionId, Token};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Everything a client can ask the gateway to do.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, so a join looks
/// like `{ "type": "Join", "session_id": "mars-1", "player_name": "alice" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Attach a new player to a session.
    Join {
        session_id: SessionId,
        player_name: String,
    },

    /// Ask for the lifecycle state of the caller's session.
    Status { token: Token },

    /// Drive the ground agent one step.
    MoveGround {
        token: Token,
        direction: Direction,
    },

    /// Fly the aerial agent to a destination cell.
    MoveAerial {
        token: Token,
        dest_row: i32,
        dest_col: i32,
    },

    /// Operator-only: move a session from Joining to Playing.
    AdminStart {
        session_id: SessionId,
        secret: String,
        recharge_rate: u32,
    },
}

impl Request {
    /// Short name of the request, for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Status { .. } => "status",
            Self::MoveGround { .. } => "move_ground",
            Self::MoveAerial { .. } => "move_aerial",
            Self::AdminStart { .. } => "admin_start",
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful join payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub token: Token,
    pub start_x: i32,
    pub start_y: i32,
    pub neighbors: Grid,
    pub map: Grid,
    pub target_x: i32,
    pub target_y: i32,
    pub orientation: Orientation,
}

/// Successful ground move payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundMoveResponse {
    pub x: i32,
    pub y: i32,
    pub power: u32,
    pub neighbors: Grid,
    pub message: String,
    pub orientation: Orientation,
}

/// Successful aerial move payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AerialMoveResponse {
    pub x: i32,
    pub y: i32,
    pub power: u32,
    pub neighbors: Grid,
    pub message: String,
}

/// Everything the gateway can answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Joined(JoinResponse),
    Status { state: LifecycleState },
    GroundMoved(GroundMoveResponse),
    AerialMoved(AerialMoveResponse),
    Started,
    /// The request failed. `kind` is stable and machine readable; `title`
    /// is a fixed human-readable summary of the kind; `detail` carries the
    /// specific reason (e.g. the simulation's rejection message).
    Error {
        kind: ErrorKind,
        title: String,
        detail: String,
    },
}

impl Response {
    /// Builds an error response with the kind's standard title.
    pub fn error(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Error {
            kind,
            title: kind.title().to_string(),
            detail: detail.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// The client-facing failure taxonomy.
///
/// Serialized in snake_case (`"unknown_token"`), which is the string clients
/// are expected to branch on. Renaming a variant is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownSession,
    UnknownToken,
    CapacityExceeded,
    WrongState,
    InvalidTransition,
    InvalidSecret,
    MoveRejected,
    /// The session exists but its actor is no longer running.
    Unavailable,
    /// The request could not be decoded.
    BadRequest,
    /// Anything else the server could not handle.
    Internal,
}

impl ErrorKind {
    /// The machine-readable kind, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownSession => "unknown_session",
            Self::UnknownToken => "unknown_token",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::WrongState => "wrong_state",
            Self::InvalidTransition => "invalid_transition",
            Self::InvalidSecret => "invalid_secret",
            Self::MoveRejected => "move_rejected",
            Self::Unavailable => "unavailable",
            Self::BadRequest => "bad_request",
            Self::Internal => "internal",
        }
    }

    /// A short human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::UnknownSession => "Unknown session",
            Self::UnknownToken => "Unknown token",
            Self::CapacityExceeded => "Session is full",
            Self::WrongState => "Session is not accepting this action",
            Self::InvalidTransition => "Invalid lifecycle transition",
            Self::InvalidSecret => "Invalid admin secret",
            Self::MoveRejected => "Move rejected",
            Self::Unavailable => "Session unavailable",
            Self::BadRequest => "Bad request",
            Self::Internal => "Internal error",
        }
    }

    /// HTTP-style status code for transports that want one.
    pub fn code(&self) -> u16 {
        match self {
            Self::BadRequest | Self::MoveRejected => 400,
            Self::UnknownToken => 401,
            Self::InvalidSecret => 403,
            Self::UnknownSession => 404,
            Self::CapacityExceeded | Self::WrongState | Self::InvalidTransition => 409,
            Self::Internal => 500,
            Self::Unavailable => 503,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// A request as it travels on the wire.
///
/// `id` is chosen by the client and echoed back unchanged so a client can
/// pipeline requests over one connection and match the answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: u64,
    pub request: Request,
}

/// A response as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub response: Response,
}

// =========================================================================
// Tests
// =========================================================================
