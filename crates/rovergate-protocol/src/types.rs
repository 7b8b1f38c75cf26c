//! Value types shared by every Rovergate layer.
//!
//! These are the nouns of the system: who is playing ([`PlayerId`]), which
//! game they are in ([`SessionId`]), the credential they present
//! ([`Token`]), and the small geometric vocabulary the simulation speaks
//! ([`Position`], [`Direction`], [`Orientation`], [`Grid`]).
//!
//! Everything here is serializable because every one of these values ends
//! up on the wire sooner or later.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one hosted game session.
///
/// Session ids are chosen by the operator when a session is provisioned
/// (e.g. `"mars-1"`), so unlike [`PlayerId`] this wraps a `String`.
///
/// `#[serde(transparent)]` keeps the JSON form a bare string:
/// `SessionId("mars-1")` becomes `"mars-1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifies a player within one session.
///
/// Player ids are handed out sequentially by the session that admits the
/// player, so they are only unique per session. Outside the session the
/// player is identified by their [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An opaque player credential minted at join time.
///
/// Deliberately has no `Display` impl: tokens are secrets and must not end
/// up in log lines by accident. Use [`Token::as_str`] when the raw value is
/// genuinely needed (e.g. serializing a join response).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wraps a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Enough to tell two tokens apart in a test failure, not enough to
        // replay one.
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "Token({prefix}…)")
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A cell on the session map.
///
/// `row` is reported to clients as `x` and `col` as `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A ground-agent movement command, relative to the rover's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Direction {
    Forward,
    Backward,
    /// Rotate 90° counter-clockwise in place.
    Left,
    /// Rotate 90° clockwise in place.
    Right,
}

/// Which way the ground agent is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Orientation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// The orientation after a 90° clockwise turn.
    pub fn turned_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// The orientation after a 90° counter-clockwise turn.
    pub fn turned_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Unit step `(d_row, d_col)` when moving forward with this facing.
    /// Rows grow southwards.
    pub fn step(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Rows of simulation-defined tile codes.
///
/// The core never interprets these: neighbor windows and coarse maps are
/// produced by the simulation and passed through to the client untouched.
pub type Grid = Vec<Vec<i32>>;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
/// Joining ──(admin start)──→ Playing ──(simulation complete)──→ Completed
/// ```
///
/// Transitions only move forward; nothing ever returns to `Joining`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LifecycleState {
    /// Accepting players; agents cannot move yet.
    Joining,
    /// Moves are accepted. Late joiners are still admitted.
    Playing,
    /// Terminal. The simulation reported the mission as over.
    Completed,
}

impl LifecycleState {
    /// Returns `true` if players may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Joining | Self::Playing)
    }

    /// Returns `true` if agent moves are accepted.
    pub fn accepts_moves(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// The only state reachable from `self`, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Joining => Some(Self::Playing),
            Self::Playing => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joining => write!(f, "Joining"),
            Self::Playing => write!(f, "Playing"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Options frozen into a session when an operator starts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartOptions {
    /// Battery units the agents regain per move while playing.
    pub recharge_rate: u32,
}

// =========================================================================
// Tests
// =========================================================================
